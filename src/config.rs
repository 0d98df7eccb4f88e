//! Run-level tunables not owned by [`crate::strategy::Strategy`]:
//! work-queue dispatch, decode batching, and checkpoint cadence.

use crate::dispatch::WorkQueueConfig;

/// Checkpoint cadence: the engine writes a checkpoint after each macro (if
/// `after_every_macro`) and always writes one on completion.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    pub path: std::path::PathBuf,
    pub after_every_macro: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig { path: std::path::PathBuf::from("chk.cst.p"), after_every_macro: true }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub work_queue: WorkQueueConfig,
    pub checkpoint: CheckpointConfig,
    /// Batch size for graph decoding above the parallel threshold;
    /// overridable independent of `crate::decode::BATCH_SIZE`.
    pub decode_batch_size: usize,
    pub decode_parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            work_queue: WorkQueueConfig::default(),
            checkpoint: CheckpointConfig::default(),
            decode_batch_size: crate::decode::BATCH_SIZE,
            decode_parallel_threshold: crate::decode::PARALLEL_THRESHOLD,
        }
    }
}
