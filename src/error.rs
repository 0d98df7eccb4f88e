//! Error taxonomy for the clustering engine.
//!
//! Most failure modes here are *policies* rather than hard errors: a data
//! inconsistency is a counted warning, an empty partition or missing node
//! rejects a single candidate, and a worker failure degrades a task to a
//! non-keeping result. Those are represented as values, not `Err`
//! variants. `EngineError` is reserved for genuine aborts —
//! `InvalidConfiguration` stops the current micro step, not the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("structure_max_depth({node}) = {got} exceeds extender.depth_max = {max}")]
    InvalidConfiguration { node: String, got: usize, max: usize },

    #[error("node `{0}` is not present in the clustering")]
    NodeMissing(String),

    #[error("root node is missing from the hierarchy")]
    RootMissing,

    #[error("topology mismatch: dataset uses {dataset:?}, hierarchy was labeled with {labeling:?}")]
    TopologyMismatch {
        dataset: crate::topology::Topology,
        labeling: crate::topology::Topology,
    },

    #[error("checkpoint serialization failed: {0}")]
    Checkpoint(String),

    #[error("failed to decode dataset SMILES: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
