//! Work dispatch: the candidate-scoring fan-out.
//!
//! Data-parallel at the two points that matter for this engine: candidate
//! scoring and batched decode. [`LocalWorkQueue`] implements the
//! work-queue contract with a sized `rayon` thread pool; a remote backend
//! would implement the same [`WorkQueue`] trait against an out-of-process
//! server without changing any caller.

use rayon::prelude::*;

use crate::assignment::{Dataset, Observation};
use crate::candidate::Candidate;
use crate::scoring::{self, ScoreResult};
use crate::workspace::WorkspaceHandle;

/// `(server address, per-submission chunk size, expected total)`.
/// `server_addr` is `None` for the local backend; a remote backend would
/// require it.
#[derive(Debug, Clone)]
pub struct WorkQueueConfig {
    pub server_addr: Option<String>,
    pub chunk_size: usize,
    pub poll_interval_secs: f64,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        WorkQueueConfig { server_addr: None, chunk_size: 10_000, poll_interval_secs: 1.0 }
    }
}

/// Host CPU count, scaled down by total IC count to bound per-worker
/// memory: ÷2 above 5M ICs, ÷3 above 10M, ÷5 above 50M, ÷10 above 100M.
pub fn base_worker_count(ic_count: usize) -> usize {
    let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let divisor = if ic_count > 100_000_000 {
        10
    } else if ic_count > 50_000_000 {
        5
    } else if ic_count > 10_000_000 {
        3
    } else if ic_count > 5_000_000 {
        2
    } else {
        1
    };
    (cpus / divisor).max(1)
}

/// When the candidate count is small enough that every candidate could run
/// on its own worker, restrict to that many workers and to localhost to
/// avoid remote overhead.
pub fn effective_worker_count(ic_count: usize, candidate_count: usize) -> usize {
    let workers = base_worker_count(ic_count);
    if candidate_count <= workers {
        candidate_count.max(1)
    } else {
        workers
    }
}

/// A batch of scored candidates, `(candidate id, result)`, in the same
/// order the candidates were submitted (stable candidate ids).
pub trait WorkQueue<O: Observation>: Send + Sync {
    /// Scores every candidate against the workspace snapshot. `x0` is the
    /// current baseline objective, used to fill in a worker-failure result:
    /// `(keep=false, x=x0, obj=0, match_len=0)`.
    fn submit(&self, workspace: &WorkspaceHandle<O>, candidates: &[Candidate], x0: f64) -> Vec<(u64, ScoreResult)>;
}

/// Local work queue: a `rayon` thread pool sized by
/// [`effective_worker_count`], submitting in chunks of `chunk_size`.
/// Relabeling inside each scoring task is plain sequential code (it never
/// itself spawns a `rayon` scope), avoiding the fork-storm a
/// nested-parallel scorer would cause.
pub struct LocalWorkQueue {
    pub config: WorkQueueConfig,
    pub workers: usize,
}

impl LocalWorkQueue {
    pub fn new(config: WorkQueueConfig, workers: usize) -> Self {
        LocalWorkQueue { config, workers: workers.max(1) }
    }
}

impl<O: Observation> WorkQueue<O> for LocalWorkQueue {
    fn submit(&self, workspace: &WorkspaceHandle<O>, candidates: &[Candidate], x0: f64) -> Vec<(u64, ScoreResult)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .expect("failed to build local work-queue thread pool");

        let mut results = Vec::with_capacity(candidates.len());
        for chunk in candidates.chunks(self.config.chunk_size.max(1)) {
            let chunk_results: Vec<(u64, ScoreResult)> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|candidate| {
                        let ws = workspace.get();
                        let score = scoring::score_candidate(
                            &ws.clustering,
                            &ws.dataset,
                            ws.objective.as_ref(),
                            ws.codec.as_ref(),
                            ws.labeler.as_ref(),
                            &ws.smiles,
                            &ws.topology,
                            candidate,
                        )
                        .unwrap_or_else(|_| ScoreResult::worker_failure(x0));
                        (candidate.id, score)
                    })
                    .collect()
            });
            results.extend(chunk_results);
        }
        results
    }
}
