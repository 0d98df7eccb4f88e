//! Checkpoint serialization: `{dataset, clustering, strategy}`.
//!
//! A self-describing, versioned `rmp-serde` envelope rather than an opaque
//! blob. The mapping half of `Clustering` is rebuilt from the labeling on
//! load rather than serialized, since it's derived data.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assignment::{Dataset, Observation};
use crate::clustering::Clustering;
use crate::error::{EngineError, Result};
use crate::hierarchy::Hierarchy;
use crate::labeler::Labeling;
use crate::strategy::Strategy;

pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CheckpointEnvelope<O> {
    version: u32,
    dataset: Dataset<O>,
    hierarchy: Hierarchy,
    labeling: Labeling,
    strategy: Strategy,
}

/// Writes a checkpoint to `path`, overwriting any existing file.
pub fn write_checkpoint<O>(path: &Path, dataset: &Dataset<O>, clustering: &Clustering, strategy: &Strategy) -> Result<()>
where
    O: Observation + Serialize,
{
    let envelope = CheckpointEnvelope {
        version: CHECKPOINT_VERSION,
        dataset: dataset.clone(),
        hierarchy: clustering.hierarchy.clone(),
        labeling: clustering.labeling.clone(),
        strategy: strategy.clone(),
    };
    let bytes = rmp_serde::to_vec(&envelope).map_err(|e| EngineError::Checkpoint(e.to_string()))?;
    let mut file = std::fs::File::create(path).map_err(|e| EngineError::Checkpoint(e.to_string()))?;
    file.write_all(&bytes).map_err(|e| EngineError::Checkpoint(e.to_string()))
}

/// Reads back a checkpoint written by [`write_checkpoint`], rebuilding the
/// clustering's mapping from the deserialized labeling.
pub fn read_checkpoint<O>(path: &Path) -> Result<(Dataset<O>, Clustering, Strategy)>
where
    O: Observation + for<'de> Deserialize<'de>,
{
    let mut file = std::fs::File::open(path).map_err(|e| EngineError::Checkpoint(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| EngineError::Checkpoint(e.to_string()))?;
    let envelope: CheckpointEnvelope<O> = rmp_serde::from_slice(&bytes).map_err(|e| EngineError::Checkpoint(e.to_string()))?;
    if envelope.version != CHECKPOINT_VERSION {
        return Err(EngineError::Checkpoint(format!("unsupported checkpoint version {}", envelope.version)));
    }
    let clustering = Clustering::new(envelope.hierarchy, envelope.labeling);
    Ok((envelope.dataset, clustering, envelope.strategy))
}
