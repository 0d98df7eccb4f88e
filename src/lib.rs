//! A hierarchical SMARTS clustering optimizer: learns a tree of SMARTS
//! substructure patterns partitioning per-atom/bond/angle/torsion
//! observations, iteratively splitting and merging leaf patterns against a
//! pluggable objective.
//!
//! The SMARTS/SMILES codec, subgraph extension, labeler, splitter and
//! objective are external collaborators — this crate defines their
//! contracts as traits and implements everything around them: the pattern
//! hierarchy, candidate generation and scoring, the acceptance engine, the
//! iteration strategy, concurrent dispatch, and checkpointing.

pub mod acceptance;
pub mod assignment;
pub mod candidate;
pub mod checkpoint;
pub mod clustering;
pub mod codec;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod labeler;
pub mod objective;
pub mod progress;
pub mod scoring;
pub mod splitter;
pub mod strategy;
pub mod topology;
pub mod workspace;

pub mod prelude {
    pub use crate::assignment::{Dataset, DatasetEntry, Observation};
    pub use crate::clustering::{Clustering, Mapping};
    pub use crate::codec::{CodecError, GraphCodec};
    pub use crate::engine::{self, EngineOutcome};
    pub use crate::error::{EngineError, Result};
    pub use crate::graph::{GraphExtender, MoleculeGraph, Structure};
    pub use crate::hierarchy::{Hierarchy, NodeId, ParameterNode};
    pub use crate::labeler::{Labeler, Labeling};
    pub use crate::objective::Objective;
    pub use crate::splitter::{DirectCandidate, Splitter, SplitterConfig};
    pub use crate::strategy::{MacroStep, MicroStep, Operation, Strategy};
    pub use crate::topology::{presets, Topology};
}
