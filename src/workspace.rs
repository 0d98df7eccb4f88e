//! The read-only scoring snapshot handed to worker tasks.
//!
//! An explicit, immutable value published once per run instead of
//! process-wide mutable state: a worker that needs the
//! dataset/codec/labeler/objective/clustering calls [`WorkspaceHandle::get`]
//! on the handle it was given at spawn.

use std::sync::Arc;

use crate::assignment::{Dataset, Observation};
use crate::clustering::Clustering;
use crate::codec::GraphCodec;
use crate::graph::MoleculeGraph;
use crate::labeler::Labeler;
use crate::objective::Objective;
use crate::topology::Topology;

/// Everything a candidate-scoring task needs, published once and shared
/// read-only thereafter.
///
/// Every field but `clustering` is `Arc`-wrapped: the nanostep loop publishes
/// a fresh workspace after every relabel, and the dataset, codec, labeler and
/// objective never change across a run, so rebuilding should cost an
/// `Arc::clone` per field, not a deep copy.
pub struct Workspace<O> {
    pub clustering: Clustering,
    pub dataset: Arc<Dataset<O>>,
    pub codec: Arc<dyn GraphCodec>,
    pub labeler: Arc<dyn Labeler>,
    pub objective: Arc<dyn Objective<O>>,
    pub molecules: Arc<Vec<MoleculeGraph>>,
    pub topology: Arc<Topology>,
    pub smiles: Arc<Vec<String>>,
}

impl<O> Clone for Workspace<O> {
    fn clone(&self) -> Self {
        Workspace {
            clustering: self.clustering.clone(),
            dataset: Arc::clone(&self.dataset),
            codec: Arc::clone(&self.codec),
            labeler: Arc::clone(&self.labeler),
            objective: Arc::clone(&self.objective),
            molecules: Arc::clone(&self.molecules),
            topology: Arc::clone(&self.topology),
            smiles: Arc::clone(&self.smiles),
        }
    }
}

impl<O> Workspace<O> {
    /// Republishes the workspace with a new clustering after a relabel,
    /// sharing every other field with the original: each nanostep rescans
    /// remaining candidates against the post-edit clustering without
    /// re-publishing the dataset/codec/objective.
    pub fn with_clustering(&self, clustering: Clustering) -> Self {
        Workspace { clustering, ..self.clone() }
    }
}

/// A cheaply cloneable handle to a [`Workspace`]. Workers receive this, not
/// the workspace itself, so publishing a new snapshot after a relabel never
/// invalidates handles already in flight.
#[derive(Clone)]
pub struct WorkspaceHandle<O>(Arc<Workspace<O>>);

impl<O: Observation> WorkspaceHandle<O> {
    pub fn new(workspace: Workspace<O>) -> Self {
        WorkspaceHandle(Arc::new(workspace))
    }

    pub fn get(&self) -> &Workspace<O> {
        &self.0
    }

    /// Builds a new handle sharing everything but the clustering.
    pub fn with_clustering(&self, clustering: Clustering) -> Self {
        WorkspaceHandle(Arc::new(self.0.with_clustering(clustering)))
    }
}
