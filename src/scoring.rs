//! Provisional-apply candidate scoring: both the SPLIT and MERGE paths
//! clone the hierarchy, apply one edit, relabel from scratch, and discard
//! the clone unless the acceptance engine selects the candidate — scoring
//! never mutates the real clustering it's given.

use crate::assignment::{Dataset, Observation};
use crate::candidate::{Candidate, CandidatePayload};
use crate::clustering::Clustering;
use crate::codec::GraphCodec;
use crate::error::{EngineError, Result};
use crate::hierarchy::{Hierarchy, NodeId};
use crate::labeler::Labeler;
use crate::objective::Objective;
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub keep: bool,
    pub x: f64,
    pub obj: f64,
    pub match_len: usize,
}

impl ScoreResult {
    pub fn empty_partition() -> Self {
        ScoreResult { keep: false, x: 0.0, obj: 0.0, match_len: 0 }
    }

    pub fn worker_failure(x0: f64) -> Self {
        ScoreResult { keep: false, x: x0, obj: 0.0, match_len: 0 }
    }
}

/// Sum over every parent/child pair in the tree of
/// `objective.split(mapping[child], mapping[parent], overlap)`, walking
/// the whole hierarchy in pre-order — not just the edited subtree.
pub fn global_split_sum<O: Observation>(clustering: &Clustering, dataset: &Dataset<O>, objective: &dyn Objective<O>, overlap: i64) -> f64 {
    let mut x = 0.0;
    for id in clustering.hierarchy.pre_order() {
        let node = clustering.hierarchy.node(id).unwrap();
        let Some(parent_id) = node.parent else { continue };
        let parent = clustering.hierarchy.node(parent_id).unwrap();
        let child_group = clustering.observations_for(&node.name, dataset);
        let parent_group = clustering.observations_for(&parent.name, dataset);
        x += objective.split(&child_group, &parent_group, overlap);
    }
    x
}

fn apply_split_edit(
    hierarchy: &mut Hierarchy,
    parent_name: &str,
    structure: &crate::graph::Structure,
    codec: &dyn GraphCodec,
    topology: &Topology,
) -> Result<NodeId> {
    let parent_id = hierarchy.id_by_name(parent_name).ok_or_else(|| EngineError::NodeMissing(parent_name.to_string()))?;
    let smarts = codec.smarts_encode_structure(structure, topology);
    // New children always go to position 0: highest priority.
    hierarchy.insert_child(parent_id, 0, smarts, structure.clone())
}

fn apply_merge_edit(hierarchy: &mut Hierarchy, child_name: &str) -> Result<()> {
    let child_id = hierarchy.id_by_name(child_name).ok_or_else(|| EngineError::NodeMissing(child_name.to_string()))?;
    hierarchy.remove_child(child_id)
}

/// Scores a single SPLIT candidate without mutating `clustering`.
#[allow(clippy::too_many_arguments)]
pub fn score_split<O: Observation>(
    clustering: &Clustering,
    dataset: &Dataset<O>,
    objective: &dyn Objective<O>,
    codec: &dyn GraphCodec,
    labeler: &dyn Labeler,
    smiles: &[String],
    topology: &Topology,
    parent_name: &str,
    structure: &crate::graph::Structure,
    overlap: i64,
) -> Result<ScoreResult> {
    let mut hierarchy = clustering.hierarchy.clone();
    let new_child_id = match apply_split_edit(&mut hierarchy, parent_name, structure, codec, topology) {
        Ok(id) => id,
        Err(_) => return Ok(ScoreResult::empty_partition()),
    };
    let labeling = labeler.assign(&hierarchy, codec, smiles, topology);
    let new_clustering = Clustering::new(hierarchy, labeling);

    let child_name = new_clustering.hierarchy.node(new_child_id).unwrap().name.clone();
    let s_group = new_clustering.observations_for(parent_name, dataset);
    let child_group = new_clustering.observations_for(&child_name, dataset);
    let match_len = child_group.len();

    if s_group.is_empty() || child_group.is_empty() {
        let x = global_split_sum(&new_clustering, dataset, objective, overlap);
        return Ok(ScoreResult { keep: false, x, obj: 0.0, match_len });
    }

    let obj = objective.split(&s_group, &child_group, overlap);
    let x = global_split_sum(&new_clustering, dataset, objective, overlap);
    let keep = obj <= 0.0;

    Ok(ScoreResult { keep, x, obj, match_len })
}

/// Scores a single MERGE candidate without mutating `clustering`.
#[allow(clippy::too_many_arguments)]
pub fn score_merge<O: Observation>(
    clustering: &Clustering,
    dataset: &Dataset<O>,
    objective: &dyn Objective<O>,
    codec: &dyn GraphCodec,
    labeler: &dyn Labeler,
    smiles: &[String],
    topology: &Topology,
    parent_name: &str,
    child_name: &str,
    overlap: i64,
) -> Result<ScoreResult> {
    let s_group_before = clustering.observations_for(parent_name, dataset);
    let j_group_before = clustering.observations_for(child_name, dataset);
    let obj = objective.merge(&s_group_before, &j_group_before, overlap);

    let mut hierarchy = clustering.hierarchy.clone();
    if apply_merge_edit(&mut hierarchy, child_name).is_err() {
        return Ok(ScoreResult::empty_partition());
    }
    let labeling = labeler.assign(&hierarchy, codec, smiles, topology);
    let new_clustering = Clustering::new(hierarchy, labeling);

    let x = global_split_sum(&new_clustering, dataset, objective, overlap);
    let match_len = new_clustering.observations_for(parent_name, dataset).len();
    let keep = obj < 0.0 || j_group_before.is_empty();

    Ok(ScoreResult { keep, x, obj, match_len })
}

/// Dispatches a single [`Candidate`] to the matching scorer.
#[allow(clippy::too_many_arguments)]
pub fn score_candidate<O: Observation>(
    clustering: &Clustering,
    dataset: &Dataset<O>,
    objective: &dyn Objective<O>,
    codec: &dyn GraphCodec,
    labeler: &dyn Labeler,
    smiles: &[String],
    topology: &Topology,
    candidate: &Candidate,
) -> Result<ScoreResult> {
    match &candidate.payload {
        CandidatePayload::Split { structure } => score_split(
            clustering, dataset, objective, codec, labeler, smiles, topology, &candidate.node_name, structure, candidate.overlap,
        ),
        CandidatePayload::Merge { child_name } => score_merge(
            clustering, dataset, objective, codec, labeler, smiles, topology, &candidate.node_name, child_name, candidate.overlap,
        ),
    }
}

/// Applies an already-admitted candidate to the real (non-provisional)
/// hierarchy, in place. Used by the acceptance engine once per admitted
/// candidate within a nanostep; the caller relabels once after applying
/// every admitted candidate in the batch.
pub fn apply_candidate(hierarchy: &mut Hierarchy, codec: &dyn GraphCodec, topology: &Topology, candidate: &Candidate) -> Result<()> {
    match &candidate.payload {
        CandidatePayload::Split { structure } => {
            apply_split_edit(hierarchy, &candidate.node_name, structure, codec, topology)?;
            Ok(())
        }
        CandidatePayload::Merge { child_name } => apply_merge_edit(hierarchy, child_name),
    }
}
