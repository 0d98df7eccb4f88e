//! Candidate generation: enumerates the SPLIT/MERGE edits worth scoring
//! for a targeted node. SPLIT candidates come from iterative enumeration
//! seeded from a structural union of the node's current members, plus
//! direct enumeration delegated to the splitter; MERGE candidates are one
//! per current child.

use serde::{Deserialize, Serialize};

use crate::assignment::{Dataset, Observation};
use crate::clustering::Clustering;
use crate::error::{EngineError, Result};
use crate::graph::{GraphExtender, MoleculeGraph, Structure};
use crate::objective::Objective;
use crate::splitter::Splitter;
use crate::strategy::{MicroStep, Operation};

#[derive(Debug, Clone)]
pub enum CandidatePayload {
    Split { structure: Structure },
    Merge { child_name: String },
}

/// One enumerated candidate edit against a targeted node, carrying enough
/// of the proposed structure (SPLIT) or child reference (MERGE) to score
/// and, if admitted, apply it. `id` is assigned in generator order and
/// stays stable across the nanostep loop.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: u64,
    pub operation: Operation,
    pub node_name: String,
    pub overlap: i64,
    pub payload: CandidatePayload,
}

/// Generates SPLIT candidates for a targeted node `node_name`.
///
/// Returns an empty vec (no skip error — skipping is a legitimate outcome)
/// when the node's current group has no remaining pressure to split.
#[allow(clippy::too_many_arguments)]
pub fn generate_split_candidates<O: Observation>(
    node_name: &str,
    micro: &MicroStep,
    clustering: &Clustering,
    dataset: &Dataset<O>,
    objective: &dyn Objective<O>,
    molecules: &[MoleculeGraph],
    extender: &dyn GraphExtender,
    splitter: &dyn Splitter,
    distinct_label_count: usize,
    next_id: &mut u64,
) -> Result<Vec<Candidate>> {
    let a_s = clustering.observations_for(node_name, dataset);
    if objective.single(&a_s) == 0.0 {
        return Ok(Vec::new());
    }

    let node_id = clustering
        .hierarchy
        .id_by_name(node_name)
        .ok_or_else(|| EngineError::NodeMissing(node_name.to_string()))?;
    let s_structure = clustering.hierarchy.node(node_id).unwrap().structure.clone();

    let member_structures: Vec<Structure> = clustering
        .mapping
        .ics_for(node_name)
        .iter()
        .filter_map(|(mol_id, atoms)| molecules.get(*mol_id as usize).map(|g| extender.extend(g, atoms, 0)))
        .collect();

    let mut structures = Vec::new();

    if micro.iterative_enable {
        let max_depth = extender.structure_max_depth(&member_structures);
        if max_depth > micro.pcp.extender.depth_max {
            return Err(EngineError::InvalidConfiguration {
                node: node_name.to_string(),
                got: max_depth,
                max: micro.pcp.extender.depth_max,
            });
        }
        let extended: Vec<Structure> = clustering
            .mapping
            .ics_for(node_name)
            .iter()
            .filter_map(|(mol_id, atoms)| molecules.get(*mol_id as usize).map(|g| extender.extend(g, atoms, max_depth)))
            .collect();
        let q = extender.union(&extended);
        structures.extend(splitter.enumerate(&micro.pcp.splitter, &s_structure, &q, &extended));
    }

    if micro.direct_enable && distinct_label_count < micro.direct_limit {
        for direct in splitter.enumerate_direct(&micro.pcp.splitter, &s_structure, &member_structures) {
            structures.push(direct.structure);
        }
    }

    let mut candidates = Vec::with_capacity(structures.len() * micro.overlap.len());
    for structure in structures {
        for &edit in &micro.overlap {
            let id = *next_id;
            *next_id += 1;
            candidates.push(Candidate {
                id,
                operation: Operation::Split,
                node_name: node_name.to_string(),
                overlap: edit,
                payload: CandidatePayload::Split { structure: structure.clone() },
            });
        }
    }

    Ok(candidates)
}

/// Generates MERGE candidates: one per current child of `node_name`, per
/// overlap value.
pub fn generate_merge_candidates(node_name: &str, micro: &MicroStep, clustering: &Clustering, next_id: &mut u64) -> Result<Vec<Candidate>> {
    let node_id = clustering
        .hierarchy
        .id_by_name(node_name)
        .ok_or_else(|| EngineError::NodeMissing(node_name.to_string()))?;

    let mut candidates = Vec::new();
    for &child_id in clustering.hierarchy.children_of(node_id) {
        let child_name = clustering.hierarchy.node(child_id).unwrap().name.clone();
        for &edit in &micro.overlap {
            let id = *next_id;
            *next_id += 1;
            candidates.push(Candidate {
                id,
                operation: Operation::Merge,
                node_name: node_name.to_string(),
                overlap: edit,
                payload: CandidatePayload::Merge { child_name: child_name.clone() },
            });
        }
    }
    Ok(candidates)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: u64,
    pub node_name: String,
    pub overlap: i64,
}
