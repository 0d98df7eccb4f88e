//! Shared fakes for the integration tests under `tests/`.
//!
//! The codec, extender, splitter, labeler and objective are external
//! collaborators with no real implementation in this crate (real SMARTS
//! matching is chemistry-specific and out of scope). These fakes model a
//! single toy primitive — an atom's one-letter "element" — just well enough
//! to exercise the engine end to end: a toy "SMILES" is a comma-separated
//! list of element letters (e.g. `"C,C,O"`), a toy "SMARTS" criterion is
//! either empty (matches anything) or `"elem=X"`.

use std::collections::{HashMap, HashSet};

use besmarts_cluster::prelude::*;
use besmarts_cluster::strategy::{ExtenderConfig, PerceptionConfig};

pub fn elements_of(graph: &MoleculeGraph) -> Vec<String> {
    std::str::from_utf8(&graph.payload)
        .expect("toy payload is always utf8")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn criterion(elem: &str) -> Vec<u8> {
    format!("elem={}", elem).into_bytes()
}

pub struct ElementCodec;

impl GraphCodec for ElementCodec {
    fn smiles_decode(&self, smiles: &str) -> std::result::Result<MoleculeGraph, CodecError> {
        if smiles.is_empty() {
            return Err(CodecError::InvalidSmiles(smiles.to_string()));
        }
        let atom_count = smiles.split(',').count() as u32;
        Ok(MoleculeGraph { atom_count, payload: smiles.as_bytes().to_vec() })
    }

    fn smiles_encode(&self, graph: &MoleculeGraph) -> String {
        String::from_utf8(graph.payload.clone()).unwrap_or_default()
    }

    fn smarts_encode(&self, structure: &Structure) -> String {
        String::from_utf8(structure.payload.clone()).unwrap_or_else(|_| "[*]".to_string())
    }

    fn smarts_encode_structure(&self, structure: &Structure, _topo: &Topology) -> String {
        if structure.payload.is_empty() {
            "[*]".to_string()
        } else {
            String::from_utf8(structure.payload.clone()).unwrap_or_default()
        }
    }

    fn primitive_codecs(&self) -> &[&str] {
        &["element"]
    }

    fn atom_primitives(&self) -> &[&str] {
        &["element"]
    }

    fn bond_primitives(&self) -> &[&str] {
        &[]
    }
}

/// Extends one atom to a single-atom structure tagged with its element.
pub struct ElementExtender;

impl GraphExtender for ElementExtender {
    fn extend(&self, graph: &MoleculeGraph, atoms: &[u32], _depth: usize) -> Structure {
        let elems = elements_of(graph);
        let elem = elems.get(atoms[0] as usize).cloned().unwrap_or_default();
        Structure { select: atoms.to_vec(), payload: criterion(&elem) }
    }

    fn union(&self, structures: &[Structure]) -> Structure {
        structures.first().cloned().unwrap_or(Structure { select: vec![], payload: vec![] })
    }

    fn structure_max_depth(&self, _structures: &[Structure]) -> usize {
        0
    }
}

/// Proposes the minority element among a node's current members as the one
/// split candidate; proposes nothing when the members are already a single
/// class.
pub struct ElementSplitter;

impl Splitter for ElementSplitter {
    fn enumerate(&self, _config: &SplitterConfig, _s: &Structure, _q: &Structure, members: &[Structure]) -> Vec<Structure> {
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        for m in members {
            *counts.entry(m.payload.clone()).or_insert(0) += 1;
        }
        if counts.len() < 2 {
            return Vec::new();
        }
        let minority = counts.into_iter().min_by_key(|(_, c)| *c).map(|(p, _)| p).unwrap();
        vec![Structure { select: vec![], payload: minority }]
    }

    fn enumerate_direct(&self, _config: &SplitterConfig, _s: &Structure, _members: &[Structure]) -> Vec<DirectCandidate> {
        Vec::new()
    }
}

/// First-child-wins greedy descent (spec's `pre_order`/first-match-wins
/// order), matching on the toy element criterion.
pub struct ElementLabeler;

impl Labeler for ElementLabeler {
    fn assign(&self, hierarchy: &Hierarchy, codec: &dyn GraphCodec, smiles: &[String], topology: &Topology) -> Labeling {
        let mut labeling = Labeling::with_molecule_count(smiles.len());
        for (mol_id, smi) in smiles.iter().enumerate() {
            let graph = match codec.smiles_decode(smi) {
                Ok(g) => g,
                Err(_) => continue,
            };
            let elems = elements_of(&graph);
            for (atom_idx, elem) in elems.iter().enumerate() {
                let atoms = vec![atom_idx as u32];
                let primary = topology.primary_key(&atoms);
                let name = descend(hierarchy, elem);
                labeling.set(mol_id as u32, primary, name);
            }
        }
        labeling
    }
}

fn descend(hierarchy: &Hierarchy, elem: &str) -> String {
    let mut current = hierarchy.root_ids()[0];
    loop {
        let node = hierarchy.node(current).expect("current node always exists");
        let mut next = None;
        for &child_id in &node.children {
            let child = hierarchy.node(child_id).expect("child always exists");
            if child.structure.payload.is_empty() || child.structure.payload == criterion(elem) {
                next = Some(child_id);
                break;
            }
        }
        match next {
            Some(id) => current = id,
            None => return hierarchy.node(current).unwrap().name.clone(),
        }
    }
}

fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64
}

/// Variance-reduction objective: `single` reports the group's own variance
/// (zero means homogeneous, nothing left to split), `split` rewards a
/// partition that lowers pooled variance, `merge` is its mirror image and
/// never reports an improvement (so an engine run driven by this objective
/// only ever splits).
pub struct VarianceObjective;

impl Objective<f64> for VarianceObjective {
    fn single(&self, group: &[f64]) -> f64 {
        variance(group)
    }

    fn split(&self, a: &[f64], b: &[f64], _overlap: i64) -> f64 {
        let mut combined = a.to_vec();
        combined.extend_from_slice(b);
        (variance(a) + variance(b)) - variance(&combined)
    }

    fn merge(&self, a: &[f64], b: &[f64], _overlap: i64) -> f64 {
        let mut combined = a.to_vec();
        combined.extend_from_slice(b);
        variance(&combined) - (variance(a) + variance(b))
    }

    fn report(&self, group: &[f64]) -> String {
        format!("n={} var={:.4}", group.len(), variance(group))
    }

    fn is_discrete(&self) -> bool {
        false
    }
}

/// Always reports that a group has pressure and that merging improves the
/// score; used to drive a MERGE-only run regardless of the underlying data.
pub struct AlwaysMergeObjective;

impl Objective<f64> for AlwaysMergeObjective {
    fn single(&self, _group: &[f64]) -> f64 {
        1.0
    }

    fn split(&self, _a: &[f64], _b: &[f64], _overlap: i64) -> f64 {
        0.0
    }

    fn merge(&self, _a: &[f64], _b: &[f64], _overlap: i64) -> f64 {
        -1.0
    }

    fn report(&self, group: &[f64]) -> String {
        format!("n={}", group.len())
    }

    fn is_discrete(&self) -> bool {
        false
    }
}

pub fn default_micro(operation: Operation, node: &str, depth_max: usize) -> MicroStep {
    MicroStep {
        operation,
        cluster_node: node.to_string(),
        pcp: PerceptionConfig {
            splitter: SplitterConfig {
                bit_search_min: 1,
                bit_search_limit: 1,
                branch_depth_min: 0,
                branch_depth_limit: 1,
                branch_min: 0,
                branch_limit: 1,
                split_general: true,
                split_specific: true,
                return_matches: false,
            },
            extender: ExtenderConfig { depth_min: 0, depth_max, direction_forward: true },
        },
        overlap: vec![0],
        direct_enable: false,
        direct_limit: 0,
        iterative_enable: operation == Operation::Split,
        micro_accept_max_total: 0,
        micro_accept_max_per_cluster: 0,
    }
}

pub fn atom_dataset(entries: &[(&str, &[(u32, f64)])]) -> Dataset<f64> {
    let mut dataset = Dataset::new(presets::atom());
    for (smiles, selections) in entries {
        let mut sel = HashMap::new();
        for &(atom, value) in *selections {
            sel.insert(vec![atom], value);
        }
        dataset.push(*smiles, sel);
    }
    dataset
}

/// Builds a single-root hierarchy and labels every atom in `smiles` onto it
/// up front, so the clustering handed to `engine::run` starts from a
/// correct (non-empty) mapping rather than an empty placeholder.
pub fn root_clustering(smiles: &[String]) -> Clustering {
    let hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let labeling = ElementLabeler.assign(&hierarchy, &ElementCodec, smiles, &presets::atom());
    Clustering::new(hierarchy, labeling)
}

#[allow(dead_code)]
pub fn distinct_names(clustering: &Clustering) -> HashSet<String> {
    clustering.hierarchy.pre_order().into_iter().map(|id| clustering.hierarchy.node(id).unwrap().name.clone()).collect()
}
