//! The assignment store and caller-supplied dataset.
//!
//! `Dataset<O>` is the input `{smiles, selections: map<ic_tuple,
//! observation>}` list, sharing one [`Topology`]. The assignment store
//! itself is just `Dataset::get`: a lookup from `(molecule_index,
//! ic_tuple)` to the caller's opaque observation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::topology::Topology;

/// Marker bound for the opaque per-IC payload a caller associates with an
/// observation. Blanket-implemented for any type with the obvious
/// capabilities rather than a bespoke interface callers must implement by
/// hand.
pub trait Observation: Clone + Send + Sync + std::fmt::Debug {}
impl<T: Clone + Send + Sync + std::fmt::Debug> Observation for T {}

/// One molecule's worth of observations, keyed by the *primary* IC tuple
/// (the canonical projection of `atoms` used as a key everywhere).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry<O> {
    pub smiles: String,
    pub selections: HashMap<Vec<u32>, O>,
}

/// `dataset: list of {smiles, selections: map<ic_tuple, observation>}`
/// plus the shared topology every selection in it uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<O> {
    pub entries: Vec<DatasetEntry<O>>,
    pub topology: Topology,
}

impl<O: Observation> Dataset<O> {
    pub fn new(topology: Topology) -> Self {
        Self { entries: Vec::new(), topology }
    }

    pub fn push(&mut self, smiles: impl Into<String>, selections: HashMap<Vec<u32>, O>) {
        self.entries.push(DatasetEntry { smiles: smiles.into(), selections });
    }

    pub fn get(&self, mol_id: u32, primary: &[u32]) -> Option<&O> {
        self.entries.get(mol_id as usize)?.selections.get(primary)
    }

    pub fn molecule_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of ICs across the whole dataset, used by the worker
    /// scaling heuristics.
    pub fn ic_count(&self) -> usize {
        self.entries.iter().map(|e| e.selections.len()).sum()
    }

    pub fn smiles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.smiles.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_looks_up_by_molecule_and_primary_tuple() {
        let mut ds: Dataset<f64> = Dataset::new(crate::topology::presets::atom());
        let mut sel = HashMap::new();
        sel.insert(vec![0u32], 1.0);
        sel.insert(vec![1u32], 2.0);
        ds.push("CC", sel);

        assert_eq!(ds.get(0, &[0]), Some(&1.0));
        assert_eq!(ds.get(0, &[1]), Some(&2.0));
        assert_eq!(ds.get(0, &[2]), None);
        assert_eq!(ds.get(1, &[0]), None);
    }
}
