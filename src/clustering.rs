//! `Clustering = (Hierarchy, labeling, mapping)`.
//!
//! The mapping is always rebuilt from scratch from a `Labeling`, never
//! patched incrementally: labelings are regenerated after any structural
//! edit rather than trusted to update correctly in place.

use std::collections::HashMap;

use crate::assignment::{Dataset, Observation};
use crate::hierarchy::Hierarchy;
use crate::labeler::Labeling;

/// Inverse of [`Labeling`]: leaf name -> list of owned ICs, each recorded
/// as `(mol_id, primary_tuple)`.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    by_name: HashMap<String, Vec<(u32, Vec<u32>)>>,
}

impl Mapping {
    pub fn build(labeling: &Labeling) -> Self {
        let mut by_name: HashMap<String, Vec<(u32, Vec<u32>)>> = HashMap::new();
        for (mol_id, atoms, name) in labeling.iter() {
            by_name.entry(name.to_string()).or_default().push((mol_id, atoms.to_vec()));
        }
        Mapping { by_name }
    }

    pub fn ics_for(&self, name: &str) -> &[(u32, Vec<u32>)] {
        self.by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty_for(&self, name: &str) -> bool {
        self.ics_for(name).is_empty()
    }

    pub fn len_for(&self, name: &str) -> usize {
        self.ics_for(name).len()
    }

    /// The full set of ICs owned by any leaf.
    pub fn all_ics(&self) -> Vec<(u32, Vec<u32>)> {
        self.by_name.values().flatten().cloned().collect()
    }
}

/// `(Hierarchy, labeling, mapping)`.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub hierarchy: Hierarchy,
    pub labeling: Labeling,
    pub mapping: Mapping,
}

impl Clustering {
    pub fn new(hierarchy: Hierarchy, labeling: Labeling) -> Self {
        let mapping = Mapping::build(&labeling);
        Clustering { hierarchy, labeling, mapping }
    }

    /// Looks up the observations for every IC currently labeled `name`.
    /// Labeled ICs with no matching observation are silently dropped; use
    /// [`Clustering::observations_for_checked`] where that gap should be
    /// reported instead.
    pub fn observations_for<'a, O: Observation>(&self, name: &str, dataset: &'a Dataset<O>) -> Vec<O> {
        self.mapping
            .ics_for(name)
            .iter()
            .filter_map(|(mol_id, atoms)| dataset.get(*mol_id, atoms).cloned())
            .collect()
    }

    /// Same lookup as [`Clustering::observations_for`], but calls
    /// `on_missing(mol_id, atoms)` for every labeled IC with no matching
    /// observation instead of dropping it unreported.
    pub fn observations_for_checked<O: Observation>(&self, name: &str, dataset: &Dataset<O>, mut on_missing: impl FnMut(u32, &[u32])) -> Vec<O> {
        let mut out = Vec::new();
        for (mol_id, atoms) in self.mapping.ics_for(name) {
            match dataset.get(*mol_id, atoms) {
                Some(obs) => out.push(obs.clone()),
                None => on_missing(*mol_id, atoms),
            }
        }
        out
    }
}
