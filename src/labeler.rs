//! The labeler contract. Entirely external: SMARTS/graph matching is out
//! of scope for this crate. The core only consumes [`Labeler::assign`]'s
//! output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::codec::GraphCodec;
use crate::hierarchy::Hierarchy;
use crate::topology::Topology;

/// Per-molecule map IC-primary-tuple -> leaf name, plus the inverse
/// `name -> [(mol_id, atoms)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Labeling {
    per_molecule: Vec<HashMap<Vec<u32>, String>>,
}

impl Labeling {
    pub fn with_molecule_count(n: usize) -> Self {
        Self { per_molecule: vec![HashMap::new(); n] }
    }

    pub fn set(&mut self, mol_id: u32, primary: Vec<u32>, leaf_name: String) {
        if self.per_molecule.len() <= mol_id as usize {
            self.per_molecule.resize(mol_id as usize + 1, HashMap::new());
        }
        self.per_molecule[mol_id as usize].insert(primary, leaf_name);
    }

    pub fn get(&self, mol_id: u32, primary: &[u32]) -> Option<&str> {
        self.per_molecule.get(mol_id as usize)?.get(primary).map(|s| s.as_str())
    }

    pub fn molecule_count(&self) -> usize {
        self.per_molecule.len()
    }

    /// Iterates every labeled `(mol_id, primary_tuple, leaf_name)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32], &str)> {
        self.per_molecule.iter().enumerate().flat_map(|(mol_id, m)| {
            m.iter().map(move |(k, v)| (mol_id as u32, k.as_slice(), v.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.per_molecule.iter().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assigns every IC in the given molecules a leaf name from `hierarchy`.
/// Implementations must be deterministic and must not depend on scoring
/// history; they must not raise on unmatched ICs.
pub trait Labeler: Send + Sync {
    fn assign(
        &self,
        hierarchy: &Hierarchy,
        codec: &dyn GraphCodec,
        smiles: &[String],
        topology: &Topology,
    ) -> Labeling;
}
