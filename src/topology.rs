//! Topology descriptors and interaction-coordinate keys: atom, bond,
//! pair, angle, torsion, and out-of-plane IC kinds, each with a fixed
//! arity and a canonical "primary" anchor-atom projection.

use serde::{Deserialize, Serialize};

/// A topology-typed descriptor: arity `k` and the canonical `primary`
/// indices inside a k-tuple that identify the anchor atoms for a given IC
/// kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topology {
    pub name: &'static str,
    pub arity: usize,
    pub primary: Vec<usize>,
}

impl Topology {
    pub const fn new(name: &'static str, arity: usize, primary: &'static [usize]) -> TopologyBuilder {
        TopologyBuilder { name, arity, primary }
    }

    /// Projects a full IC tuple down to its canonical primary key.
    ///
    /// # Panics
    /// If `atoms.len() != self.arity`.
    pub fn primary_key(&self, atoms: &[u32]) -> Vec<u32> {
        assert_eq!(atoms.len(), self.arity, "IC tuple arity mismatch for topology {}", self.name);
        self.primary.iter().map(|&i| atoms[i]).collect()
    }
}

/// Const-friendly builder so the `presets` below can be `const` values that
/// still produce an owned `Vec` on use.
pub struct TopologyBuilder {
    name: &'static str,
    arity: usize,
    primary: &'static [usize],
}

impl TopologyBuilder {
    pub fn build(&self) -> Topology {
        Topology {
            name: self.name,
            arity: self.arity,
            primary: self.primary.to_vec(),
        }
    }
}

/// The standard topology catalogue (arity 1/2/2/3/4/4 for
/// atom/bond/pair/angle/torsion/out-of-plane).
pub mod presets {
    use super::Topology;

    pub fn atom() -> Topology {
        Topology::new("atom", 1, &[0]).build()
    }

    pub fn bond() -> Topology {
        Topology::new("bond", 2, &[0, 1]).build()
    }

    pub fn pair() -> Topology {
        Topology::new("pair", 2, &[0, 1]).build()
    }

    pub fn angle() -> Topology {
        Topology::new("angle", 3, &[0, 1, 2]).build()
    }

    pub fn torsion() -> Topology {
        Topology::new("torsion", 4, &[0, 1, 2, 3]).build()
    }

    pub fn out_of_plane() -> Topology {
        Topology::new("outofplane", 4, &[0, 1, 2, 3]).build()
    }
}

/// `(mol_id, atoms)`, the raw IC as seen by the dataset. The canonical map
/// key used throughout the core is the *primary* projection of `atoms`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IcKey {
    pub mol_id: u32,
    pub atoms: Vec<u32>,
}

impl IcKey {
    pub fn new(mol_id: u32, atoms: Vec<u32>) -> Self {
        Self { mol_id, atoms }
    }

    /// The canonical map key: `(mol_id, primary(atoms))`.
    pub fn canonical(&self, topo: &Topology) -> (u32, Vec<u32>) {
        (self.mol_id, topo.primary_key(&self.atoms))
    }
}
