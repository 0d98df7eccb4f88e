//! Molecule-graph and substructure types. The graph primitive model and
//! subgraph extension are an external collaborator; the core only ever
//! touches them through [`GraphExtender`].
//!
//! `MoleculeGraph` and `Structure` are intentionally opaque to the rest of
//! the crate beyond the handful of operations the core actually calls:
//! extending a tuple of atoms outward by bonds, unioning several subgraphs
//! into a reference structure, and bounding how deep that union can extend.

use serde::{Deserialize, Serialize};

/// An opaque, codec-owned molecular graph. The core never inspects its
/// contents directly; it only ever round-trips it through a
/// [`crate::codec::GraphCodec`] and a [`GraphExtender`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeGraph {
    /// Stable per-molecule atom count, used only for bounds-checking IC
    /// tuples before handing them to the codec.
    pub atom_count: u32,
    /// Codec-defined opaque payload (e.g. an adjacency/primitive encoding).
    pub payload: Vec<u8>,
}

/// A substructure graph plus the atom tuple it was extracted around,
/// paired with a SMARTS string wherever it labels a hierarchy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Atom indices selected from the parent molecule, in canonical order.
    pub select: Vec<u32>,
    /// Codec-defined opaque payload for the extracted subgraph.
    pub payload: Vec<u8>,
}

/// External collaborator: subgraph extension (`extend`, `union`,
/// `structure_max_depth`).
pub trait GraphExtender: Send + Sync {
    /// Extends the subgraph around `atoms` within `graph` out to `depth`
    /// bonds from the primary atoms.
    fn extend(&self, graph: &MoleculeGraph, atoms: &[u32], depth: usize) -> Structure;

    /// Structural union of a set of same-topology structures: the smallest
    /// structure that is a superset of every member, used to build the
    /// reference structure a [`crate::splitter::Splitter`] searches within.
    fn union(&self, structures: &[Structure]) -> Structure;

    /// The maximum depth the splitter may search for a given node's
    /// current match set; bounds the extension performed before invoking
    /// the splitter.
    fn structure_max_depth(&self, structures: &[Structure]) -> usize;
}
