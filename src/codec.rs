//! The SMARTS/SMILES codec contract. Entirely external: the core only
//! calls through this trait and never parses SMARTS/SMILES itself.

use crate::graph::{MoleculeGraph, Structure};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode SMILES `{0}`")]
    InvalidSmiles(String),
}

pub trait GraphCodec: Send + Sync {
    fn smiles_decode(&self, smiles: &str) -> Result<MoleculeGraph, CodecError>;

    fn smiles_encode(&self, graph: &MoleculeGraph) -> String;

    /// Encodes a structure's graph directly to a SMARTS pattern string.
    fn smarts_encode(&self, structure: &Structure) -> String;

    /// Encodes a structure extracted with a known topology to SMARTS,
    /// renumbering the primary atoms starting at 1.
    fn smarts_encode_structure(&self, structure: &Structure, topo: &crate::topology::Topology) -> String;

    /// Names of the atom/bond primitive codecs this codec was built with
    /// (e.g. element, charge, aromaticity, bond order). Exposed so a
    /// `Splitter` can bound its own bit-search space; the core does not
    /// interpret the contents.
    fn primitive_codecs(&self) -> &[&str];

    fn atom_primitives(&self) -> &[&str];

    fn bond_primitives(&self) -> &[&str];
}
