//! The splitter contract. Entirely external: enumerating candidate child
//! structures from a parent pattern is chemistry-specific SMARTS-bit
//! enumeration, out of scope for this crate.

use serde::{Deserialize, Serialize};

use crate::graph::Structure;

/// Perception config's splitter half: SMARTS search bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    pub bit_search_min: usize,
    pub bit_search_limit: usize,
    pub branch_depth_min: usize,
    pub branch_depth_limit: usize,
    pub branch_min: usize,
    pub branch_limit: usize,
    pub split_general: bool,
    pub split_specific: bool,
    pub return_matches: bool,
}

/// Result of direct enumeration: a candidate structure plus which of the
/// input members it matched, returned without any separate labeler/scoring
/// pass.
#[derive(Debug, Clone)]
pub struct DirectCandidate {
    pub structure: Structure,
    /// Indices into the `members` slice passed to
    /// [`Splitter::enumerate_direct`] that matched `structure`.
    pub matched: Vec<usize>,
    pub unmatched: Vec<usize>,
}

/// Given a parent structure, a reference union, and a set of member
/// structures, enumerates candidate child structures.
pub trait Splitter: Send + Sync {
    /// Iterative enumeration: bit/branch search bounded by `config`,
    /// seeded from the reference union `q` of the targeted node's current
    /// match set. No scoring or matching is performed here; the caller
    /// only receives candidate patterns.
    fn enumerate(&self, config: &SplitterConfig, s: &Structure, q: &Structure, members: &[Structure]) -> Vec<Structure>;

    /// Direct enumeration: partitions `members` by label identity (for
    /// discrete objectives) or equivalent, returning matched/unmatched
    /// sets alongside each candidate (guarded by `direct_enable`/
    /// `direct_limit` in the caller).
    fn enumerate_direct(&self, config: &SplitterConfig, s: &Structure, members: &[Structure]) -> Vec<DirectCandidate>;
}
