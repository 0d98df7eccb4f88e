//! The pluggable scoring objective. `overlap` is an opaque "edit
//! allowance" integer forwarded verbatim from the [`crate::strategy`]
//! step; its meaning beyond that is left to the objective.

/// All methods are pure functions of their arguments.
pub trait Objective<O>: Send + Sync {
    /// Whether a group has any remaining pressure to split; zero means
    /// "leave alone".
    fn single(&self, group: &[O]) -> f64;

    /// Negative means "B is worth separating from A".
    fn split(&self, a: &[O], b: &[O], overlap: i64) -> f64;

    /// Negative means "merging improves the score".
    fn merge(&self, a: &[O], b: &[O], overlap: i64) -> f64;

    /// Human-readable one-line summary of a group, used in progress
    /// output: a pretty-printed tree of `(depth, index, name,
    /// objective_report, smarts)`.
    fn report(&self, group: &[O]) -> String;

    /// Selects whether `direct` candidate enumeration uses label identity
    /// as the partition oracle.
    fn is_discrete(&self) -> bool;
}
