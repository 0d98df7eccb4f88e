//! Macro/micro iteration plan.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::splitter::SplitterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Split,
    Merge,
}

/// Extender config half of the perception config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtenderConfig {
    pub depth_min: usize,
    pub depth_max: usize,
    /// Whether extension proceeds outward from the primary atoms (`true`)
    /// or is otherwise constrained; left as an opaque direction flag.
    pub direction_forward: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionConfig {
    pub splitter: SplitterConfig,
    pub extender: ExtenderConfig,
}

/// One micro step: one candidate-generation pass for one targeted node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroStep {
    pub operation: Operation,
    pub cluster_node: String,
    pub pcp: PerceptionConfig,
    pub overlap: Vec<i64>,
    pub direct_enable: bool,
    pub direct_limit: usize,
    pub iterative_enable: bool,
    /// Per-micro acceptance caps. `0` means unlimited.
    pub micro_accept_max_total: usize,
    pub micro_accept_max_per_cluster: usize,
}

/// One macro step: a finite sequence of micro steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroStep {
    pub micro_steps: Vec<MicroStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroOutcome {
    /// The current macro will run again (`repeat_step`); cursor unchanged.
    Repeat,
    /// Cursor advanced but more macros remain.
    Advanced,
    /// Cursor advanced past the last macro.
    Done,
}

/// The strategy's cursor + per-node step tracker, plus the macro-level
/// acceptance caps it owns. `0` means unlimited for every cap, and
/// `filter_above` being `None` means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    macros: Vec<MacroStep>,
    cursor: usize,
    step_tracker: HashMap<String, usize>,
    pub macro_accept_max_total: usize,
    pub macro_accept_max_per_cluster: usize,
    /// Whether any candidate was admitted anywhere across the run so far;
    /// drives the single `restart()` at outer-loop end.
    ever_admitted: bool,
    pub filter_above: Option<f64>,
}

impl Strategy {
    pub fn new(macros: Vec<MacroStep>) -> Self {
        Strategy {
            macros,
            cursor: 0,
            step_tracker: HashMap::new(),
            macro_accept_max_total: 0,
            macro_accept_max_per_cluster: 0,
            ever_admitted: false,
            filter_above: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_macro(&self) -> Option<&MacroStep> {
        self.macros.get(self.cursor)
    }

    pub fn macro_count(&self) -> usize {
        self.macros.len()
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.macros.len()
    }

    /// A node is targeted at the current macro iff `cursor >=
    /// step_tracker[name]`.
    pub fn is_targeted(&self, node_name: &str) -> bool {
        self.cursor >= self.step_tracker.get(node_name).copied().unwrap_or(0)
    }

    /// Updates the step tracker for the macro just completed and decides
    /// whether to repeat the macro, advance, or terminate.
    ///
    /// `considered` is every node that was targeted this macro; `repeat`
    /// is the subset whose owned IC set changed via an admitted edit.
    pub fn complete_macro(&mut self, considered: &HashSet<String>, repeat: &HashSet<String>, admitted_this_macro: bool) -> MacroOutcome {
        for name in considered.difference(repeat) {
            let entry = self.step_tracker.entry(name.clone()).or_insert(0);
            *entry = (*entry).max(self.cursor);
        }
        for name in repeat {
            self.step_tracker.insert(name.clone(), 0);
        }

        if admitted_this_macro {
            self.ever_admitted = true;
        }

        if admitted_this_macro && self.macro_accept_max_total > 0 {
            MacroOutcome::Repeat
        } else {
            self.cursor += 1;
            if self.cursor >= self.macros.len() {
                MacroOutcome::Done
            } else {
                MacroOutcome::Advanced
            }
        }
    }

    /// Resets progress after a successful full pass, so the outer loop can
    /// run once more from the top.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.step_tracker.clear();
    }

    pub fn ever_admitted(&self) -> bool {
        self.ever_admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micro(op: Operation, node: &str) -> MicroStep {
        MicroStep {
            operation: op,
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
                extender: ExtenderConfig { depth_min: 0, depth_max: 1, direction_forward: true },
            },
            overlap: vec![0],
            direct_enable: false,
            direct_limit: 0,
            iterative_enable: true,
            micro_accept_max_total: 0,
            micro_accept_max_per_cluster: 0,
        }
    }

    #[test]
    fn repeat_only_when_capped_and_admitted() {
        let mut strategy = Strategy::new(vec![
            MacroStep { micro_steps: vec![micro(Operation::Split, "p0")] },
            MacroStep { micro_steps: vec![micro(Operation::Split, "p0")] },
        ]);
        strategy.macro_accept_max_total = 2;

        let considered: HashSet<String> = ["p0".to_string()].into_iter().collect();
        let repeat = HashSet::new();

        assert_eq!(strategy.complete_macro(&considered, &repeat, true), MacroOutcome::Repeat);
        assert_eq!(strategy.cursor(), 0);

        assert_eq!(strategy.complete_macro(&considered, &repeat, false), MacroOutcome::Advanced);
        assert_eq!(strategy.cursor(), 1);
    }

    #[test]
    fn uncapped_admission_still_advances() {
        let mut strategy = Strategy::new(vec![MacroStep { micro_steps: vec![micro(Operation::Split, "p0")] }]);
        let considered: HashSet<String> = ["p0".to_string()].into_iter().collect();
        assert_eq!(strategy.complete_macro(&considered, &HashSet::new(), true), MacroOutcome::Done);
    }

    #[test]
    fn repeat_nodes_reset_tracker_others_advance_past_cursor() {
        let mut strategy = Strategy::new(vec![
            MacroStep { micro_steps: vec![] },
            MacroStep { micro_steps: vec![] },
            MacroStep { micro_steps: vec![] },
        ]);
        strategy.macro_accept_max_total = 1;
        let considered: HashSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        let repeat: HashSet<String> = ["b".to_string()].into_iter().collect();

        strategy.complete_macro(&considered, &repeat, false);
        assert_eq!(strategy.cursor(), 1);
        assert!(strategy.is_targeted("a")); // tracker["a"]=1, cursor=1 -> targeted
        assert!(strategy.is_targeted("b")); // tracker["b"]=0
    }
}
