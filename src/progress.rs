//! Progress reporting to standard output.
//!
//! Kept separate from `engine` so the orchestration loop stays testable
//! without capturing stdout; `log::warn!` is used for the
//! data-inconsistency counted-warning policy, everything else here is a
//! direct `println!` the way a CLI-facing optimizer reports run state.

use crate::candidate::Candidate;
use crate::clustering::Clustering;
use crate::hierarchy::NodeId;
use crate::objective::Objective;
use crate::scoring::ScoreResult;
use crate::strategy::Operation;

/// Per-macro banner: iteration counts, current `X`, parameter count, and a
/// pretty-printed tree of `(depth, index, name, objective_report, smarts)`.
/// Walking the tree doubles as the data-inconsistency check over the
/// current, real clustering: any labeled IC with no observation is reported
/// through `reporter`.
pub fn macro_banner<O: crate::assignment::Observation>(
    macro_index: usize,
    macro_count: usize,
    x: f64,
    clustering: &Clustering,
    dataset: &crate::assignment::Dataset<O>,
    objective: &dyn Objective<O>,
    reporter: &mut DataInconsistencyReporter,
) {
    println!(
        "===== macro {}/{} : {} parameters : X = {:.6} =====",
        macro_index + 1,
        macro_count,
        clustering.hierarchy.len(),
        x
    );
    for root in clustering.hierarchy.root_ids() {
        print_subtree(clustering, dataset, objective, *root, 0, 0, reporter);
    }
}

#[allow(clippy::too_many_arguments)]
fn print_subtree<O: crate::assignment::Observation>(
    clustering: &Clustering,
    dataset: &crate::assignment::Dataset<O>,
    objective: &dyn Objective<O>,
    id: NodeId,
    depth: usize,
    index: usize,
    reporter: &mut DataInconsistencyReporter,
) {
    let Some(node) = clustering.hierarchy.node(id) else { return };
    let group = clustering.observations_for_checked(&node.name, dataset, |mol_id, atoms| reporter.report(mol_id, atoms));
    let report = objective.report(&group);
    println!("{}[{}] {} {} {}", "  ".repeat(depth), index, node.name, report, node.smarts);
    for (i, &child) in node.children.iter().enumerate() {
        print_subtree(clustering, dataset, objective, child, depth + 1, i, reporter);
    }
}

/// One candidate's scoring status line: `Cnd. <i>/<n> <parent> <reused?>
/// X=<x> dX=<dx> N=<match_len> C=<Y|N> <smarts>`.
pub fn candidate_line(index: usize, total: usize, candidate: &Candidate, score: &ScoreResult, x0: f64, reused: bool, smarts: &str) {
    println!(
        "Cnd. {}/{} {} {} X={:.6} dX={:.6} N={} C={} {}",
        index + 1,
        total,
        candidate.node_name,
        if reused { "reused" } else { "scored" },
        score.x,
        score.x - x0,
        score.match_len,
        if score.keep { "Y" } else { "N" },
        smarts
    );
}

/// Per-nanostep filtered, sorted candidate table, `->` marking admitted
/// rows.
pub fn nanostep_table(ranked: &[(Candidate, ScoreResult)], admitted_ids: &std::collections::HashSet<u64>) {
    for (candidate, score) in ranked {
        let marker = if admitted_ids.contains(&candidate.id) { "->" } else { "  " };
        println!(
            "{} id={} {} X={:.6} N={} keep={}",
            marker, candidate.id, candidate.node_name, score.x, score.match_len, score.keep
        );
    }
}

/// Success banner after an admitted edit is applied: `>>>>> New parameter
/// …` for SPLIT, `>>>>> Delete parameter …` for MERGE.
pub fn success_banner(operation: Operation, node_name: &str, smarts: &str) {
    match operation {
        Operation::Split => println!(">>>>> New parameter {} : {}", node_name, smarts),
        Operation::Merge => println!(">>>>> Delete parameter {}", node_name),
    }
}

/// Data-inconsistency policy: emit up to 10 warnings, suppress the rest
/// with a final count.
pub struct DataInconsistencyReporter {
    emitted: usize,
    suppressed: usize,
}

impl Default for DataInconsistencyReporter {
    fn default() -> Self {
        DataInconsistencyReporter { emitted: 0, suppressed: 0 }
    }
}

impl DataInconsistencyReporter {
    const LIMIT: usize = 10;

    pub fn report(&mut self, mol_id: u32, primary: &[u32]) {
        if self.emitted < Self::LIMIT {
            log::warn!("labeled IC ({}, {:?}) missing from observations", mol_id, primary);
            self.emitted += 1;
        } else {
            self.suppressed += 1;
        }
    }

    pub fn finish(&self) {
        if self.suppressed > 0 {
            log::warn!("{} further data-inconsistency warnings suppressed", self.suppressed);
        }
    }
}
