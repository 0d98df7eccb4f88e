//! Top-level macro/micro/nanostep orchestration loop: walk the strategy's
//! macro sequence, run every targeted micro step's candidate generation
//! and acceptance, update the step tracker, checkpoint, and restart once
//! on overall success before terminating.

use std::collections::HashSet;
use std::sync::Arc;

use crate::acceptance::{run_nanosteps, MacroBudget};
use crate::assignment::{Dataset, Observation};
use crate::candidate::{generate_merge_candidates, generate_split_candidates};
use crate::checkpoint;
use crate::clustering::Clustering;
use crate::codec::GraphCodec;
use crate::config::EngineConfig;
use crate::decode;
use crate::dispatch::{effective_worker_count, LocalWorkQueue};
use crate::error::{EngineError, Result};
use crate::graph::GraphExtender;
use crate::labeler::Labeler;
use crate::objective::Objective;
use crate::progress;
use crate::scoring;
use crate::splitter::Splitter;
use crate::strategy::{MacroOutcome, Operation, Strategy};
use crate::workspace::{Workspace, WorkspaceHandle};

/// Final state once the outer loop terminates.
pub struct EngineOutcome {
    pub clustering: Clustering,
    pub strategy: Strategy,
}

/// Runs the optimizer to completion: macro sweep, targeted micro steps,
/// nanostep acceptance within each, step-tracker update, checkpoint, and a
/// single `restart()` on overall success before terminating.
#[allow(clippy::too_many_arguments)]
pub fn run<O: Observation + serde::Serialize>(
    clustering: Clustering,
    dataset: Dataset<O>,
    codec: Arc<dyn GraphCodec>,
    labeler: Arc<dyn Labeler>,
    objective: Arc<dyn Objective<O>>,
    extender: &dyn GraphExtender,
    splitter: &dyn Splitter,
    mut strategy: Strategy,
    config: &EngineConfig,
) -> Result<EngineOutcome> {
    let topology = dataset.topology.clone();
    let smiles: Vec<String> = dataset.smiles().into_iter().map(|s| s.to_string()).collect();
    let molecules = decode::decode_all(codec.as_ref(), &smiles, config.decode_batch_size, config.decode_parallel_threshold)
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    let ic_count = dataset.ic_count();

    // Kept outside the workspace so the nanostep loop can pass `&dyn
    // Labeler` to `run_nanosteps` without borrowing from `handle` at the
    // same time it passes `&mut handle`.
    let labeler_handle = Arc::clone(&labeler);

    let workspace = Workspace {
        clustering,
        dataset: Arc::new(dataset),
        codec,
        labeler,
        objective,
        molecules: Arc::new(molecules),
        topology: Arc::new(topology),
        smiles: Arc::new(smiles),
    };
    let mut handle = WorkspaceHandle::new(workspace);

    let mut x0 = {
        let ws = handle.get();
        scoring::global_split_sum(&ws.clustering, &ws.dataset, ws.objective.as_ref(), 0)
    };

    let mut restarted = false;
    let mut macro_index = 0usize;
    let mut data_reporter = progress::DataInconsistencyReporter::default();

    loop {
        while !strategy.is_done() {
            let macro_step = strategy.current_macro().expect("is_done() checked above").clone();
            let mut macro_budget = MacroBudget::default();

            loop {
                let mut considered: HashSet<String> = HashSet::new();
                let mut repeat_nodes: HashSet<String> = HashSet::new();
                let mut admitted_this_macro = false;

                {
                    let ws = handle.get();
                    progress::macro_banner(
                        macro_index,
                        strategy.macro_count(),
                        x0,
                        &ws.clustering,
                        &ws.dataset,
                        ws.objective.as_ref(),
                        &mut data_reporter,
                    );
                }

                for micro in &macro_step.micro_steps {
                    if !strategy.is_targeted(&micro.cluster_node) {
                        continue;
                    }
                    considered.insert(micro.cluster_node.clone());

                    let candidates = {
                        let ws = handle.get();
                        let mut next_id = 0u64;
                        let generated = match micro.operation {
                            Operation::Split => generate_split_candidates(
                                &micro.cluster_node,
                                micro,
                                &ws.clustering,
                                &ws.dataset,
                                ws.objective.as_ref(),
                                ws.molecules.as_slice(),
                                extender,
                                splitter,
                                distinct_label_count(&ws.clustering, &ws.dataset, &micro.cluster_node),
                                &mut next_id,
                            ),
                            Operation::Merge => generate_merge_candidates(&micro.cluster_node, micro, &ws.clustering, &mut next_id),
                        };
                        match generated {
                            Ok(c) => c,
                            // InvalidConfiguration: skip this micro step.
                            // NodeMissing: the target vanished under an earlier
                            // edit this macro; skip it too, step_tracker untouched.
                            Err(EngineError::InvalidConfiguration { .. }) | Err(EngineError::NodeMissing(_)) => continue,
                            Err(e) => return Err(e),
                        }
                    };
                    if candidates.is_empty() {
                        continue;
                    }

                    let workers = effective_worker_count(ic_count, candidates.len());
                    let work_queue = LocalWorkQueue::new(config.work_queue.clone(), workers);

                    let outcome = run_nanosteps(
                        &mut handle,
                        &work_queue,
                        labeler_handle.as_ref(),
                        micro,
                        candidates,
                        &mut x0,
                        &mut macro_budget,
                        strategy.macro_accept_max_total,
                        strategy.macro_accept_max_per_cluster,
                        strategy.filter_above,
                    )?;

                    if outcome.admitted_any() {
                        admitted_this_macro = true;
                        repeat_nodes.extend(outcome.changed_nodes);
                        progress::success_banner(micro.operation, &micro.cluster_node, "");
                    }
                }

                if config.checkpoint.after_every_macro {
                    let ws = handle.get();
                    checkpoint::write_checkpoint(&config.checkpoint.path, &ws.dataset, &ws.clustering, &strategy)?;
                }

                macro_index += 1;
                match strategy.complete_macro(&considered, &repeat_nodes, admitted_this_macro) {
                    MacroOutcome::Repeat => continue,
                    MacroOutcome::Advanced | MacroOutcome::Done => break,
                }
            }
        }

        if strategy.ever_admitted() && !restarted {
            restarted = true;
            strategy.restart();
            continue;
        }
        break;
    }

    let ws = handle.get();
    checkpoint::write_checkpoint(&config.checkpoint.path, &ws.dataset, &ws.clustering, &strategy)?;
    let final_clustering = ws.clustering.clone();
    data_reporter.finish();

    Ok(EngineOutcome { clustering: final_clustering, strategy })
}

fn distinct_label_count<O: Observation>(clustering: &Clustering, dataset: &Dataset<O>, node_name: &str) -> usize {
    let group = clustering.observations_for(node_name, dataset);
    let distinct: HashSet<String> = group.iter().map(|o| format!("{:?}", o)).collect();
    distinct.len()
}
