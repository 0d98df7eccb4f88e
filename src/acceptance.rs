//! Nanostep acceptance loop.
//!
//! Score every open candidate, filter, rank, admit as many as the caps
//! allow, apply the admitted batch in one relabel, and repeat against the
//! new baseline until a round admits nothing.

use std::collections::{HashMap, HashSet};

use crate::candidate::{Candidate, CandidatePayload};
use crate::clustering::Clustering;
use crate::codec::GraphCodec;
use crate::dispatch::WorkQueue;
use crate::error::Result;
use crate::labeler::Labeler;
use crate::progress;
use crate::scoring::{self, ScoreResult};
use crate::strategy::{MicroStep, Operation};
use crate::topology::Topology;
use crate::workspace::WorkspaceHandle;

/// The SMARTS text to show in progress output for a candidate: the
/// provisional structure's encoding for SPLIT, the current child's own
/// pattern for MERGE.
fn candidate_smarts(candidate: &Candidate, clustering: &Clustering, codec: &dyn GraphCodec, topology: &Topology) -> String {
    match &candidate.payload {
        CandidatePayload::Split { structure } => codec.smarts_encode_structure(structure, topology),
        CandidatePayload::Merge { child_name } => clustering
            .hierarchy
            .id_by_name(child_name)
            .and_then(|id| clustering.hierarchy.node(id))
            .map(|n| n.smarts.clone())
            .unwrap_or_default(),
    }
}

/// Running acceptance-cap counters for one macro step
/// (`macro_accept_max_total`/`macro_accept_max_per_cluster`), threaded by
/// the caller across every micro step belonging to the macro.
#[derive(Debug, Default)]
pub struct MacroBudget {
    total_admitted: usize,
    per_cluster_admitted: HashMap<String, usize>,
}

impl MacroBudget {
    fn exhausted_total(&self, cap: usize) -> bool {
        cap > 0 && self.total_admitted >= cap
    }

    fn exhausted_for_cluster(&self, cap: usize, node_name: &str) -> bool {
        cap > 0 && self.per_cluster_admitted.get(node_name).copied().unwrap_or(0) >= cap
    }

    fn record(&mut self, node_name: &str) {
        self.total_admitted += 1;
        *self.per_cluster_admitted.entry(node_name.to_string()).or_insert(0) += 1;
    }
}

/// Outcome of running one micro step's nanostep loop to exhaustion.
#[derive(Debug, Default)]
pub struct MicroOutcome {
    pub admitted_ids: Vec<u64>,
    /// Nodes whose owned IC set changed via an admitted edit this micro
    /// step, fed into `Strategy::complete_macro` as its `repeat` set.
    pub changed_nodes: HashSet<String>,
}

impl MicroOutcome {
    pub fn admitted_any(&self) -> bool {
        !self.admitted_ids.is_empty()
    }
}

/// Runs the nanostep loop for one micro step to completion:
/// score every open candidate, drop ones the filters rule out, rank the
/// rest, admit as many as the caps allow, apply them together, relabel
/// once, and repeat against the new baseline until nothing is admitted.
///
/// `handle` and `x0` are updated in place so the caller can chain the next
/// micro step from the post-edit state.
#[allow(clippy::too_many_arguments)]
pub fn run_nanosteps<O: crate::assignment::Observation>(
    handle: &mut WorkspaceHandle<O>,
    work_queue: &dyn WorkQueue<O>,
    labeler: &dyn Labeler,
    micro: &MicroStep,
    mut candidates: Vec<Candidate>,
    x0: &mut f64,
    macro_budget: &mut MacroBudget,
    macro_accept_max_total: usize,
    macro_accept_max_per_cluster: usize,
    filter_above: Option<f64>,
) -> Result<MicroOutcome> {
    let mut outcome = MicroOutcome::default();
    let mut micro_total = 0usize;
    let mut micro_per_cluster: HashMap<String, usize> = HashMap::new();
    let mut ignored: HashSet<u64> = HashSet::new();

    loop {
        candidates.retain(|c| !ignored.contains(&c.id));

        {
            let ws = handle.get();
            candidates.retain(|c| {
                let group = ws.clustering.observations_for(&c.node_name, &ws.dataset);
                ws.objective.single(&group) != 0.0
            });
        }
        if candidates.is_empty() {
            break;
        }

        let scores = work_queue.submit(handle, &candidates, *x0);
        let score_by_id: HashMap<u64, ScoreResult> = scores.into_iter().collect();

        {
            let ws = handle.get();
            for (i, candidate) in candidates.iter().enumerate() {
                if let Some(score) = score_by_id.get(&candidate.id) {
                    let smarts = candidate_smarts(candidate, &ws.clustering, ws.codec.as_ref(), ws.topology.as_ref());
                    progress::candidate_line(i, candidates.len(), candidate, score, *x0, false, &smarts);
                }
            }
        }

        // A SPLIT candidate whose provisional child matched nothing can
        // never become useful by rescoring; drop it for good.
        candidates.retain(|c| {
            if c.operation == Operation::Split {
                score_by_id.get(&c.id).map(|s| s.match_len > 0).unwrap_or(false)
            } else {
                true
            }
        });
        if candidates.is_empty() {
            break;
        }

        // Acceptable candidates first, then lowest global objective, then
        // smallest match set, then stable by generation order.
        let mut ranked: Vec<&Candidate> = candidates.iter().collect();
        ranked.sort_by(|a, b| {
            let sa = score_by_id.get(&a.id).copied().unwrap_or_else(ScoreResult::empty_partition);
            let sb = score_by_id.get(&b.id).copied().unwrap_or_else(ScoreResult::empty_partition);
            (!sa.keep)
                .cmp(&!sb.keep)
                .then(sa.x.partial_cmp(&sb.x).unwrap_or(std::cmp::Ordering::Equal))
                .then(sa.match_len.cmp(&sb.match_len))
                .then(a.id.cmp(&b.id))
                .then(a.node_name.cmp(&b.node_name))
        });

        let mut admitted_this_round: Vec<Candidate> = Vec::new();
        let mut admitted_ids_this_round: HashSet<u64> = HashSet::new();

        for &candidate in &ranked {
            let score = match score_by_id.get(&candidate.id) {
                Some(s) => *s,
                None => continue,
            };
            if !score.keep {
                ignored.insert(candidate.id);
                continue;
            }
            if let Some(bound) = filter_above {
                if score.x - *x0 > bound {
                    ignored.insert(candidate.id);
                    continue;
                }
            }
            if micro.micro_accept_max_total > 0 && micro_total >= micro.micro_accept_max_total {
                continue;
            }
            if micro.micro_accept_max_per_cluster > 0
                && micro_per_cluster.get(&candidate.node_name).copied().unwrap_or(0) >= micro.micro_accept_max_per_cluster
            {
                continue;
            }
            if macro_budget.exhausted_total(macro_accept_max_total) {
                continue;
            }
            if macro_budget.exhausted_for_cluster(macro_accept_max_per_cluster, &candidate.node_name) {
                continue;
            }

            micro_total += 1;
            *micro_per_cluster.entry(candidate.node_name.clone()).or_insert(0) += 1;
            macro_budget.record(&candidate.node_name);
            admitted_ids_this_round.insert(candidate.id);
            admitted_this_round.push(candidate.clone());
        }

        let ranked_table: Vec<(Candidate, ScoreResult)> = ranked
            .iter()
            .map(|c| {
                let score = score_by_id.get(&c.id).copied().unwrap_or_else(ScoreResult::empty_partition);
                ((*c).clone(), score)
            })
            .collect();
        progress::nanostep_table(&ranked_table, &admitted_ids_this_round);

        if admitted_this_round.is_empty() {
            break;
        }

        let mut hierarchy = handle.get().clustering.hierarchy.clone();
        for candidate in &admitted_this_round {
            scoring::apply_candidate(&mut hierarchy, handle.get().codec.as_ref(), handle.get().topology.as_ref(), candidate)?;
            outcome.changed_nodes.insert(candidate.node_name.clone());
        }
        let new_clustering = {
            let ws = handle.get();
            let new_labeling = labeler.assign(&hierarchy, ws.codec.as_ref(), ws.smiles.as_slice(), ws.topology.as_ref());
            Clustering::new(hierarchy, new_labeling)
        };
        *x0 = {
            let ws = handle.get();
            scoring::global_split_sum(&new_clustering, &ws.dataset, ws.objective.as_ref(), 0)
        };
        *handle = handle.with_clustering(new_clustering);

        outcome.admitted_ids.extend(admitted_this_round.iter().map(|c| c.id));
        candidates.retain(|c| !admitted_ids_this_round.contains(&c.id));
    }

    Ok(outcome)
}
