//! Property-style invariant checks (labeling totality, first-match-wins,
//! SPLIT/MERGE structural invariants, objective determinism, acceptance
//! cap/filter correctness, termination) layered on the same toy fakes used
//! by `tests/scenarios.rs`.

mod common;

use std::sync::Arc;

use besmarts_cluster::acceptance::{run_nanosteps, MacroBudget};
use besmarts_cluster::candidate::{Candidate, CandidatePayload};
use besmarts_cluster::config::EngineConfig;
use besmarts_cluster::prelude::*;
use besmarts_cluster::workspace::{Workspace, WorkspaceHandle};
use besmarts_cluster::{engine, scoring};

use common::*;

#[test]
fn labeling_is_total_over_every_dataset_ic() {
    let smiles = vec!["C,C,O".to_string(), "O,C".to_string()];
    let hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let labeling = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &presets::atom());

    assert_eq!(labeling.len(), 5);
    for (mol_idx, smi) in smiles.iter().enumerate() {
        for atom_idx in 0..smi.split(',').count() {
            assert!(labeling.get(mol_idx as u32, &[atom_idx as u32]).is_some());
        }
    }
}

#[test]
fn first_child_wins_over_the_parent_when_both_could_match() {
    let mut hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let root = hierarchy.id_by_name("p0").unwrap();
    let child = hierarchy.insert_child(root, 0, "elem=O".to_string(), Structure { select: vec![], payload: b"elem=O".to_vec() }).unwrap();
    let child_name = hierarchy.node(child).unwrap().name.clone();

    let smiles = vec!["C,O".to_string()];
    let labeling = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &presets::atom());

    assert_eq!(labeling.get(0, &[0]), Some("p0"));
    assert_eq!(labeling.get(0, &[1]), Some(child_name.as_str()));
}

#[test]
fn split_then_merge_restores_the_original_topology() {
    let smiles = vec!["C,C,O".to_string()];
    let topology = presets::atom();

    let mut hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let original_len = hierarchy.len();

    let candidate = Candidate {
        id: 0,
        operation: Operation::Split,
        node_name: "p0".to_string(),
        overlap: 0,
        payload: CandidatePayload::Split { structure: Structure { select: vec![], payload: b"elem=O".to_vec() } },
    };
    scoring::apply_candidate(&mut hierarchy, &ElementCodec, &topology, &candidate).unwrap();
    assert_eq!(hierarchy.len(), original_len + 1);
    let child_name = hierarchy.node_by_name("p1").unwrap().name.clone();

    let labeling_after_split = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &topology);
    let after_split = Clustering::new(hierarchy.clone(), labeling_after_split);
    assert_eq!(after_split.mapping.ics_for(&child_name), &[(0u32, vec![2u32])]);

    let merge_candidate = Candidate {
        id: 1,
        operation: Operation::Merge,
        node_name: "p0".to_string(),
        overlap: 0,
        payload: CandidatePayload::Merge { child_name: child_name.clone() },
    };
    scoring::apply_candidate(&mut hierarchy, &ElementCodec, &topology, &merge_candidate).unwrap();

    assert_eq!(hierarchy.len(), original_len);
    assert!(hierarchy.node_by_name(&child_name).is_none());
    let root = hierarchy.node_by_name("p0").unwrap();
    assert!(root.children.is_empty());

    let labeling_after_merge = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &topology);
    let after_merge = Clustering::new(hierarchy, labeling_after_merge);
    let mut root_ics = after_merge.mapping.ics_for("p0").to_vec();
    root_ics.sort();
    assert_eq!(root_ics, vec![(0u32, vec![0u32]), (0u32, vec![1u32]), (0u32, vec![2u32])]);
}

#[test]
fn global_split_sum_is_a_pure_function_of_the_clustering() {
    let smiles = vec!["C,C,O".to_string()];
    let mut hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let root = hierarchy.id_by_name("p0").unwrap();
    hierarchy.insert_child(root, 0, "elem=O".to_string(), Structure { select: vec![], payload: b"elem=O".to_vec() }).unwrap();
    let labeling = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &presets::atom());
    let clustering = Clustering::new(hierarchy, labeling);
    let dataset = atom_dataset(&[("C,C,O", &[(0, 1.0), (1, 1.0), (2, 2.0)])]);

    let first = scoring::global_split_sum(&clustering, &dataset, &VarianceObjective, 0);
    let second = scoring::global_split_sum(&clustering, &dataset, &VarianceObjective, 0);
    assert_eq!(first, second);
}

#[test]
fn filter_above_rejects_candidates_whose_delta_x_exceeds_the_bound() {
    let mut hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let root = hierarchy.id_by_name("p0").unwrap();
    hierarchy.insert_child(root, 0, "[#6]".to_string(), Structure { select: vec![0], payload: vec![] }).unwrap();

    let mut labeling = Labeling::with_molecule_count(1);
    labeling.set(0, vec![0], "p0".to_string());
    let clustering = Clustering::new(hierarchy, labeling);

    let mut dataset: Dataset<f64> = Dataset::new(presets::atom());
    let mut sel = std::collections::HashMap::new();
    sel.insert(vec![0u32], 1.0);
    dataset.push("C", sel);

    struct RootLabeler;
    impl Labeler for RootLabeler {
        fn assign(&self, hierarchy: &Hierarchy, _codec: &dyn GraphCodec, _smiles: &[String], _topology: &Topology) -> Labeling {
            let root_name = hierarchy.node(hierarchy.root_ids()[0]).unwrap().name.clone();
            let mut labeling = Labeling::with_molecule_count(1);
            labeling.set(0, vec![0], root_name);
            labeling
        }
    }

    let workspace = Workspace {
        clustering,
        dataset: Arc::new(dataset),
        codec: Arc::new(ElementCodec) as Arc<dyn GraphCodec>,
        labeler: Arc::new(RootLabeler) as Arc<dyn Labeler>,
        objective: Arc::new(AlwaysMergeObjective) as Arc<dyn Objective<f64>>,
        molecules: Arc::new(vec![MoleculeGraph { atom_count: 1, payload: vec![] }]),
        topology: Arc::new(presets::atom()),
        smiles: Arc::new(vec!["C".to_string()]),
    };
    let mut handle = WorkspaceHandle::new(workspace);

    struct SequentialQueue;
    impl besmarts_cluster::dispatch::WorkQueue<f64> for SequentialQueue {
        fn submit(&self, workspace: &WorkspaceHandle<f64>, candidates: &[Candidate], x0: f64) -> Vec<(u64, scoring::ScoreResult)> {
            let ws = workspace.get();
            candidates
                .iter()
                .map(|c| {
                    let score = scoring::score_candidate(
                        &ws.clustering,
                        &ws.dataset,
                        ws.objective.as_ref(),
                        ws.codec.as_ref(),
                        ws.labeler.as_ref(),
                        ws.smiles.as_slice(),
                        ws.topology.as_ref(),
                        c,
                    )
                    .unwrap_or_else(|_| scoring::ScoreResult::worker_failure(x0));
                    (c.id, score)
                })
                .collect()
        }
    }

    let candidate = Candidate {
        id: 0,
        operation: Operation::Merge,
        node_name: "p0".to_string(),
        overlap: 0,
        payload: CandidatePayload::Merge { child_name: "p1".to_string() },
    };

    let micro = default_micro(Operation::Merge, "p0", 0);
    let labeler = RootLabeler;
    let queue = SequentialQueue;
    let mut x0 = 0.0;
    let mut budget = MacroBudget::default();

    // AlwaysMergeObjective reports a merge as free (x stays at x0), so a
    // filter bound of exactly 0.0 should still admit it...
    let outcome = run_nanosteps(&mut handle, &queue, &labeler, &micro, vec![candidate.clone()], &mut x0, &mut budget, 0, 0, Some(0.0)).unwrap();
    assert!(outcome.admitted_any());

    // ...while a negative bound rejects it, since dX=0.0 > -0.5.
    let mut hierarchy2 = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let root2 = hierarchy2.id_by_name("p0").unwrap();
    hierarchy2.insert_child(root2, 0, "[#6]".to_string(), Structure { select: vec![0], payload: vec![] }).unwrap();
    let mut labeling2 = Labeling::with_molecule_count(1);
    labeling2.set(0, vec![0], "p0".to_string());
    let clustering2 = Clustering::new(hierarchy2, labeling2);

    let mut dataset2: Dataset<f64> = Dataset::new(presets::atom());
    let mut sel2 = std::collections::HashMap::new();
    sel2.insert(vec![0u32], 1.0);
    dataset2.push("C", sel2);

    let workspace2 = Workspace {
        clustering: clustering2,
        dataset: Arc::new(dataset2),
        codec: Arc::new(ElementCodec) as Arc<dyn GraphCodec>,
        labeler: Arc::new(RootLabeler) as Arc<dyn Labeler>,
        objective: Arc::new(AlwaysMergeObjective) as Arc<dyn Objective<f64>>,
        molecules: Arc::new(vec![MoleculeGraph { atom_count: 1, payload: vec![] }]),
        topology: Arc::new(presets::atom()),
        smiles: Arc::new(vec!["C".to_string()]),
    };
    let mut handle2 = WorkspaceHandle::new(workspace2);
    let mut x0_2 = 0.0;
    let mut budget2 = MacroBudget::default();
    let outcome2 = run_nanosteps(&mut handle2, &queue, &labeler, &micro, vec![candidate], &mut x0_2, &mut budget2, 0, 0, Some(-0.5)).unwrap();
    assert!(!outcome2.admitted_any());
}

#[test]
fn engine_run_terminates_under_a_capped_macro_budget() {
    let smiles = vec!["C,C,O".to_string()];

    let mut hierarchy = Hierarchy::new_root("[*]".to_string(), Structure { select: vec![0], payload: vec![] });
    let root = hierarchy.id_by_name("p0").unwrap();
    hierarchy.insert_child(root, 0, "elem=O".to_string(), Structure { select: vec![], payload: b"elem=O".to_vec() }).unwrap();
    hierarchy.insert_child(root, 0, "elem=N".to_string(), Structure { select: vec![], payload: b"elem=N".to_vec() }).unwrap();
    let labeling = ElementLabeler.assign(&hierarchy, &ElementCodec, &smiles, &presets::atom());
    let clustering = Clustering::new(hierarchy, labeling);

    let dataset = atom_dataset(&[("C,C,O", &[(0, 1.0), (1, 1.0), (2, 2.0)])]);
    let mut strategy = Strategy::new(vec![
        MacroStep { micro_steps: vec![default_micro(Operation::Merge, "p0", 0)] },
        MacroStep { micro_steps: vec![default_micro(Operation::Merge, "p0", 0)] },
    ]);
    strategy.macro_accept_max_total = 1;

    let mut config = EngineConfig::default();
    config.checkpoint.path = std::env::temp_dir().join(format!("besmarts-cluster-test-termination-{}.mp", std::process::id()));

    let outcome = engine::run(
        clustering,
        dataset,
        Arc::new(ElementCodec),
        Arc::new(ElementLabeler),
        Arc::new(AlwaysMergeObjective),
        &ElementExtender,
        &ElementSplitter,
        strategy,
        &config,
    )
    .unwrap();

    assert!(outcome.strategy.is_done());
    // Both phantom children ("elem=O", "elem=N") get merged away across the
    // run's single restart pass even though the per-macro cap is 1: the
    // leftover one is picked up on a later macro/restart, not lost.
    assert_eq!(outcome.clustering.hierarchy.len(), 1);
    std::fs::remove_file(&config.checkpoint.path).ok();
}
