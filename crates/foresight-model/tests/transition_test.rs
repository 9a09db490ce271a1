use std::sync::Arc;
use std::thread;

use foresight_core::models::{ModelSnapshot, TransitionRecord};
use foresight_core::{Action, SnapshotError};
use foresight_model::seeds::{default_workflows, seed_model};
use foresight_model::TransitionModel;
use proptest::prelude::*;

fn a(name: &str) -> Action {
    Action::from(name)
}

// ── Reinforcement ──

#[test]
fn reinforce_creates_then_accumulates() {
    let model = TransitionModel::new();
    assert_eq!(model.weight(&a("X"), &a("Y")), None);

    let first = model.reinforce(&a("X"), &a("Y"), 0.1);
    let second = model.reinforce(&a("X"), &a("Y"), 0.1);

    assert!((first - 0.1).abs() < 1e-12);
    assert!((second - 0.2).abs() < 1e-12);
    assert_eq!(model.len(), 1);
    assert_eq!(model.edge_count(), 1);
}

#[test]
fn reinforce_saturates_at_one() {
    let model = TransitionModel::new();
    for _ in 0..20 {
        model.reinforce(&a("A"), &a("B"), 0.3);
    }
    assert_eq!(model.weight(&a("A"), &a("B")), Some(1.0));
}

#[test]
fn predict_unknown_source_is_empty() {
    let model = TransitionModel::new();
    assert!(model.predict(&a("NEVER_SEEN")).is_empty());
}

#[test]
fn predict_returns_a_copy() {
    let model = TransitionModel::new();
    model.reinforce(&a("A"), &a("B"), 0.5);
    let mut copy = model.predict(&a("A"));
    copy.map_weights(|_| 0.0);
    assert_eq!(model.weight(&a("A"), &a("B")), Some(0.5));
}

#[test]
fn successors_keep_insertion_order() {
    let model = TransitionModel::new();
    model.reinforce(&a("A"), &a("C"), 0.2);
    model.reinforce(&a("A"), &a("B"), 0.2);
    let order: Vec<String> = model
        .predict(&a("A"))
        .iter()
        .map(|c| c.action.to_string())
        .collect();
    assert_eq!(order, vec!["C", "B"]);
}

// ── Concurrency ──

#[test]
fn concurrent_reinforcement_loses_no_updates() {
    let model = Arc::new(TransitionModel::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                for _ in 0..50 {
                    model.reinforce(&a("A"), &a("B"), 0.001);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let weight = model.weight(&a("A"), &a("B")).unwrap();
    assert!((weight - 0.4).abs() < 1e-9, "weight was {weight}");
}

// ── Decay ──

#[test]
fn decay_scales_every_edge() {
    let model = TransitionModel::new();
    model.reinforce(&a("A"), &a("B"), 0.8);
    model.reinforce(&a("C"), &a("D"), 0.4);

    assert_eq!(model.decay(0.5), 0);
    assert!((model.weight(&a("A"), &a("B")).unwrap() - 0.4).abs() < 1e-12);
    assert!((model.weight(&a("C"), &a("D")).unwrap() - 0.2).abs() < 1e-12);
}

// ── Snapshots ──

#[test]
fn export_then_import_reproduces_weights() {
    let source = TransitionModel::new();
    seed_model(&source, default_workflows());
    let snapshot = source.export();

    let target = TransitionModel::new();
    let written = target.import(&snapshot).unwrap();

    assert_eq!(written, source.edge_count());
    assert_eq!(target.export().transitions, snapshot.transitions);
}

#[test]
fn import_overwrites_listed_edges_only() {
    let model = TransitionModel::new();
    model.reinforce(&a("A"), &a("B"), 0.9);
    model.reinforce(&a("A"), &a("C"), 0.1);

    let snapshot = ModelSnapshot::new(vec![TransitionRecord {
        from: a("A"),
        to: a("B"),
        weight: 0.3,
    }]);
    model.import(&snapshot).unwrap();

    assert_eq!(model.weight(&a("A"), &a("B")), Some(0.3));
    assert_eq!(model.weight(&a("A"), &a("C")), Some(0.1));
}

#[test]
fn replace_discards_existing_edges() {
    let model = TransitionModel::new();
    model.reinforce(&a("OLD"), &a("EDGE"), 0.5);
    let snapshot = ModelSnapshot::new(vec![TransitionRecord {
        from: a("NEW"),
        to: a("EDGE"),
        weight: 0.5,
    }]);
    model.replace(&snapshot).unwrap();
    assert_eq!(model.sources(), vec![a("NEW")]);
}

#[test]
fn invalid_snapshot_leaves_model_untouched() {
    let model = TransitionModel::new();
    model.reinforce(&a("A"), &a("B"), 0.5);
    let snapshot = ModelSnapshot::new(vec![TransitionRecord {
        from: a("A"),
        to: a("B"),
        weight: 2.0,
    }]);

    let err = model.replace(&snapshot).unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidWeight { .. }));
    assert_eq!(model.weight(&a("A"), &a("B")), Some(0.5));
}

// ── Seeds ──

#[test]
fn default_workflows_match_documented_weights() {
    let model = TransitionModel::new();
    seed_model(&model, default_workflows());

    assert_eq!(model.weight(&a("OPEN_PDF"), &a("SUMMARIZE_TEXT")), Some(0.7));
    assert_eq!(model.weight(&a("TYPE_IMPORT"), &a("LOAD_LIBRARY")), Some(0.8));
    assert_eq!(model.len(), 9);
}

// ── Properties ──

proptest! {
    #[test]
    fn weights_are_monotone_and_bounded(deltas in prop::collection::vec(0.0f64..0.5, 1..40)) {
        let model = TransitionModel::new();
        let mut previous = 0.0;
        for delta in deltas {
            let current = model.reinforce(&a("A"), &a("B"), delta);
            prop_assert!(current >= previous);
            prop_assert!((0.0..=1.0).contains(&current));
            previous = current;
        }
    }
}
