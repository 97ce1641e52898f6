//! End-to-end integration tests for the index lifecycle around builds:
//! scheduling, failure policies, deletion, cleanup, concurrent builds,
//! and export.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

use pql_index::export::export_outcomes_jsonl;
use pql_index::{
    CompositeRelations, FailurePolicy, IndexConfig, IndexScheduler, IndexStatus, IndexStore,
    IndexType, IndexedPredicates, LabelManager, MemoryIndexStore, MemoryLabelManager,
    MemoryNetRepository, NetId, NetSystem, Relation, RelationIndexBuilder, ScriptedPredicates, Tvl,
};

// ============================================================================
// Helpers
// ============================================================================

fn net(id: i64, labels: &[&str]) -> NetSystem {
    let mut net = NetSystem::new(NetId(id), format!("net-{id}"));
    for label in labels {
        net.add_transition(Some(*label));
    }
    net
}

fn evaluator() -> ScriptedPredicates {
    ScriptedPredicates::new()
        .with_unary(Relation::CanOccur, ["A"], Tvl::True)
        .with_unary(Relation::CanOccur, ["B"], Tvl::True)
        .with_binary(Relation::CanConflict, ["A"], ["B"], Tvl::True)
        .with_binary(Relation::CanConflict, ["B"], ["A"], Tvl::True)
        .with_symmetric(Relation::CanCooccur, ["A"], ["B"], Tvl::False)
}

// ============================================================================
// 1. Scheduler drains the queue; a missing net is marked CANNOTINDEX
// ============================================================================

#[test]
fn test_run_until_idle_marks_failures() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(1, &["A", "B"]));
    nets.insert(net(3, &["A"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    for id in [1, 2, 3] {
        store.register_net(NetId(id), IndexType::Predicates).unwrap();
    }
    let mut ev = evaluator();
    let config = IndexConfig::default();

    let outcomes = IndexScheduler::new(&nets, &labels, &mut ev, &store, &config)
        .run_until_idle()
        .unwrap();

    let summary: Vec<(NetId, IndexStatus, bool)> =
        outcomes.iter().map(|o| (o.net, o.status, o.succeeded())).collect();
    assert_eq!(
        summary,
        vec![
            (NetId(1), IndexStatus::Indexed, true),
            (NetId(2), IndexStatus::CannotIndex, false),
            (NetId(3), IndexStatus::Indexed, true),
        ]
    );
    assert_eq!(store.get_status(NetId(2)).unwrap(), IndexStatus::CannotIndex);
    assert!(outcomes[1].error.as_deref().unwrap_or_default().contains("not found"));
}

// ============================================================================
// 2. Release policy hands a failed net back once the queue is drained
// ============================================================================

#[test]
fn test_release_policy_requeues() {
    let nets = MemoryNetRepository::new();
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    store.register_net(NetId(7), IndexType::Predicates).unwrap();
    let mut ev = evaluator();
    let config = IndexConfig::from_json_str(r#"{"failure_policy": "release"}"#).unwrap();

    let mut scheduler = IndexScheduler::new(&nets, &labels, &mut ev, &store, &config);
    assert_eq!(scheduler.policy(), FailurePolicy::Release);

    let outcomes = scheduler.run_until_idle().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, IndexStatus::Unindexed);
    assert_eq!(store.get_status(NetId(7)).unwrap(), IndexStatus::Unindexed);

    // The net is retried once it exists.
    nets.insert(net(7, &["A"]));
    let job = scheduler.run_next().unwrap().unwrap();
    assert!(job.succeeded());
    assert!(scheduler.run_next().unwrap().is_none());
}

#[test]
fn test_release_policy_does_not_starve_later_nets() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(2, &["A", "B"]));
    nets.insert(net(3, &["A"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    let mut ev = evaluator();
    let config = IndexConfig::from_json_str(r#"{"failure_policy": "release"}"#).unwrap();

    let mut scheduler = IndexScheduler::new(&nets, &labels, &mut ev, &store, &config);
    for id in [1, 2, 3] {
        scheduler.enqueue(NetId(id)).unwrap();
    }
    let outcomes = scheduler.run_until_idle().unwrap();

    let summary: Vec<(NetId, IndexStatus)> = outcomes.iter().map(|o| (o.net, o.status)).collect();
    assert_eq!(
        summary,
        vec![
            (NetId(1), IndexStatus::Unindexed),
            (NetId(2), IndexStatus::Indexed),
            (NetId(3), IndexStatus::Indexed),
        ]
    );
    assert_eq!(store.get_status(NetId(1)).unwrap(), IndexStatus::Unindexed);
    assert_eq!(store.get_status(NetId(2)).unwrap(), IndexStatus::Indexed);
    assert_eq!(store.get_status(NetId(3)).unwrap(), IndexStatus::Indexed);
    assert_eq!(store.get_index_type(NetId(1)).unwrap(), Some(IndexType::Predicates));
}

// ============================================================================
// 3. Query-time composites over a finished index
// ============================================================================

#[test]
fn test_query_composites_after_build() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(1, &["A", "B"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    store.register_net(NetId(1), IndexType::Predicates).unwrap();
    let mut ev = evaluator();

    IndexScheduler::new(&nets, &labels, &mut ev, &store, &IndexConfig::default())
        .run_next()
        .unwrap()
        .unwrap();

    let a = labels.query_task("A").unwrap();
    let b = labels.query_task("B").unwrap();
    let q = IndexedPredicates::for_net(&store, NetId(1));
    assert_eq!(q.conflict(&a, &b), Tvl::True);
    assert_eq!(q.conflict(&b, &a), Tvl::True);
    assert_eq!(q.cooccur(&a, &b), Tvl::False);
    // canConflict(A,A) was never decided.
    assert_eq!(q.conflict(&a, &a), Tvl::Unknown);
}

// ============================================================================
// 4. Delete and rebuild
// ============================================================================

#[test]
fn test_delete_then_reindex() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(1, &["A", "B"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    store.register_net(NetId(1), IndexType::Predicates).unwrap();
    let mut ev = evaluator();

    store.claim(NetId(1)).unwrap();
    assert!(RelationIndexBuilder::new(&nets, &labels, &mut ev, &store).build(NetId(1)));
    let written = store.outcome_count(NetId(1)).unwrap();
    assert!(written > 0);

    // An INDEXED net cannot be rebuilt in place.
    assert!(!store.claim(NetId(1)).unwrap());
    assert!(!RelationIndexBuilder::new(&nets, &labels, &mut ev, &store).build(NetId(1)));

    assert_eq!(store.delete_index(NetId(1)).unwrap(), written);
    assert_eq!(store.get_status(NetId(1)).unwrap(), IndexStatus::Unindexed);

    assert!(store.claim(NetId(1)).unwrap());
    assert!(RelationIndexBuilder::new(&nets, &labels, &mut ev, &store).build(NetId(1)));
    assert_eq!(store.outcome_count(NetId(1)).unwrap(), written);
}

// ============================================================================
// 5. Cleanup releases an abandoned claim and drops its partial rows
// ============================================================================

#[test]
fn test_cleanup_after_abandoned_build() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(1, &["A", "B"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let config = IndexConfig::from_json_str(r#"{"stale_claim_secs": 60}"#).unwrap();
    let store = MemoryIndexStore::new().with_stale_claim_timeout(config.stale_claim_timeout());
    store.register_net(NetId(1), IndexType::Predicates).unwrap();
    store.claim(NetId(1)).unwrap();

    // A crashed builder left one row behind.
    let a = {
        labels.index_task("A").unwrap();
        labels.task_id("A", 1.0).unwrap()
    };
    store.write_unary_outcome(NetId(1), a, Relation::CanOccur, true).unwrap();

    assert_eq!(store.cleanup_at(Utc::now() + Duration::seconds(61)).unwrap(), 1);
    assert_eq!(store.get_status(NetId(1)).unwrap(), IndexStatus::Unindexed);
    assert_eq!(store.outcome_count(NetId(1)).unwrap(), 0);

    let mut ev = evaluator();
    let job = IndexScheduler::new(&nets, &labels, &mut ev, &store, &config)
        .run_next()
        .unwrap()
        .unwrap();
    assert!(job.succeeded());
}

// ============================================================================
// 6. Independent builds of different nets share one store
// ============================================================================

#[test]
fn test_concurrent_builds_on_shared_store() {
    let nets = MemoryNetRepository::new();
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    for id in 1..=4 {
        nets.insert(net(id, &["A", "B"]));
        store.register_net(NetId(id), IndexType::Predicates).unwrap();
    }
    let config = IndexConfig::default();

    let per_worker: Vec<usize> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(|| {
                    let mut ev = evaluator();
                    IndexScheduler::new(&nets, &labels, &mut ev, &store, &config)
                        .run_until_idle()
                        .unwrap()
                        .len()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(per_worker.iter().sum::<usize>(), 4);
    let expected = store.outcome_count(NetId(1)).unwrap();
    for id in 1..=4 {
        assert_eq!(store.get_status(NetId(id)).unwrap(), IndexStatus::Indexed);
        assert_eq!(store.outcome_count(NetId(id)).unwrap(), expected);
    }
}

// ============================================================================
// 7. Export of a finished index
// ============================================================================

#[test]
fn test_export_finished_index() {
    let nets = MemoryNetRepository::new();
    nets.insert(net(1, &["A", "B"]));
    let labels = MemoryLabelManager::new(vec![1.0]).unwrap();
    let store = MemoryIndexStore::new();
    store.register_net(NetId(1), IndexType::Predicates).unwrap();
    let mut ev = evaluator();
    IndexScheduler::new(&nets, &labels, &mut ev, &store, &IndexConfig::default())
        .run_next()
        .unwrap()
        .unwrap();

    let mut buf = Vec::new();
    let n = export_outcomes_jsonl(&store, NetId(1), &mut buf).unwrap();
    assert_eq!(n, store.outcome_count(NetId(1)).unwrap());

    let text = String::from_utf8(buf).unwrap();
    let header: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(header["status"], "INDEXED");
    assert_eq!(text.lines().count(), n + 1);
}
