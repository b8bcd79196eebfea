//! Scenario tests: a client store mirroring the simulated backend under
//! concurrent scripted writers, faults, and recovery.

use leadlane_core::config::TransitionPolicy;
use leadlane_core::feed::ChangeFeed;
use leadlane_core::model::Status;
use leadlane_core::remote::LeadBackend;
use leadlane_core::store::LeadStore;
use leadlane_core::transition::TransitionController;
use leadlane_sim::{ActorPool, DeterministicRng, Faults, MemoryBackend, check_all};
use proptest::prelude::*;

struct Client {
    store: LeadStore,
    feed: ChangeFeed,
}

/// Subscribe first, snapshot second — the startup race the merge policy
/// is designed to make safe.
fn connect(backend: &MemoryBackend) -> Client {
    let feed = ChangeFeed::new(backend.subscribe());
    let mut store = LeadStore::new();
    store.load_snapshot(backend.query_all().expect("initial fetch"));
    Client { store, feed }
}

#[test]
fn long_campaign_converges() {
    let mut rng = DeterministicRng::new(2026);
    let backend = MemoryBackend::seeded(10, &mut rng);
    let mut client = connect(&backend);
    let mut pool = ActorPool::new(DeterministicRng::new(777));

    for round in 0..40 {
        // Every few rounds the transport hiccups and duplicates a commit.
        if round % 7 == 0 {
            backend.set_faults(Faults {
                duplicate_next: true,
                ..Faults::default()
            });
        }
        pool.run_round(&backend, 5);
        // The client drains between rounds, never mid-handler.
        client.feed.pump(&mut client.store);
    }
    client.feed.pump(&mut client.store);

    let result = check_all(&client.store, &backend);
    assert!(result.passed, "violations: {:?}", result.violations);
}

#[test]
fn client_transitions_interleave_with_remote_actors() {
    let mut rng = DeterministicRng::new(31);
    let backend = MemoryBackend::seeded(8, &mut rng);
    let mut client = connect(&backend);
    let mut pool = ActorPool::new(DeterministicRng::new(32));
    let controller = TransitionController::new(TransitionPolicy::default());
    let mut pick = DeterministicRng::new(33);

    for _ in 0..25 {
        pool.run_round(&backend, 3);
        client.feed.pump(&mut client.store);

        // The local user drags a card somewhere.
        let snapshot = client.store.snapshot();
        if !snapshot.is_empty() {
            let lead = pick.pick(&snapshot).clone();
            let target = *pick.pick(&Status::ALL);
            // Same-status drops no-op; everything else runs the
            // optimistic cycle against the live backend.
            let _ = controller.set_status(&mut client.store, &backend, &lead.id, target);
        }
        client.feed.pump(&mut client.store);
    }
    client.feed.pump(&mut client.store);

    let result = check_all(&client.store, &backend);
    assert!(result.passed, "violations: {:?}", result.violations);
}

#[test]
fn rejected_write_leaves_client_and_backend_agreeing() {
    let mut rng = DeterministicRng::new(51);
    let backend = MemoryBackend::seeded(4, &mut rng);
    let mut client = connect(&backend);
    let controller = TransitionController::new(TransitionPolicy::default());

    let victim = client.store.snapshot().first().cloned().expect("seeded lead");
    let target = if victim.status == Status::Closed {
        Status::New
    } else {
        Status::Closed
    };

    backend.set_faults(Faults {
        reject_writes: true,
        ..Faults::default()
    });
    let err = controller
        .set_status(&mut client.store, &backend, &victim.id, target)
        .unwrap_err();
    assert_eq!(err.code(), "E1002");
    backend.set_faults(Faults::default());

    client.feed.pump(&mut client.store);
    let result = check_all(&client.store, &backend);
    assert!(result.passed, "violations: {:?}", result.violations);
    assert_eq!(
        client.store.get(&victim.id).expect("still present").status,
        victim.status
    );
}

#[test]
fn disconnect_then_explicit_recovery() {
    let mut rng = DeterministicRng::new(61);
    let backend = MemoryBackend::seeded(6, &mut rng);
    let mut client = connect(&backend);
    let mut pool = ActorPool::new(DeterministicRng::new(62));

    // The feed dies while remote writers keep going.
    backend.drop_subscriptions();
    pool.run_round(&backend, 10);
    let stats = client.feed.pump(&mut client.store);
    assert!(stats.disconnected);

    // Degraded but available: the stale snapshot still serves reads.
    assert!(!client.store.snapshot().is_empty());

    // Recovery is explicit: resubscribe, then re-fetch the snapshot.
    let mut recovered = connect(&backend);
    pool.run_round(&backend, 5);
    recovered.feed.pump(&mut recovered.store);

    let result = check_all(&recovered.store, &backend);
    assert!(result.passed, "violations: {:?}", result.violations);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any seed, any round count: after the drain the mirror holds.
    #[test]
    fn any_campaign_converges(seed in 0u64..10_000, rounds in 1u32..20) {
        let mut rng = DeterministicRng::new(seed);
        let backend = MemoryBackend::seeded(6, &mut rng);
        let mut client = connect(&backend);
        let mut pool = ActorPool::new(DeterministicRng::new(seed.rotate_left(17)));

        for _ in 0..rounds {
            pool.run_round(&backend, 4);
            client.feed.pump(&mut client.store);
        }
        client.feed.pump(&mut client.store);

        let result = check_all(&client.store, &backend);
        prop_assert!(result.passed, "violations: {:?}", result.violations);
    }
}

#[test]
fn malformed_feed_rows_never_poison_the_mirror() {
    let mut rng = DeterministicRng::new(71);
    let backend = MemoryBackend::seeded(5, &mut rng);
    let mut client = connect(&backend);
    let mut pool = ActorPool::new(DeterministicRng::new(72));

    // A row with a status the client does not recognize, and a payload
    // with no row image at all.
    backend.emit_raw(
        "INSERT",
        Some(serde_json::json!({
            "id": "ld-bad",
            "nombre": "Fantasma",
            "telefono": "55",
            "vehiculo_interes": "Rav4",
            "estado": "Congelado",
            "created_at": "2026-01-01T09:00:00Z",
        })),
        None,
    );
    backend.emit_raw("UPDATE", None, None);

    pool.run_round(&backend, 6);
    client.feed.pump(&mut client.store);

    let result = check_all(&client.store, &backend);
    assert!(result.passed, "violations: {:?}", result.violations);
    assert!(client.store.get(&"ld-bad".into()).is_none());
}
