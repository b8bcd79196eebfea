//! End-to-end engine tests: subscription channel -> feed adapter -> store
//! merge -> projections, including the snapshot/feed race and the
//! optimistic write cycle.

use std::sync::mpsc;

use chrono::{TimeZone, Utc};
use leadlane_core::feed::{ChangeFeed, FeedPoll, RawChange};
use leadlane_core::model::{Lead, LeadId, Status};
use leadlane_core::store::LeadStore;
use leadlane_core::view::{SortOrder, TableFilter, project_board, project_table};

fn lead(id: &str, name: &str, status: Status, minute: u32) -> Lead {
    Lead {
        id: LeadId::from(id),
        name: name.to_string(),
        phone: "5512345678".to_string(),
        vehicle_interest: "Rav4".to_string(),
        comment: None,
        status,
        classification: None,
        created_at: Utc
            .with_ymd_and_hms(2026, 7, 14, 11, minute, 0)
            .single()
            .expect("valid ts"),
    }
}

fn raw(event_type: &str, record: &Lead, seq: u64) -> RawChange {
    let value = serde_json::to_value(record).expect("serialize lead");
    let (new, old) = if event_type == "DELETE" {
        (None, Some(value))
    } else {
        (Some(value), None)
    };
    RawChange {
        event_type: event_type.to_string(),
        new,
        old,
        commit_seq: seq,
    }
}

#[test]
fn feed_events_arriving_before_snapshot_are_not_lost() {
    let (tx, rx) = mpsc::channel();
    let mut feed = ChangeFeed::new(rx);
    let mut store = LeadStore::new();

    // The subscription starts delivering while the snapshot fetch is in
    // flight: an update for a row the snapshot will also contain, and an
    // insert for a row it will not.
    tx.send(raw("UPDATE", &lead("a", "Ana", Status::Contacted, 1), 10))
        .expect("send");
    tx.send(raw("INSERT", &lead("c", "Carmen", Status::New, 3), 11))
        .expect("send");
    feed.pump(&mut store);

    // Snapshot lands second: last snapshot wins for fields.
    store.load_snapshot(vec![
        lead("a", "Ana", Status::New, 1),
        lead("b", "Berta", Status::New, 2),
    ]);

    // Post-snapshot commits re-assert what the snapshot raced past.
    tx.send(raw("UPDATE", &lead("a", "Ana", Status::Contacted, 1), 12))
        .expect("send");
    tx.send(raw("INSERT", &lead("c", "Carmen", Status::New, 3), 13))
        .expect("send");
    feed.pump(&mut store);

    let table = project_table(&store, &TableFilter::default(), SortOrder::CreatedDesc);
    let ids: Vec<&str> = table.leads.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["c", "b", "a"]);
    assert_eq!(
        store.get(&LeadId::from("a")).expect("present").status,
        Status::Contacted
    );
}

#[test]
fn board_and_table_never_diverge_on_status() {
    let (tx, rx) = mpsc::channel();
    let mut feed = ChangeFeed::new(rx);
    let mut store = LeadStore::new();

    for (i, status) in [
        Status::New,
        Status::Contacted,
        Status::Closed,
        Status::Lost,
        Status::Contacted,
    ]
    .iter()
    .enumerate()
    {
        let id = format!("ld-{i}");
        let minute = u32::try_from(i).expect("small");
        tx.send(raw("INSERT", &lead(&id, "Lead", *status, minute), minute.into()))
            .expect("send");
    }
    feed.pump(&mut store);

    let board = project_board(&store);
    let table = project_table(&store, &TableFilter::default(), SortOrder::CreatedDesc);

    // Same store version: the views derive from the same state.
    assert_eq!(board.store_version, table.store_version);

    // Every non-Lost table row sits in exactly one board column with the
    // same status; Lost rows sit in none.
    for row in &table.leads {
        let holding: Vec<Status> = board
            .columns
            .iter()
            .filter(|column| column.leads.iter().any(|card| card.id == row.id))
            .map(|column| column.status)
            .collect();
        if row.status == Status::Lost {
            assert!(holding.is_empty());
        } else {
            assert_eq!(holding, [row.status]);
        }
    }
}

#[test]
fn disconnection_keeps_last_snapshot_serving() {
    let (tx, rx) = mpsc::channel();
    let mut feed = ChangeFeed::new(rx);
    let mut store = LeadStore::new();

    tx.send(raw("INSERT", &lead("a", "Ana", Status::New, 1), 1))
        .expect("send");
    feed.pump(&mut store);

    // Subscription dies.
    drop(tx);
    let stats = feed.pump(&mut store);
    assert!(stats.disconnected);
    assert!(feed.is_disconnected());

    // Degraded but available: the snapshot still serves and local
    // mutations still apply.
    assert_eq!(store.snapshot().len(), 1);
    assert_eq!(feed.poll(), FeedPoll::Disconnected);
    store
        .apply_optimistic(
            &LeadId::from("a"),
            &leadlane_core::model::LeadPatch::status_only(Status::Contacted),
        )
        .expect("local writes continue");
    assert_eq!(
        store.get(&LeadId::from("a")).expect("present").status,
        Status::Contacted
    );
}

#[test]
fn echo_of_local_edit_is_idempotent() {
    let (tx, rx) = mpsc::channel();
    let mut feed = ChangeFeed::new(rx);
    let mut store = LeadStore::new();
    store.load_snapshot(vec![lead("a", "Ana", Status::New, 1)]);

    // Local optimistic edit, then the confirmed echo from the feed.
    let token = store
        .apply_optimistic(
            &LeadId::from("a"),
            &leadlane_core::model::LeadPatch::status_only(Status::Contacted),
        )
        .expect("apply");
    tx.send(raw("UPDATE", &lead("a", "Ana", Status::Contacted, 1), 1))
        .expect("send");
    feed.pump(&mut store);

    // The echo spent the tag; the late ack confirm is a harmless no-op.
    store.confirm(&LeadId::from("a"), token);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].status, Status::Contacted);
}
