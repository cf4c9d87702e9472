// Unit tests for the session registry and status projection

mod common;

use common::encoder;
use stream_encoder::{Session, SessionRegistry, SessionStatus, StatusSnapshot, StatusSummary};

fn registry_with(ids: &[&str]) -> SessionRegistry {
    let mut registry = SessionRegistry::new();
    for id in ids {
        registry.upsert(Session::new(encoder(id)));
    }
    registry
}

#[test]
fn test_new_session_starts_stopped() {
    let session = Session::new(encoder("a"));

    assert_eq!(session.id, "a");
    assert_eq!(session.status, SessionStatus::Stopped);
}

#[test]
fn test_list_keeps_insertion_order() {
    let registry = registry_with(&["zeta", "alpha", "mid"]);

    let ids: Vec<&str> = registry.list().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_upsert_replaces_in_place() {
    let mut registry = registry_with(&["a", "b", "c"]);

    let mut replacement = Session::new(encoder("b"));
    replacement.status = SessionStatus::Live;
    registry.upsert(replacement);

    assert_eq!(registry.len(), 3, "upsert of an existing id must not add a session");
    assert_eq!(registry.list()[1].id, "b");
    assert_eq!(registry.list()[1].status, SessionStatus::Live);
}

#[test]
fn test_find_and_remove() {
    let mut registry = registry_with(&["a", "b"]);

    assert!(registry.find("a").is_some());
    assert!(registry.find("missing").is_none());

    let removed = registry.remove("a").expect("a should be removed");
    assert_eq!(removed.id, "a");
    assert!(registry.find("a").is_none());
    assert!(registry.remove("a").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_set_status_on_missing_session_is_a_no_op() {
    let mut registry = registry_with(&["a"]);

    assert!(registry.set_status("a", SessionStatus::Connecting));
    assert!(!registry.set_status("gone", SessionStatus::Live));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find("a").unwrap().status, SessionStatus::Connecting);
}

#[test]
fn test_summary_of_empty_registry_is_all_zero() {
    let registry = SessionRegistry::new();
    let summary = registry.summary();

    assert_eq!(summary, StatusSummary::default());
    assert_eq!(summary.total, 0);
    assert!(summary.error_ids.is_empty());
}

#[test]
fn test_summary_counts_each_status() {
    let mut registry = registry_with(&["a", "b", "c", "d", "e"]);
    registry.set_status("a", SessionStatus::Live);
    registry.set_status("b", SessionStatus::Error);
    registry.set_status("c", SessionStatus::Connecting);
    registry.set_status("e", SessionStatus::Error);

    let summary = registry.summary();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.live, 1);
    assert_eq!(summary.connecting, 1);
    assert_eq!(summary.error, 2);
    assert_eq!(summary.stopped, 1);
    assert_eq!(summary.error_ids, vec!["b", "e"]);
    assert_eq!(summary.count(SessionStatus::Error), 2);
}

#[test]
fn test_snapshot_hides_credentials() {
    let registry = registry_with(&["a"]);
    let snapshot = StatusSnapshot::capture("test", registry.list());

    let json = serde_json::to_string(&snapshot).unwrap();

    assert!(json.contains("\"id\":\"a\""));
    assert!(json.contains("\"status\":\"stopped\""));
    assert!(!json.contains("secret"), "relay password must not be exposed");
    assert_eq!(snapshot.summary.total, 1);
}
