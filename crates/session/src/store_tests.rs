// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::backend::{Backend, MemoryBackend};

fn test_config() -> SessionConfig {
    SessionConfig {
        api_base: "http://127.0.0.1:1/api".to_owned(),
        login_path: "/token/".to_owned(),
        refresh_path: "/token/refresh/".to_owned(),
        profile_path: "/users/me/".to_owned(),
        access_ttl_secs: 7 * 24 * 3600,
        refresh_ttl_secs: 30 * 24 * 3600,
        state_dir: None,
        login_redirect: "/login".to_owned(),
    }
}

/// Store plus handles on its two backends, so tests can observe each side.
fn test_store(env: Environment) -> (CredentialStore, Arc<MemoryBackend>, Arc<MemoryBackend>) {
    let session = Arc::new(MemoryBackend::new());
    let durable = Arc::new(MemoryBackend::new());
    let store = CredentialStore::new(
        env,
        Box::new(Arc::clone(&session)),
        Box::new(Arc::clone(&durable)),
        &test_config(),
    );
    (store, session, durable)
}

#[test]
fn set_writes_both_backends() {
    let (store, session, durable) = test_store(Environment::full());
    store.set(ACCESS_TOKEN, "tok-1");
    assert_eq!(session.get(ACCESS_TOKEN), Some("tok-1".to_owned()));
    assert_eq!(durable.get(ACCESS_TOKEN), Some("tok-1".to_owned()));
    assert_eq!(store.get(ACCESS_TOKEN), Some("tok-1".to_owned()));
}

#[test]
fn clear_empties_both_backends() {
    let (store, session, durable) = test_store(Environment::full());
    store.set(ACCESS_TOKEN, "tok-1");
    store.set(REFRESH_TOKEN, "rt-1");
    store.set_profile(&UserProfile {
        id: 1,
        username: "a".to_owned(),
        email: "a@example.com".to_owned(),
        is_staff: false,
    });

    store.clear();

    for key in [ACCESS_TOKEN, REFRESH_TOKEN, USER_KEY] {
        assert_eq!(session.get(key), None);
        assert_eq!(durable.get(key), None);
    }
    assert!(store.profile().is_none());
}

#[test]
fn clear_on_empty_store_does_not_fail() {
    let (store, _, _) = test_store(Environment::full());
    store.clear();
    store.clear();
}

#[test]
fn repair_on_read_copies_durable_into_session() {
    let (store, session, durable) = test_store(Environment::full());
    // Seed only the durable side, simulating a fresh process whose
    // routing-visible store is empty.
    durable.set(REFRESH_TOKEN, "rt-1", std::time::Duration::from_secs(3600), false);
    assert_eq!(session.get(REFRESH_TOKEN), None);

    assert_eq!(store.get(REFRESH_TOKEN), Some("rt-1".to_owned()));
    assert_eq!(session.get(REFRESH_TOKEN), Some("rt-1".to_owned()));
}

#[test]
fn session_store_wins_when_both_present() {
    let (store, session, durable) = test_store(Environment::full());
    session.set(ACCESS_TOKEN, "newer", std::time::Duration::from_secs(3600), false);
    durable.set(ACCESS_TOKEN, "older", std::time::Duration::from_secs(3600), false);
    assert_eq!(store.get(ACCESS_TOKEN), Some("newer".to_owned()));
}

#[test]
fn inactive_durable_store_is_ignored() {
    let (store, session, durable) =
        test_store(Environment { session_store: true, durable_store: false });
    store.set(ACCESS_TOKEN, "tok-1");
    assert_eq!(session.get(ACCESS_TOKEN), Some("tok-1".to_owned()));
    assert_eq!(durable.get(ACCESS_TOKEN), None);

    // A value somehow present in the inactive backend is never consulted.
    durable.set(REFRESH_TOKEN, "rt-1", std::time::Duration::from_secs(3600), false);
    assert_eq!(store.get(REFRESH_TOKEN), None);
}

#[test]
fn inactive_session_store_reads_straight_from_durable() {
    let (store, session, durable) =
        test_store(Environment { session_store: false, durable_store: true });
    store.set(REFRESH_TOKEN, "rt-1");
    assert_eq!(durable.get(REFRESH_TOKEN), Some("rt-1".to_owned()));
    assert_eq!(session.get(REFRESH_TOKEN), None);
    assert_eq!(store.get(REFRESH_TOKEN), Some("rt-1".to_owned()));
}

#[test]
fn set_fires_auth_change_after_mutation() {
    let (store, _, _) = test_store(Environment::full());
    let mut rx = store.subscribe();
    store.set(ACCESS_TOKEN, "tok-1");
    assert!(rx.try_recv().is_ok());
    // The mutation completed before the event fired.
    assert_eq!(store.get(ACCESS_TOKEN), Some("tok-1".to_owned()));
}

#[test]
fn clear_fires_auth_change() {
    let (store, _, _) = test_store(Environment::full());
    store.set(ACCESS_TOKEN, "tok-1");
    let mut rx = store.subscribe();
    store.clear();
    assert!(rx.try_recv().is_ok());
}

#[test]
fn every_subscriber_sees_the_signal() {
    let (store, _, _) = test_store(Environment::full());
    let mut rx1 = store.subscribe();
    let mut rx2 = store.subscribe();
    store.set(REFRESH_TOKEN, "rt-1");
    assert!(rx1.try_recv().is_ok());
    assert!(rx2.try_recv().is_ok());
}

#[test]
fn profile_roundtrip() {
    let (store, _, _) = test_store(Environment::full());
    store.set_profile(&UserProfile {
        id: 7,
        username: "editor".to_owned(),
        email: "editor@example.com".to_owned(),
        is_staff: true,
    });
    let profile = store.profile();
    assert!(matches!(profile, Some(ref p) if p.id == 7 && p.is_staff));
}
