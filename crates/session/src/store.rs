// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: keeps the two storage backends mutually consistent.
//!
//! Readers may consult either backend; `get` repairs divergence lazily by
//! copying a value found only in the durable store back into the
//! routing-visible store. Every mutation that changes authentication status
//! fires an [`AuthChange`] on the broadcast channel after the mutation
//! completes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::backend::Backend;
use crate::config::SessionConfig;

/// Key for the short-lived access credential.
pub const ACCESS_TOKEN: &str = "access_token";
/// Key for the longer-lived refresh credential.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Key for the cached user profile (durable store only).
pub const USER_KEY: &str = "user";

/// Which backends are available in the current environment.
///
/// Outside the full client context one of the stores may not exist (for
/// instance, server-side rendering has no durable store). An inactive backend
/// reads as absent and swallows writes.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    pub session_store: bool,
    pub durable_store: bool,
}

impl Environment {
    /// Both backends available — the ordinary client environment.
    pub fn full() -> Self {
        Self { session_store: true, durable_store: true }
    }
}

/// Fired whenever authentication status changes. Carries no payload;
/// listeners re-read the store for the new state.
#[derive(Debug, Clone, Copy)]
pub struct AuthChange;

/// Denormalized snapshot of the logged-in user, fetched once after login.
/// Advisory only — never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
}

/// The dual-backend credential store.
pub struct CredentialStore {
    env: Environment,
    session: Box<dyn Backend>,
    durable: Box<dyn Backend>,
    secure: bool,
    access_ttl: Duration,
    refresh_ttl: Duration,
    change_tx: broadcast::Sender<AuthChange>,
}

impl CredentialStore {
    pub fn new(
        env: Environment,
        session: Box<dyn Backend>,
        durable: Box<dyn Backend>,
        config: &SessionConfig,
    ) -> Self {
        let (change_tx, _) = broadcast::channel(16);
        Self {
            env,
            session,
            durable,
            secure: config.secure_transport(),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            change_tx,
        }
    }

    /// Subscribe to authentication-status changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.change_tx.subscribe()
    }

    fn ttl_for(&self, name: &str) -> Duration {
        if name == ACCESS_TOKEN {
            self.access_ttl
        } else {
            self.refresh_ttl
        }
    }

    /// Read a credential: routing-visible store first, then the durable
    /// store, repairing the former from the latter on a hit.
    pub fn get(&self, name: &str) -> Option<String> {
        if self.env.session_store {
            if let Some(value) = self.session.get(name) {
                return Some(value);
            }
        }
        if self.env.durable_store {
            if let Some(value) = self.durable.get(name) {
                if self.env.session_store {
                    self.session.set(name, &value, self.ttl_for(name), self.secure);
                }
                return Some(value);
            }
        }
        None
    }

    /// Write a credential to both backends, then fire [`AuthChange`].
    pub fn set(&self, name: &str, value: &str) {
        let ttl = self.ttl_for(name);
        if self.env.session_store {
            self.session.set(name, value, ttl, self.secure);
        }
        if self.env.durable_store {
            self.durable.set(name, value, ttl, self.secure);
        }
        let _ = self.change_tx.send(AuthChange);
    }

    /// Remove both credentials and the cached profile from both backends.
    /// Safe to call when some or all entries are already absent.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN, REFRESH_TOKEN, USER_KEY] {
            if self.env.session_store {
                self.session.remove(key);
            }
            if self.env.durable_store {
                self.durable.remove(key);
            }
        }
        tracing::debug!("credential store cleared");
        let _ = self.change_tx.send(AuthChange);
    }

    /// Cache the user profile (durable store only).
    pub fn set_profile(&self, profile: &UserProfile) {
        if !self.env.durable_store {
            return;
        }
        match serde_json::to_string(profile) {
            Ok(json) => self.durable.set(USER_KEY, &json, self.refresh_ttl, self.secure),
            Err(e) => tracing::warn!(err = %e, "failed to serialize user profile"),
        }
    }

    /// Read the cached user profile, if any.
    pub fn profile(&self) -> Option<UserProfile> {
        if !self.env.durable_store {
            return None;
        }
        let json = self.durable.get(USER_KEY)?;
        serde_json::from_str(&json).ok()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
