// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight token renewal.
//!
//! Many in-flight requests can discover an expired access credential at the
//! same time. A refresh protocol that rotates the refresh credential on use
//! would make N−1 of N concurrent renewal attempts fail spuriously, so all
//! concurrent callers must collapse onto one network exchange and share its
//! outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::SessionConfig;
use crate::store::{CredentialStore, ACCESS_TOKEN, REFRESH_TOKEN};

/// Success body of the refresh exchange. The new refresh credential is
/// optional; when absent, the old one remains in force.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Exchanges the stored refresh credential for a new access credential,
/// collapsing concurrent callers into one in-flight exchange.
pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    http: reqwest::Client,
    refresh_url: String,
    /// Bumped once per settled exchange. A caller that observes a bump while
    /// waiting knows another flight already settled on its behalf.
    generation: AtomicU64,
    /// Guards the exchange; holds the most recent settled outcome.
    flight: Mutex<Option<String>>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<CredentialStore>, http: reqwest::Client, config: &SessionConfig) -> Self {
        Self {
            store,
            http,
            refresh_url: format!("{}{}", config.api_base, config.refresh_path),
            generation: AtomicU64::new(0),
            flight: Mutex::new(None),
        }
    }

    /// Renew the access credential. Returns the new credential, or `None` on
    /// any failure (missing refresh credential, transport failure, server
    /// rejection). Failure performs no store mutation — the caller's policy
    /// decides what to clear.
    ///
    /// Single-flight: callers that arrive while an exchange is outstanding
    /// block on the guard and, once it settles, receive that exchange's
    /// outcome instead of issuing their own. The guard clears as soon as the
    /// exchange settles, so a later caller gets a fresh attempt.
    pub async fn refresh(&self) -> Option<String> {
        let observed = self.generation.load(Ordering::Acquire);
        let mut last_outcome = self.flight.lock().await;
        if self.generation.load(Ordering::Acquire) != observed {
            // A flight settled while we waited on the guard; share its result.
            return last_outcome.clone();
        }

        let outcome = self.exchange().await;
        *last_outcome = outcome.clone();
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Perform one refresh exchange against the server.
    async fn exchange(&self) -> Option<String> {
        let refresh_token = self.store.get(REFRESH_TOKEN)?;

        let resp = match self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(err = %e, "token refresh transport failure");
                return None;
            }
        };

        if !resp.status().is_success() {
            // Body deliberately unparsed: expired and invalid refresh
            // credentials are equally fatal for this session.
            tracing::debug!(status = %resp.status(), "token refresh rejected");
            return None;
        }

        let token: RefreshResponse = match resp.json().await {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(err = %e, "token refresh body decode failure");
                return None;
            }
        };

        self.store.set(ACCESS_TOKEN, &token.access);
        if let Some(ref rt) = token.refresh {
            self.store.set(REFRESH_TOKEN, rt);
        }
        tracing::debug!("access credential renewed");
        Some(token.access)
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
