// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated request wrappers.
//!
//! Both wrappers share one mechanic: attach the access credential, send, and
//! on a 401 renew the credential once (single-flight) and retry once. They
//! differ only in what happens when no usable credential remains: the
//! hard-fail path clears the store and forces navigation to the login view;
//! the soft-fail path clears silently and yields a caller-supplied default.
//! Every other failure is the caller's problem and passes through untouched.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::refresh::RefreshCoordinator;
use crate::store::{CredentialStore, UserProfile, ACCESS_TOKEN, REFRESH_TOKEN};

/// Seam for the forced navigation on unrecoverable auth failure.
pub trait Navigator: Send + Sync {
    /// Perform a full navigation to `path`, discarding in-progress view state.
    fn navigate(&self, path: &str);
}

/// Navigator for headless use: records the intent in the log only.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "session expired, redirecting to login");
    }
}

/// Access/refresh pair minted at login.
#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Result of the shared wrapper mechanics, before failure policy applies.
enum Outcome {
    /// The server answered; auth handling is finished for this request.
    Response(reqwest::Response),
    /// No usable credential remains (absent, or renewal failed).
    NoCredential,
}

/// Authenticated HTTP client for the gazette API.
pub struct ApiClient {
    config: SessionConfig,
    http: reqwest::Client,
    store: Arc<CredentialStore>,
    refresher: RefreshCoordinator,
    navigator: Box<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: SessionConfig,
        store: Arc<CredentialStore>,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        let refresher = RefreshCoordinator::new(Arc::clone(&store), http.clone(), &config);
        Self { config, http, store, refresher, navigator }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response, SessionError> {
        let mut req = self.http.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    /// Shared mechanics: attach credential, send, renew-and-retry once on 401.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Outcome, SessionError> {
        let Some(token) = self.store.get(ACCESS_TOKEN) else {
            return Ok(Outcome::NoCredential);
        };

        let resp = self.send(method.clone(), path, body, &token).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(Outcome::Response(resp));
        }

        let Some(renewed) = self.refresher.refresh().await else {
            return Ok(Outcome::NoCredential);
        };

        // At most one renewal per logical request: whatever the retry
        // returns — even another 401 — is final.
        let retried = self.send(method, path, body, &renewed).await?;
        Ok(Outcome::Response(retried))
    }

    /// Hard-fail wrapper: for operations whose success the current view
    /// depends on. On unrecoverable auth failure, clears all credential
    /// state, forces navigation to the login view, and errors so in-flight
    /// logic does not proceed as though the request succeeded.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, SessionError> {
        match self.execute(method, path, body).await? {
            Outcome::Response(resp) => Ok(resp),
            Outcome::NoCredential => {
                self.store.clear();
                self.navigator.navigate(&self.config.login_redirect);
                Err(SessionError::Unauthenticated)
            }
        }
    }

    /// Hard-fail GET.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, SessionError> {
        self.request(Method::GET, path, None).await
    }

    /// Soft-fail wrapper: for best-effort reads. On unrecoverable auth
    /// failure, clears credential state silently and returns `default` —
    /// the current view stays intact. Non-auth failures still surface.
    pub async fn get_json_or<T: DeserializeOwned>(
        &self,
        path: &str,
        default: T,
    ) -> Result<T, SessionError> {
        match self.execute(Method::GET, path, None).await? {
            Outcome::NoCredential => {
                self.store.clear();
                tracing::debug!(path, "unauthenticated, returning default");
                Ok(default)
            }
            Outcome::Response(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    return Err(SessionError::Status(status.as_u16()));
                }
                let body = resp.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
        }
    }

    /// Log in: mint a credential pair, store it, and cache the profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, SessionError> {
        let resp = self
            .http
            .post(self.url(&self.config.login_path))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        let pair: TokenPair = serde_json::from_slice(&body)?;
        self.store.set(ACCESS_TOKEN, &pair.access);
        self.store.set(REFRESH_TOKEN, &pair.refresh);

        let profile = self.me().await?;
        self.store.set_profile(&profile);
        tracing::info!(username = %profile.username, "logged in");
        Ok(profile)
    }

    /// Fetch the logged-in user's profile through the hard-fail wrapper.
    pub async fn me(&self) -> Result<UserProfile, SessionError> {
        let resp = self.get(&self.config.profile_path).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SessionError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Log out: drop all credential state. Fires `AuthChange`.
    pub fn logout(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
