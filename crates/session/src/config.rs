// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// Configuration for the gazette session layer.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionConfig {
    /// Base URL of the gazette API.
    #[arg(long, default_value = "http://127.0.0.1:8000/api", env = "GAZETTE_API_BASE")]
    pub api_base: String,

    /// Path (under the API base) that mints an access/refresh pair.
    #[arg(long, default_value = "/token/", env = "GAZETTE_LOGIN_PATH")]
    pub login_path: String,

    /// Path that exchanges a refresh credential for a new access credential.
    #[arg(long, default_value = "/token/refresh/", env = "GAZETTE_REFRESH_PATH")]
    pub refresh_path: String,

    /// Path serving the logged-in user's profile.
    #[arg(long, default_value = "/users/me/", env = "GAZETTE_PROFILE_PATH")]
    pub profile_path: String,

    /// Wall-clock cap on a stored access credential, in seconds (7 days).
    /// The credential's embedded expiry claim is the practical bound.
    #[arg(long, default_value_t = 7 * 24 * 3600, env = "GAZETTE_ACCESS_TTL_SECS")]
    pub access_ttl_secs: u64,

    /// Lifetime of a stored refresh credential, in seconds (30 days).
    #[arg(long, default_value_t = 30 * 24 * 3600, env = "GAZETTE_REFRESH_TTL_SECS")]
    pub refresh_ttl_secs: u64,

    /// Directory for the durable credential file. Defaults to the XDG state dir.
    #[arg(long, env = "GAZETTE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Path the hard-fail wrapper navigates to on unrecoverable auth failure.
    #[arg(long, default_value = "/login", env = "GAZETTE_LOGIN_REDIRECT")]
    pub login_redirect: String,
}

impl SessionConfig {
    pub fn access_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_ttl_secs)
    }

    /// Whether the API is reached over a secure transport. Stored credentials
    /// carry this flag, mirroring cookie `Secure` semantics.
    pub fn secure_transport(&self) -> bool {
        self.api_base.starts_with("https://")
    }

    /// Resolve the durable store directory.
    ///
    /// Checks the configured path, then `$XDG_STATE_HOME/gazette/session`,
    /// then `$HOME/.local/state/gazette/session`.
    pub fn state_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.state_dir {
            return dir.clone();
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(xdg).join("gazette/session");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local/state/gazette/session");
        }
        PathBuf::from(".gazette/session")
    }
}
