// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gazette session layer: credential possession, local validity checks,
//! single-flight renewal, and retry-once request wrappers.
//!
//! The store keeps two backends consistent (ephemeral routing-visible and
//! durable on-disk); the wrappers absorb recoverable auth failures and apply
//! a hard (clear + redirect) or soft (clear + default) policy to
//! unrecoverable ones.

pub mod backend;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod store;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use claims::{is_authenticated, is_valid};
pub use client::{ApiClient, LogNavigator, Navigator};
pub use config::SessionConfig;
pub use error::SessionError;
pub use refresh::RefreshCoordinator;
pub use store::{
    AuthChange, CredentialStore, Environment, UserProfile, ACCESS_TOKEN, REFRESH_TOKEN, USER_KEY,
};
