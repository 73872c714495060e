// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Errors surfaced by the session layer.
///
/// Recoverable auth failures (expired access credential followed by a
/// successful renewal) never appear here — the request wrappers absorb them.
#[derive(Debug)]
pub enum SessionError {
    /// No usable credential remains; the session was cleared.
    Unauthenticated,
    /// The server answered with a non-success status the caller must handle.
    Status(u16),
    /// Transport-level failure from the HTTP client.
    Http(reqwest::Error),
    /// A response body failed to parse.
    Decode(serde_json::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("not authenticated"),
            Self::Status(code) => write!(f, "request failed with status {code}"),
            Self::Http(e) => write!(f, "http transport error: {e}"),
            Self::Decode(e) => write!(f, "response decode error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}
