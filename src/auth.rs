//! Bearer credentials
//!
//! Sessions are established elsewhere; this crate only carries the token
//! it is handed and attaches it verbatim to each request.

use crate::runtime::TokenProvider;
use std::fmt;
use std::path::PathBuf;

/// Opaque session credential
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// A token fixed for the life of the process
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: BearerToken,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: BearerToken::new(token),
        }
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<BearerToken> {
        Some(self.token.clone())
    }
}

/// Reads the token from a file on every call, so an external login can
/// refresh it while the client runs.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenProvider for TokenFile {
    fn bearer_token(&self) -> Option<BearerToken> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| BearerToken::new(token))
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read token file");
                None
            }
        }
    }
}

/// No credential available; requests go out unauthenticated
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn bearer_token(&self) -> Option<BearerToken> {
        None
    }
}
