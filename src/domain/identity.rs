//! Anonymous per-installation identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying a device installation.
///
/// Identities are created once, on first use, and never change afterwards.
/// They are the key every attempt record is bucketed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymousIdentity(String);

impl AnonymousIdentity {
    /// Wrap a raw token.
    ///
    /// Returns `None` for blank input, which is never a valid identity.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Wrap a token already known to be non-blank and trimmed.
    pub(crate) fn from_token(token: String) -> Self {
        debug_assert!(!token.trim().is_empty() && token.trim() == token);
        Self(token)
    }

    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnonymousIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AnonymousIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
