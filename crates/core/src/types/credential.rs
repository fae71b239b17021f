//! Session credential types.
//!
//! The storefront identifies an anonymous browser session with an opaque
//! refresh token: a `{value, role}` pair generated once per session,
//! persisted by the browser in a cookie, and exchanged for short-lived API
//! access tokens. The value is a bearer string - it is never parsed or
//! validated beyond JSON decoding.

use serde::{Deserialize, Serialize};

/// Role attached to a session credential.
///
/// Anonymous storefront sessions always carry the `User` role; `Visitor`
/// exists for completeness of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenRole {
    /// Anonymous storefront user session.
    #[default]
    User,
    /// Unauthenticated visitor session.
    Visitor,
}

/// Opaque session refresh token.
///
/// Serialized as `{"value": "...", "role": "user"}` - the exact shape
/// stored in the `refreshToken` cookie and embedded in a client handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Opaque bearer value (hex-encoded random bytes).
    pub value: String,
    /// Session role.
    pub role: TokenRole,
}

impl RefreshToken {
    /// Create a refresh token from an already-generated bearer value.
    #[must_use]
    pub const fn new(value: String, role: TokenRole) -> Self {
        Self { value, role }
    }

    /// Whether the bearer value is empty (an unusable credential).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
