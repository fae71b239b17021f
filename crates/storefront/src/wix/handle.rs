//! Pre-configured API client handle.
//!
//! The `/api/client` endpoint hands this structure to the caller: the OAuth
//! client ID plus the session's token pair. The access token starts empty
//! with `expiresAt: 0`; [`super::WixApiClient`] exchanges the refresh token
//! for a real access token on first use.

use midnight_runners_core::RefreshToken;
use serde::{Deserialize, Serialize};

use super::WixError;

/// A short-lived API access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Bearer value; empty until exchanged.
    pub value: String,
    /// Expiry as a unix timestamp in seconds; 0 when not yet issued.
    pub expires_at: i64,
}

impl AccessToken {
    /// An unissued access token (`value: "", expiresAt: 0`).
    #[must_use]
    pub const fn unissued() -> Self {
        Self {
            value: String::new(),
            expires_at: 0,
        }
    }
}

/// Refresh/access token pair carried by a client handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub refresh_token: RefreshToken,
    pub access_token: AccessToken,
}

/// A ready-to-use API client handle.
///
/// Serialized as the `client` field of the `/api/client` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHandle {
    pub client_id: String,
    pub tokens: TokenPair,
}

impl ClientHandle {
    /// Construct a handle for a session credential.
    ///
    /// # Errors
    ///
    /// Returns [`WixError::Handle`] when the client ID is missing - the
    /// provider endpoint cannot mint usable handles without it.
    pub fn new(client_id: &str, refresh_token: RefreshToken) -> Result<Self, WixError> {
        if client_id.is_empty() {
            return Err(WixError::Handle("Wix client ID is missing".to_string()));
        }

        Ok(Self {
            client_id: client_id.to_string(),
            tokens: TokenPair {
                refresh_token,
                access_token: AccessToken::unissued(),
            },
        })
    }
}

/// Response envelope of the `/api/client` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvideClientResponse {
    pub client: ClientHandle,
}
