//! Token/Client Provider endpoint.
//!
//! `GET /api/client` reads or mints the session's `refreshToken` cookie,
//! wraps the credential into a pre-configured API client handle, and hands
//! that handle to the caller as JSON. The cookie is the only persistence:
//! `HttpOnly`, path `/`, `Secure` when the storefront is served over HTTPS,
//! value a URL-encoded JSON `{value, role}` pair.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rand::RngCore;
use serde::Serialize;
use tracing::{debug, error, instrument};

use midnight_runners_core::{RefreshToken, TokenRole};

use crate::state::AppState;
use crate::wix::handle::{ClientHandle, ProvideClientResponse};

/// Name of the session credential cookie.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Error body of the `/api/client` endpoint.
#[derive(Debug, Serialize)]
struct ProvideClientError {
    error: &'static str,
    details: String,
}

/// Hand a pre-configured client handle to the caller.
///
/// Mints a new session credential when the request carries none; the
/// `Set-Cookie` header is emitted only in that case.
#[instrument(skip(state, headers))]
pub async fn provide_client(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, minted) = match refresh_token_from_headers(&headers) {
        Some(token) => (token, false),
        None => {
            debug!("minting new session refresh token");
            (
                RefreshToken::new(generate_token_value(), TokenRole::User),
                true,
            )
        }
    };

    let handle = match ClientHandle::new(&state.config().wix.client_id, token.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "failed to construct client handle");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProvideClientError {
                    error: "Internal Server Error",
                    details: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut response = Json(ProvideClientResponse { client: handle }).into_response();
    if minted {
        match cookie_header(&token, state.config().is_secure()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                error!(error = %e, "failed to encode refresh token cookie");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ProvideClientError {
                        error: "Internal Server Error",
                        details: e.to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    response
}

/// Extract the session credential from the request's cookies.
///
/// An unparseable cookie is treated the same as an absent one - the caller
/// gets a fresh credential.
fn refresh_token_from_headers(headers: &HeaderMap) -> Option<RefreshToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == REFRESH_TOKEN_COOKIE)
        .find_map(|(_, raw)| {
            let decoded = urlencoding::decode(raw).ok()?;
            serde_json::from_str(&decoded).ok()
        })
}

/// Generate a fresh opaque bearer value: 32 random bytes, hex-encoded.
fn generate_token_value() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Build the `Set-Cookie` header for a freshly minted credential.
fn cookie_header(token: &RefreshToken, secure: bool) -> Result<HeaderValue, serde_json::Error> {
    let encoded = urlencoding::encode(&serde_json::to_string(token)?).into_owned();
    let cookie = format!(
        "{REFRESH_TOKEN_COOKIE}={encoded}; Path=/; HttpOnly{}",
        if secure { "; Secure" } else { "" }
    );
    Ok(HeaderValue::from_str(&cookie).expect("cookie value is URL-encoded ASCII"))
}
