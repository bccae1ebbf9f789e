use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::config::Config;

pub const PASSKEY_HEADER: &str = "x-passkey";
pub const PASSKEY_QUERY_PARAM: &str = "key";
pub const PASSKEY_COOKIE: &str = "site_passkey";

/// Lifetime of the cookie set after a correct `?key=`.
const PASSKEY_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

/// Passes when no passkey is configured or the request presents the
/// configured one. Returns 401 Unauthorized otherwise.
///
/// A correct passkey given as `?key=` is remembered: handlers attach
/// [`RequirePasskey::remember_cookie`] to their response.
#[derive(Debug, Clone, Default)]
pub struct RequirePasskey {
    remember: Option<String>,
}

impl RequirePasskey {
    /// `Set-Cookie` value persisting the query passkey, if one was used.
    #[must_use]
    pub fn remember_cookie(&self) -> Option<String> {
        self.remember.as_deref().map(|key| {
            format!(
                "{PASSKEY_COOKIE}={}; Secure; SameSite=Lax; Path=/; Max-Age={PASSKEY_COOKIE_MAX_AGE_SECS}",
                urlencoding::encode(key)
            )
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequirePasskey
where
    S: Send + Sync,
    Arc<Config>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);

        let Some(expected) = config.site_passkey.as_deref() else {
            return Ok(RequirePasskey::default());
        };

        if provided_passkey(parts).as_deref() == Some(expected) {
            let remember = (query_passkey(parts).as_deref() == Some(expected))
                .then(|| expected.to_string());
            return Ok(RequirePasskey { remember });
        }

        warn!(path = %parts.uri.path(), "Rejected request with missing or wrong passkey");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response())
    }
}

/// The passkey presented by the client, if any.
///
/// Checked in order: `x-passkey` header, `?key=` query parameter,
/// `site_passkey` cookie. The first non-empty value wins.
pub fn provided_passkey(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(PASSKEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    let from_query = || query_passkey(parts);

    let from_cookie = || {
        parts
            .headers
            .get("cookie")
            .and_then(|h| h.to_str().ok())
            .and_then(|cookies| {
                cookies.split(';').find_map(|cookie| {
                    cookie
                        .trim()
                        .strip_prefix(PASSKEY_COOKIE)
                        .and_then(|rest| rest.strip_prefix('='))
                        .map(|value| {
                            urlencoding::decode(value)
                                .map_or_else(|_| value.to_string(), |v| v.into_owned())
                        })
                })
            })
    };

    from_header
        .filter(|v| !v.is_empty())
        .or_else(|| from_query().filter(|v| !v.is_empty()))
        .or_else(|| from_cookie().filter(|v| !v.is_empty()))
}

fn query_passkey(parts: &Parts) -> Option<String> {
    parts.uri.query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == PASSKEY_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
    })
}
