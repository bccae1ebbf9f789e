use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::RequirePasskey;
use crate::reddit::{fetch_all, BatchOutcome};

const MISSING_URLS: &str = "Provide { urls: string[] } with at least one URL";

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reddit", post(fetch_threads))
        .route("/api/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    ok: bool,
    #[serde(flatten)]
    outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

async fn fetch_threads(
    passkey: RequirePasskey,
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Response {
    let mut response = run_fetch(&state, body).await;

    if let Some(cookie) = passkey.remember_cookie() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not set passkey cookie: {e}"),
        }
    }

    response
}

async fn run_fetch(state: &AppState, body: Result<Json<FetchRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            tracing::debug!("Rejected fetch request body: {e}");
            return error_response(StatusCode::BAD_REQUEST, MISSING_URLS);
        }
    };

    let urls: Vec<String> = request
        .urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, MISSING_URLS);
    }

    tracing::info!(count = urls.len(), "Fetching Reddit threads");

    let outcome = fetch_all(
        state.fetcher.as_ref(),
        urls,
        state.config.fetch_concurrency,
    )
    .await;

    Json(FetchResponse { ok: true, outcome }).into_response()
}

async fn health() -> &'static str {
    "OK"
}
