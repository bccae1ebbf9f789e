use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::FetchError;
use super::model::ThreadResult;
use super::normalize::normalize_thread;
use super::token::{TokenCache, TokenResponse};
use super::traits::ThreadFetcher;
use super::thread_url::{extract_thread_id, public_json_url};
use crate::config::Config;

/// Longest upstream error body carried into log lines.
const BODY_EXCERPT_CHARS: usize = 200;

/// Reddit API client using app-only OAuth, with the public JSON endpoint as
/// a fallback.
#[derive(Clone)]
pub struct RedditClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    oauth_base_url: String,
    tokens: Arc<TokenCache>,
}

impl RedditClient {
    /// Create a client with its own empty token cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_token_cache(config, Arc::new(TokenCache::new()))
    }

    /// Create a client that shares `tokens` with other clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_token_cache(
        config: &Config,
        tokens: Arc<TokenCache>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(&config.reddit_user_agent);
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            client_id: config.reddit_client_id.clone(),
            client_secret: config.reddit_client_secret.clone(),
            token_url: config.reddit_token_url.clone(),
            oauth_base_url: config.reddit_oauth_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    #[must_use]
    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    /// Return a bearer token, requesting a new one when the cached token is
    /// missing or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Token`] if the token endpoint responds with a
    /// non-success status, or [`FetchError::Http`] if the request fails.
    pub async fn get_app_token(&self) -> Result<String, FetchError> {
        if let Some(token) = self.tokens.get() {
            return Ok(token);
        }

        debug!(token_url = %self.token_url, "Requesting Reddit app token");

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("duration", "temporary")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Token {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        info!(expires_in = token.expires_in, "Obtained Reddit app token");

        self.tokens.set(token.access_token.clone(), token.expires_in);
        Ok(token.access_token)
    }

    async fn fetch_public(&self, url: &str, auth_status: u16) -> Result<ThreadResult, FetchError> {
        let public_url = public_json_url(url)?;

        let response = self
            .http
            .get(public_url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                url = %url,
                auth_status,
                public_status = status.as_u16(),
                "Both authenticated and public thread fetches failed"
            );
            return Err(FetchError::upstream(status, url));
        }

        normalize_thread(read_payload(response).await?, url)
    }
}

#[async_trait]
impl ThreadFetcher for RedditClient {
    async fn fetch_thread(&self, url: &str) -> Result<ThreadResult, FetchError> {
        let thread_id = extract_thread_id(url)?;
        let token = self.get_app_token().await?;

        let oauth_url = format!("{}/comments/{thread_id}.json", self.oauth_base_url);
        let response = self
            .http
            .get(&oauth_url)
            .query(&[("raw_json", "1")])
            .bearer_auth(&token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let thread = normalize_thread(read_payload(response).await?, url)?;
            debug!(
                thread_id = %thread_id,
                comments = thread.comments.len(),
                "Fetched thread via OAuth"
            );
            return Ok(thread);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            url = %url,
            thread_id = %thread_id,
            status = status.as_u16(),
            body = %excerpt(&body),
            "Authenticated thread fetch failed, trying public endpoint"
        );

        self.fetch_public(url, status.as_u16()).await
    }
}

/// Read a success body as JSON. A body that is not JSON is a format error,
/// not a transport one.
async fn read_payload(response: Response) -> Result<Value, FetchError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FetchError::UnexpectedFormat(format!("body: {e}")))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
