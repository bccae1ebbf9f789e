use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while fetching and normalizing a single thread.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("no thread id found in {0} (expected /comments/<id>/)")]
    MissingThreadId(String),
    #[error("Token fetch failed {status}: {body}")]
    Token { status: u16, body: String },
    #[error("Fetch failed ({status}) for {url}")]
    Upstream { status: u16, url: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected Reddit JSON format: {0}")]
    UnexpectedFormat(String),
}

impl FetchError {
    pub(crate) fn upstream(status: StatusCode, url: &str) -> Self {
        Self::Upstream {
            status: status.as_u16(),
            url: url.to_string(),
        }
    }
}
