//! Thread URL parsing.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::error::FetchError;

static COMMENTS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/comments/([^/]+)").expect("valid regex"));

/// Extract the thread id from a `/comments/<id>/...` URL.
///
/// Only the path is inspected, so query strings and fragments never leak
/// into the id.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the URL cannot be parsed and
/// [`FetchError::MissingThreadId`] if the path has no `/comments/` segment.
pub fn extract_thread_id(url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    COMMENTS_ID
        .captures(parsed.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FetchError::MissingThreadId(url.to_string()))
}

/// Build the public `.json` URL for a thread page.
///
/// `https://www.reddit.com/r/x/comments/id/slug` becomes
/// `https://www.reddit.com/r/x/comments/id/slug/.json?raw_json=1`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the URL cannot be parsed.
pub fn public_json_url(url: &str) -> Result<Url, FetchError> {
    let mut alt = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let mut path = alt.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    if !path.ends_with(".json/") {
        path.push_str(".json");
    }
    alt.set_path(&path);

    let kept: Vec<(String, String)> = alt
        .query_pairs()
        .filter(|(key, _)| key != "raw_json")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    alt.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("raw_json", "1");

    Ok(alt)
}
