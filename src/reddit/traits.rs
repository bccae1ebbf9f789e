use async_trait::async_trait;

use super::error::FetchError;
use super::model::ThreadResult;

/// Anything that can turn a thread URL into a [`ThreadResult`].
#[async_trait]
pub trait ThreadFetcher: Send + Sync {
    /// Fetch and normalize the thread at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no thread id or every retrieval
    /// attempt fails.
    async fn fetch_thread(&self, url: &str) -> Result<ThreadResult, FetchError>;
}
