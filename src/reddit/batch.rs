//! Bounded concurrent fetching of a batch of thread URLs.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::model::ThreadResult;
use super::traits::ThreadFetcher;

/// A URL that could not be fetched, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub url: String,
    pub error: String,
}

/// Everything produced by a batch. Each input URL lands in exactly one list.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<ThreadResult>,
    pub errors: Vec<FetchFailure>,
}

/// Fetch every URL with at most `concurrency` fetches in flight.
///
/// Workers share one queue and run on the calling task, interleaving at
/// await points. Output order follows completion order, not input order.
pub async fn fetch_all<F>(fetcher: &F, urls: Vec<String>, concurrency: usize) -> BatchOutcome
where
    F: ThreadFetcher + ?Sized,
{
    let total = urls.len();
    let worker_count = concurrency.max(1).min(total);
    let queue = Mutex::new(VecDeque::from(urls));
    let outcome = Mutex::new(BatchOutcome::default());

    debug!(total, workers = worker_count, "Starting thread batch");

    let (queue_ref, outcome_ref) = (&queue, &outcome);
    let workers = (0..worker_count).map(|_| async move {
        while let Some(url) = pop(queue_ref) {
            let fetched = fetcher.fetch_thread(&url).await;
            let mut out = outcome_ref.lock().unwrap_or_else(PoisonError::into_inner);
            match fetched {
                Ok(thread) => out.results.push(thread),
                Err(e) => {
                    warn!(url = %url, "Thread fetch failed: {e}");
                    out.errors.push(FetchFailure {
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }
    });
    join_all(workers).await;

    let outcome = outcome.into_inner().unwrap_or_else(PoisonError::into_inner);
    info!(
        total,
        fetched = outcome.results.len(),
        failed = outcome.errors.len(),
        "Thread batch complete"
    );
    outcome
}

fn pop(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::reddit::error::FetchError;
    use crate::reddit::model::{NormalizedPost, PostContent};

    /// Succeeds for URLs containing `/comments/`, tracking peak concurrency.
    #[derive(Default)]
    struct FakeFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    fn thread(url: &str) -> ThreadResult {
        ThreadResult {
            source_url: url.to_string(),
            post: NormalizedPost {
                id: "p".to_string(),
                title: "t".to_string(),
                subreddit: "s".to_string(),
                author: None,
                url: url.to_string(),
                score: 0,
                created_utc: None,
                num_comments: 0,
                permalink: "/r/s/comments/p/".to_string(),
                content: PostContent::Link { url: None },
                flair_text: None,
                media: None,
            },
            comments: Vec::new(),
        }
    }

    #[async_trait]
    impl ThreadFetcher for FakeFetcher {
        async fn fetch_thread(&self, url: &str) -> Result<ThreadResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.contains("/comments/") {
                Ok(thread(url))
            } else {
                Err(FetchError::MissingThreadId(url.to_string()))
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://www.reddit.com/r/rust/comments/id{i}/"))
            .collect()
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let fetcher = FakeFetcher::default();
        let outcome = fetch_all(&fetcher, urls(10), 4).await;

        assert_eq!(outcome.results.len(), 10);
        assert!(outcome.errors.is_empty());
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 4);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_fewer_urls_than_workers() {
        let fetcher = FakeFetcher::default();
        let outcome = fetch_all(&fetcher, urls(2), 4).await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let fetcher = FakeFetcher::default();
        let mut input = urls(3);
        input.insert(1, "https://www.reddit.com/r/rust/".to_string());
        input.push("https://www.reddit.com/user/someone".to_string());

        let outcome = fetch_all(&fetcher, input, 4).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.errors.len(), 2);
        let mut failed: Vec<&str> = outcome.errors.iter().map(|e| e.url.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(
            failed,
            [
                "https://www.reddit.com/r/rust/",
                "https://www.reddit.com/user/someone"
            ]
        );
        assert!(outcome.errors[0].error.contains("no thread id"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = FakeFetcher::default();
        let outcome = fetch_all(&fetcher, Vec::new(), 4).await;

        assert!(outcome.results.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let fetcher = FakeFetcher::default();
        let outcome = fetch_all(&fetcher, urls(3), 0).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
    }
}
