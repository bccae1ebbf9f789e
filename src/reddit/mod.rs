//! Reddit thread retrieval and normalization.

pub mod batch;
mod client;
pub mod error;
pub mod model;
mod normalize;
pub mod thread_url;
pub mod token;
mod traits;

pub use batch::{fetch_all, BatchOutcome, FetchFailure};
pub use client::RedditClient;
pub use error::FetchError;
pub use model::{NormalizedComment, NormalizedPost, PostContent, ThreadResult};
pub use normalize::normalize_thread;
pub use token::TokenCache;
pub use traits::ThreadFetcher;
