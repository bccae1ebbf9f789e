//! Shared constants used across the application.

use std::time::Duration;

/// Default user agent for Reddit requests.
///
/// Reddit's API rules ask for a unique, descriptive user agent; override it with
/// `REDDIT_USER_AGENT` to include a contact address.
pub const DEFAULT_USER_AGENT: &str = "RedditThreadFetcher/1.0";

/// App-only OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Base URL of the authenticated API.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://oauth.reddit.com";

/// Host used to build canonical post URLs from permalinks.
pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

/// Maximum number of threads fetched concurrently per batch.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Subtracted from the declared token lifetime when recording its expiry.
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// A cached token is only reused while it expires further out than this.
pub const TOKEN_REUSE_WINDOW: Duration = Duration::from_secs(10);
