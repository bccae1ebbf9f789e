//! Reddit listing shapes and the normalized output model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========== Raw upstream shapes ==========

/// A `{ kind: "Listing", data: { children: [...] } }` wrapper.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<T>,
}

/// A thread response: `[post listing, comment listing]`.
pub type ThreadPayload = (Listing<PostThing>, Listing<Thing>);

#[derive(Debug, Deserialize)]
pub struct PostThing {
    pub data: RawPost,
}

/// Listing child whose payload is narrowed once its `kind` is known.
///
/// Comment listings mix `t1` comments with `more` placeholders, which carry
/// a different payload, so `data` stays untyped until then. A child with no
/// `kind` decodes with an empty one and is skipped like any other non-comment.
#[derive(Debug, Deserialize)]
pub struct Thing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    pub author: Option<String>,
    pub permalink: Option<String>,
    pub score: Option<i64>,
    pub created_utc: Option<f64>,
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub is_self: bool,
    pub selftext: Option<String>,
    pub selftext_html: Option<String>,
    pub url: Option<String>,
    pub url_overridden_by_dest: Option<String>,
    pub link_flair_text: Option<String>,
    pub media: Option<Value>,
    pub secure_media: Option<Value>,
    #[serde(default)]
    pub is_gallery: bool,
    pub gallery_data: Option<Value>,
    #[serde(default)]
    pub crosspost_parent_list: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub author: Option<String>,
    pub body: Option<String>,
    pub score: Option<i64>,
    pub created_utc: Option<f64>,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub replies: Option<Replies>,
}

/// Reddit sends `""` instead of a listing when a comment has no replies.
/// Anything other than a listing or a string is a decode error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Listing(Listing<Thing>),
    Empty(String),
}

impl Replies {
    /// Direct replies, in source order.
    pub fn into_children(self) -> Vec<Thing> {
        match self {
            Self::Listing(listing) => listing.data.children,
            Self::Empty(_) => Vec::new(),
        }
    }
}

// ========== Normalized output ==========

/// Content of a post, classified once at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostContent {
    SelfPost {
        markdown: Option<String>,
        html: Option<String>,
    },
    Link {
        url: Option<String>,
    },
    Gallery {
        url: Option<String>,
        gallery_data: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPost {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub author: Option<String>,
    pub url: String,
    pub score: i64,
    pub created_utc: Option<f64>,
    pub num_comments: i64,
    pub permalink: String,
    pub content: PostContent,
    pub flair_text: Option<String>,
    pub media: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedComment {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
    pub parent_id: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadResult {
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    pub post: NormalizedPost,
    pub comments: Vec<NormalizedComment>,
}
