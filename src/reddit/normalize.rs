//! Mapping of raw thread payloads into [`ThreadResult`].

use serde_json::Value;

use super::error::FetchError;
use super::model::{
    NormalizedComment, NormalizedPost, PostContent, RawComment, RawPost, Replies, Thing,
    ThreadPayload, ThreadResult,
};
use crate::constants::REDDIT_WEB_BASE;

const COMMENT_KIND: &str = "t1";

/// Normalize a `[post listing, comment listing]` payload.
///
/// # Errors
///
/// Returns [`FetchError::UnexpectedFormat`] if the payload is not a pair of
/// listings, the post listing is empty, or a comment cannot be decoded.
pub fn normalize_thread(payload: Value, source_url: &str) -> Result<ThreadResult, FetchError> {
    let (post_listing, comment_listing): ThreadPayload = serde_json::from_value(payload)
        .map_err(|e| FetchError::UnexpectedFormat(format!("thread: {e}")))?;

    let raw = post_listing
        .data
        .children
        .into_iter()
        .next()
        .map(|thing| thing.data)
        .ok_or_else(|| FetchError::UnexpectedFormat("missing post".to_string()))?;

    let post = normalize_post(pick_post_source(raw));
    let comments = flatten_comments(comment_listing.data.children)?;

    Ok(ThreadResult {
        source_url: source_url.to_string(),
        post,
        comments,
    })
}

/// Prefer the crosspost parent, keeping the crosspost's own permalink.
fn pick_post_source(mut raw: RawPost) -> RawPost {
    if raw.crosspost_parent_list.is_empty() {
        return raw;
    }
    let mut parent = raw.crosspost_parent_list.swap_remove(0);
    if raw.permalink.is_some() {
        parent.permalink = raw.permalink;
    }
    parent
}

fn normalize_post(d: RawPost) -> NormalizedPost {
    let permalink = d.permalink.unwrap_or_default();

    let content = if d.is_self {
        PostContent::SelfPost {
            markdown: d.selftext,
            html: d.selftext_html,
        }
    } else {
        let url = d.url_overridden_by_dest.or(d.url);
        if d.is_gallery {
            PostContent::Gallery {
                url,
                gallery_data: d.gallery_data,
            }
        } else {
            PostContent::Link { url }
        }
    };

    NormalizedPost {
        id: d.id,
        title: d.title,
        subreddit: d.subreddit,
        author: d.author,
        url: format!("{REDDIT_WEB_BASE}{permalink}"),
        score: d.score.unwrap_or(0),
        created_utc: d.created_utc,
        num_comments: d.num_comments.unwrap_or(0),
        permalink,
        content,
        flair_text: d.link_flair_text,
        media: d.secure_media.or(d.media),
    }
}

/// Flatten a comment tree with an explicit stack.
///
/// Popping from the stack visits siblings last-to-first, so the emitted
/// sequence is reversed once at the end.
fn flatten_comments(top_level: Vec<Thing>) -> Result<Vec<NormalizedComment>, FetchError> {
    let mut out = Vec::new();
    let mut stack: Vec<(Thing, usize)> = top_level.into_iter().map(|t| (t, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        if node.kind != COMMENT_KIND {
            continue;
        }

        let c: RawComment = serde_json::from_value(node.data)
            .map_err(|e| FetchError::UnexpectedFormat(format!("comment: {e}")))?;

        let replies = c.replies.map(Replies::into_children).unwrap_or_default();

        out.push(NormalizedComment {
            id: c.id,
            author: c.author,
            body: c.body.unwrap_or_default(),
            score: c.score.unwrap_or(0),
            created_utc: c.created_utc.unwrap_or(0.0),
            parent_id: c.parent_id,
            depth,
        });

        stack.extend(replies.into_iter().map(|r| (r, depth + 1)));
    }

    out.reverse();
    Ok(out)
}
