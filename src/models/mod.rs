//! Data models for backend entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `User`, `UserUpdate`, `UserStats`: account and profile data
//! - `Post`, `PostWithCounts`, `Author`: the feed
//! - `Comment`: post discussion threads
//! - `Like`, `LikeStatus`: like rows and derived per-viewer state
//!
//! All identifier fields are normalized to strings on ingestion (see `id`).

pub mod comment;
pub mod id;
pub mod like;
pub mod post;
pub mod user;

pub use comment::Comment;
pub use like::{Like, LikeStatus};
pub use post::{Author, Post, PostWithCounts};
pub use user::{User, UserStats, UserUpdate};

use serde::Deserialize;

/// List envelope used by every collection endpoint: `{items, count?, ...}`.
/// The server echoes `limit`/`offset` too, but nothing here needs them.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response shape for `?count=true` queries.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CountResponse {
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page: Page<User> = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.count.is_none());
    }

    #[test]
    fn test_count_response_defaults_to_zero() {
        let c: CountResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(c.count, 0);
    }
}
