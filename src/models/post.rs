use serde::{Deserialize, Serialize};

use super::id;

/// Post author as embedded in post and comment rows (the backend nests the
/// joined user row under a `users` key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(deserialize_with = "id::string_or_number")]
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "id::string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "id::string_or_number")]
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "users", skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Post {
    /// Display name for the author, falling back to the raw user id when the
    /// backend did not join the user row.
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or(&self.user_id)
    }
}

/// A post with its like/comment counts merged in.
///
/// The backend does not return counts inline; they are fetched per post and
/// attached client-side (see `crate::feed`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithCounts {
    pub post: Post,
    pub likes: u64,
    pub comments: u64,
}
