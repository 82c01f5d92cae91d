use serde::{Deserialize, Serialize};

use super::id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    #[serde(deserialize_with = "id::string_or_number")]
    pub post_id: String,
    #[serde(deserialize_with = "id::string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Like state of one post from the point of view of one user, derived from
/// two separate count queries (the backend has no dedicated status endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeStatus {
    pub like_count: u64,
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_ids_normalized() {
        let like: Like = serde_json::from_str(r#"{"post_id": 3, "user_id": "9"}"#).unwrap();
        assert_eq!(like.post_id, "3");
        assert_eq!(like.user_id, "9");
    }
}
