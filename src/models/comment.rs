use serde::{Deserialize, Serialize};

use super::id;
use super::post::Author;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "id::string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "id::string_or_number")]
    pub post_id: String,
    #[serde(deserialize_with = "id::string_or_number")]
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "users", skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or(&self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_ids_normalized() {
        let json = r#"{
            "id": 11,
            "post_id": "3",
            "user_id": 9,
            "content": "nice",
            "users": {"id": "9", "username": "bo"}
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, "11");
        assert_eq!(comment.post_id, "3");
        assert_eq!(comment.user_id, "9");
        assert_eq!(comment.author_name(), "bo");
    }
}
