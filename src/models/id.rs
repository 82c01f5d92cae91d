//! Identifier normalization.
//!
//! The backend is inconsistent about identifier types: depending on the
//! endpoint, ids arrive as JSON numbers or as strings. Every model field
//! that holds an id deserializes through [`string_or_number`] so the rest
//! of the client only ever sees the canonical `String` form.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

/// Deserialize an id that may arrive as either a JSON string or number
/// into its canonical string form.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Normalize an id held outside of serde (e.g. a user record built by hand).
pub fn normalize(id: &str) -> String {
    id.trim().to_string()
}
