/// Format a backend timestamp (RFC 3339) for display.
/// Falls back to the date prefix, or the raw string, when parsing fails.
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if timestamp.len() >= 10 {
        timestamp.chars().take(10).collect()
    } else {
        timestamp.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2026-01-02T03:04:05Z"),
            "Jan 02, 2026 03:04"
        );
        assert_eq!(format_timestamp("2026-01-02 03:04:05"), "2026-01-02");
        assert_eq!(format_timestamp("bogus"), "bogus");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("bio".to_string()), "-"), "bio");
        assert_eq!(format_optional(&None, "-"), "-");
    }
}
