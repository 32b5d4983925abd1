pub mod lyrics;
pub mod now_playing;
pub mod queue;
pub mod root;

/// Shorten `s` to `max_len` characters, ending in "..." when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let char_count: usize = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// "mm:ss"
pub fn clock(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hello", 2), "he");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(0.0), "00:00");
        assert_eq!(clock(125.9), "02:05");
        assert_eq!(clock(f64::NAN), "00:00");
    }
}
