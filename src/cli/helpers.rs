//! Shared helper functions for CLI commands

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a cell for Markdown tables
pub fn escape_md(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Apply a signed increment to a progress count, saturating at zero
pub fn apply_delta(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    u32::try_from(next.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a much longer part name", 10), "a much ...");
        assert_eq!(truncate_str("äöüäöüäöü", 6), "äöü...");
    }

    #[test]
    fn test_escape_md() {
        assert_eq!(escape_md("a|b"), "a\\|b");
    }

    #[test]
    fn test_apply_delta_saturates() {
        assert_eq!(apply_delta(3, 2), 5);
        assert_eq!(apply_delta(3, -5), 0);
        assert_eq!(apply_delta(u32::MAX, 1), u32::MAX);
    }
}
