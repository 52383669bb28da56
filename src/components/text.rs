//! Display-width aware text helpers

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `text` to at most `max` terminal columns, ending in "..." when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return ".".repeat(max);
    }

    let budget = max - 3;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str("...");
    out
}

/// Mask a secret for display
pub fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("orders", 10), "orders");
        assert_eq!(truncate("customer_addresses", 10), "custome...");
        assert_eq!(truncate("abc", 2), "..");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character is two columns wide
        assert_eq!(truncate("顧客テーブル", 7), "顧客...");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("pw"), "••");
        assert_eq!(mask(""), "");
    }
}
