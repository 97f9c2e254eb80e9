use std::cmp::Ordering;

use chrono::NaiveDate;

/// Compare two strings ignoring case, character by character.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let a = a.chars().flat_map(char::to_lowercase);
    let b = b.chars().flat_map(char::to_lowercase);
    a.cmp(b)
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a `YYYY-MM-DD` meeting date as "Tue, Apr 2, 2024".
/// The date is a calendar date; no time zone conversion happens.
pub fn format_meeting_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    match date.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        Some(d) => d.format("%a, %b %-d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("alpha", "Beta"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Zed", "apple"), Ordering::Greater);
        assert_eq!(cmp_ignore_case("Bob", "bob"), Ordering::Equal);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_meeting_date() {
        assert_eq!(format_meeting_date("2024-04-02"), "Tue, Apr 2, 2024");
        assert_eq!(format_meeting_date("2024-12-31"), "Tue, Dec 31, 2024");
        assert_eq!(format_meeting_date(""), "");
        assert_eq!(format_meeting_date("TBD"), "TBD");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"Ace\" & 'Co'</b>"), "&lt;b&gt;&quot;Ace&quot; &amp; &#39;Co&#39;&lt;/b&gt;");
    }
}
