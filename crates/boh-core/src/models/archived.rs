use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::member::Chapter;
use super::nullable;
use crate::utils::contains_ignore_case;

/// A soft-deleted member from `GET /archived/members`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchivedMember {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub handle: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub chapter: Chapter,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    #[serde(default)]
    pub deletion_reason: Option<String>,
}

impl ArchivedMember {
    /// Case-insensitive substring match over handle, name, chapter and title.
    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || contains_ignore_case(&self.handle, query)
            || contains_ignore_case(&self.name, query)
            || contains_ignore_case(self.chapter.as_str(), query)
            || contains_ignore_case(&self.title, query)
    }

    /// "Handle - Name" heading line.
    pub fn heading(&self) -> String {
        format!("{} - {}", self.handle, self.name)
    }

    /// Parse `deleted_at`, which may or may not carry an offset.
    pub fn deleted_at_naive(&self) -> Option<NaiveDateTime> {
        let raw = self.deleted_at.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    /// Archive timestamp for display, e.g. "Mar 05, 2024 02:30 PM".
    pub fn archived_at_display(&self) -> String {
        match self.deleted_at_naive() {
            Some(dt) => dt.format("%b %d, %Y %I:%M %p").to_string(),
            None => self.deleted_at.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArchivedMember {
        ArchivedMember {
            id: "a1".into(),
            handle: "Wrench".into(),
            name: "Tom Jones".into(),
            chapter: Chapter::Hs,
            title: "Road Captain".into(),
            deleted_at: Some("2024-03-05T14:30:00.123456".into()),
            deleted_by: Some("admin".into()),
            deletion_reason: Some("Moved away".into()),
        }
    }

    #[test]
    fn test_search_fields() {
        let m = sample();
        assert!(m.matches_search(""));
        assert!(m.matches_search("wren"));
        assert!(m.matches_search("JONES"));
        assert!(m.matches_search("hs"));
        assert!(m.matches_search("captain"));
        assert!(!m.matches_search("moved")); // reason is not searched
    }

    #[test]
    fn test_archived_at_display() {
        let m = sample();
        assert_eq!(m.archived_at_display(), "Mar 05, 2024 02:30 PM");

        let with_offset = ArchivedMember {
            deleted_at: Some("2024-03-05T14:30:00+00:00".into()),
            ..sample()
        };
        assert_eq!(with_offset.archived_at_display(), "Mar 05, 2024 02:30 PM");

        let missing = ArchivedMember { deleted_at: None, ..sample() };
        assert_eq!(missing.archived_at_display(), "-");
    }
}
