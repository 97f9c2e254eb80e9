use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dues::{DuesMonth, DuesStatus};
use super::nullable;

/// Club chapter. Unknown chapter strings are preserved as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Chapter {
    National,
    Ad,
    Ha,
    Hs,
    #[default]
    Unassigned,
    Other(String),
}

impl Chapter {
    /// Known chapters in report order.
    pub const KNOWN: [Chapter; 4] = [Chapter::National, Chapter::Ad, Chapter::Ha, Chapter::Hs];

    /// Sort precedence used by every report. Unknown chapters sort last.
    pub fn precedence(&self) -> u8 {
        match self {
            Chapter::National => 0,
            Chapter::Ad => 1,
            Chapter::Ha => 2,
            Chapter::Hs => 3,
            Chapter::Unassigned | Chapter::Other(_) => 99,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Chapter::National => "National",
            Chapter::Ad => "AD",
            Chapter::Ha => "HA",
            Chapter::Hs => "HS",
            Chapter::Unassigned => "",
            Chapter::Other(s) => s,
        }
    }
}

impl From<String> for Chapter {
    fn from(s: String) -> Self {
        match s.as_str() {
            "National" => Chapter::National,
            "AD" => Chapter::Ad,
            "HA" => Chapter::Ha,
            "HS" => Chapter::Hs,
            "" => Chapter::Unassigned,
            _ => Chapter::Other(s),
        }
    }
}

impl From<&str> for Chapter {
    fn from(s: &str) -> Self {
        Chapter::from(s.to_string())
    }
}

impl From<Chapter> for String {
    fn from(chapter: Chapter) -> Self {
        chapter.as_str().to_string()
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chapter selector for reports: everything, or one exact chapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChapterFilter {
    #[default]
    All,
    Only(Chapter),
}

impl ChapterFilter {
    /// Selector values offered in the report filters, in display order.
    pub fn choices() -> Vec<ChapterFilter> {
        std::iter::once(ChapterFilter::All)
            .chain(Chapter::KNOWN.iter().cloned().map(ChapterFilter::Only))
            .collect()
    }

    pub fn matches(&self, chapter: &Chapter) -> bool {
        match self {
            ChapterFilter::All => true,
            ChapterFilter::Only(wanted) => wanted == chapter,
        }
    }

    /// Value sent as the `chapter` query parameter.
    pub fn query_value(&self) -> &str {
        match self {
            ChapterFilter::All => "All",
            ChapterFilter::Only(chapter) => chapter.as_str(),
        }
    }

    /// Label for selectors ("All Chapters" / chapter name).
    pub fn label(&self) -> &str {
        match self {
            ChapterFilter::All => "All Chapters",
            ChapterFilter::Only(chapter) => chapter.as_str(),
        }
    }

    pub fn chapter(&self) -> Option<&Chapter> {
        match self {
            ChapterFilter::All => None,
            ChapterFilter::Only(chapter) => Some(chapter),
        }
    }
}

impl FromStr for ChapterFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("all") {
            ChapterFilter::All
        } else {
            ChapterFilter::Only(Chapter::from(s))
        })
    }
}

impl fmt::Display for ChapterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

/// Active club member as returned by `GET /members`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
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
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Year string → month entries, January first.
    #[serde(default, deserialize_with = "nullable")]
    pub dues: BTreeMap<String, Vec<DuesMonth>>,
}

impl Member {
    /// Dues status for one month of a year. Missing years, short month lists
    /// and out-of-range indices all resolve to unpaid.
    pub fn dues_status(&self, year: &str, month_index: usize) -> DuesStatus {
        self.dues
            .get(year)
            .and_then(|months| months.get(month_index))
            .map(DuesMonth::status)
            .unwrap_or_default()
    }

    /// Row label for reports: the handle, or the name if no handle is set.
    pub fn report_label(&self) -> &str {
        if self.handle.is_empty() {
            &self.name
        } else {
            &self.handle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_round_trip_strings() {
        assert_eq!(Chapter::from("AD"), Chapter::Ad);
        assert_eq!(Chapter::from("National"), Chapter::National);
        // Match is exact, like the backend's
        assert_eq!(Chapter::from("ad"), Chapter::Other("ad".to_string()));
        assert_eq!(Chapter::from(""), Chapter::Unassigned);
        assert_eq!(String::from(Chapter::Hs), "HS");
    }

    #[test]
    fn test_chapter_precedence() {
        assert!(Chapter::National.precedence() < Chapter::Ad.precedence());
        assert!(Chapter::Ad.precedence() < Chapter::Ha.precedence());
        assert!(Chapter::Ha.precedence() < Chapter::Hs.precedence());
        assert_eq!(Chapter::Other("Nomads".into()).precedence(), 99);
        assert_eq!(Chapter::Unassigned.precedence(), 99);
    }

    #[test]
    fn test_chapter_filter() {
        let all: ChapterFilter = "All".parse().unwrap();
        assert!(all.matches(&Chapter::Hs));
        assert_eq!(all.query_value(), "All");

        let ha: ChapterFilter = "HA".parse().unwrap();
        assert!(ha.matches(&Chapter::Ha));
        assert!(!ha.matches(&Chapter::Hs));
        assert_eq!(ha.query_value(), "HA");

        assert_eq!(ChapterFilter::choices().len(), 5);
    }

    #[test]
    fn test_parse_member_with_nulls() {
        let json = r#"{"id":"m1","handle":null,"name":"Jim Beam","chapter":"HA","title":null,
            "dues":{"2024":[true,{"status":"late"},null]}}"#;
        let member: Member = serde_json::from_str(json).expect("Failed to parse member test JSON");
        assert_eq!(member.handle, "");
        assert_eq!(member.report_label(), "Jim Beam");
        assert_eq!(member.chapter, Chapter::Ha);
        assert_eq!(member.dues_status("2024", 0), DuesStatus::Paid);
        assert_eq!(member.dues_status("2024", 1), DuesStatus::Late);
        assert_eq!(member.dues_status("2024", 2), DuesStatus::Unpaid);
        assert_eq!(member.dues_status("2024", 11), DuesStatus::Unpaid);
        assert_eq!(member.dues_status("2023", 0), DuesStatus::Unpaid);
    }

    #[test]
    fn test_member_without_dues() {
        let member: Member =
            serde_json::from_str(r#"{"id":"m2","handle":"Tank","chapter":"AD","dues":null}"#).unwrap();
        assert!(member.dues.is_empty());
        assert_eq!(member.dues_status("2024", 5), DuesStatus::Unpaid);
    }
}
