use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::member::Chapter;
use super::nullable;

/// Club meeting. `date` is a `YYYY-MM-DD` calendar date with no time zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Meeting {
    /// Parse the meeting date as a local calendar date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.get(..10)?, "%Y-%m-%d").ok()
    }

    pub fn year(&self) -> Option<i32> {
        self.calendar_date().map(|d| d.year())
    }

    /// Zero-based month index (0 = January).
    pub fn month_index(&self) -> Option<usize> {
        self.calendar_date().map(|d| d.month0() as usize)
    }

    /// Date for display, e.g. "Tue, Apr 2, 2024".
    pub fn formatted_date(&self) -> String {
        crate::utils::format_meeting_date(&self.date)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Meeting")
    }
}

/// Body for `POST /meetings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMeeting {
    pub date: String,
    pub name: String,
}

/// Response of `GET /admin/available-years`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableYears {
    #[serde(default, deserialize_with = "nullable")]
    pub years: Vec<String>,
}

/// Tri-state attendance. Wire codes: 0 absent, 1 present, 2 excused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum AttendanceStatus {
    #[default]
    Absent = 0,
    Present = 1,
    Excused = 2,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Excused,
        AttendanceStatus::Absent,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "✓",
            AttendanceStatus::Excused => "⏳",
            AttendanceStatus::Absent => "✗",
        }
    }

    /// Next state when cycling with a single key.
    pub fn cycle(&self) -> Self {
        match self {
            AttendanceStatus::Absent => AttendanceStatus::Present,
            AttendanceStatus::Present => AttendanceStatus::Excused,
            AttendanceStatus::Excused => AttendanceStatus::Absent,
        }
    }
}

impl From<u8> for AttendanceStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => AttendanceStatus::Present,
            2 => AttendanceStatus::Excused,
            _ => AttendanceStatus::Absent,
        }
    }
}

impl From<AttendanceStatus> for u8 {
    fn from(status: AttendanceStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Absent => write!(f, "Absent"),
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Excused => write!(f, "Excused"),
        }
    }
}

/// One member's attendance at a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub handle: String,
    #[serde(default, deserialize_with = "nullable")]
    pub chapter: Chapter,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: AttendanceStatus,
}

/// Response of `GET /meetings/{id}/attendance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingAttendance {
    #[serde(default, deserialize_with = "nullable")]
    pub attendance: Vec<AttendanceRecord>,
}
