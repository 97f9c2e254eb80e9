use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

/// Month column headings, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Report period: the whole year or one calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuarterSelector {
    All,
    Q1,
    Q2,
    Q3,
    Q4,
}

impl QuarterSelector {
    /// Selector values in display order.
    pub const CHOICES: [QuarterSelector; 5] = [
        QuarterSelector::All,
        QuarterSelector::Q1,
        QuarterSelector::Q2,
        QuarterSelector::Q3,
        QuarterSelector::Q4,
    ];

    /// Build from a quarter number. Only 1..=4 are quarters.
    pub fn from_number(q: u8) -> Option<Self> {
        match q {
            1 => Some(QuarterSelector::Q1),
            2 => Some(QuarterSelector::Q2),
            3 => Some(QuarterSelector::Q3),
            4 => Some(QuarterSelector::Q4),
            _ => None,
        }
    }

    /// Quarter containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        // month0 is 0..=11, so the quotient is always 0..=3
        Self::from_number((date.month0() / 3) as u8 + 1).unwrap_or(QuarterSelector::All)
    }

    /// Quarter number, or `None` for the full year.
    pub fn number(&self) -> Option<u8> {
        match self {
            QuarterSelector::All => None,
            QuarterSelector::Q1 => Some(1),
            QuarterSelector::Q2 => Some(2),
            QuarterSelector::Q3 => Some(3),
            QuarterSelector::Q4 => Some(4),
        }
    }

    /// Zero-based month indices covered, in calendar order.
    pub fn months(&self) -> Vec<usize> {
        match self.number() {
            None => (0..12).collect(),
            Some(q) => {
                let start = 3 * (q as usize - 1);
                vec![start, start + 1, start + 2]
            }
        }
    }

    /// Value of the `quarter` query parameter.
    pub fn query_value(&self) -> String {
        match self.number() {
            None => "all".to_string(),
            Some(q) => q.to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuarterSelector::All => "Full Year",
            QuarterSelector::Q1 => "Q1 (Jan-Mar)",
            QuarterSelector::Q2 => "Q2 (Apr-Jun)",
            QuarterSelector::Q3 => "Q3 (Jul-Sep)",
            QuarterSelector::Q4 => "Q4 (Oct-Dec)",
        }
    }

    /// Filename fragment, `Q2`; `None` for the full year.
    pub fn filename_part(&self) -> Option<String> {
        self.number().map(|q| format!("Q{}", q))
    }

    pub fn next(&self) -> Self {
        let idx = Self::CHOICES.iter().position(|c| c == self).unwrap_or(0);
        Self::CHOICES[(idx + 1) % Self::CHOICES.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::CHOICES.iter().position(|c| c == self).unwrap_or(0);
        Self::CHOICES[(idx + Self::CHOICES.len() - 1) % Self::CHOICES.len()]
    }
}

impl FromStr for QuarterSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(QuarterSelector::All);
        }
        let trimmed = s.trim_start_matches(['Q', 'q']);
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| format!("invalid quarter '{}': expected all, 1, 2, 3 or 4", s))
    }
}

impl fmt::Display for QuarterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Heading for a month index; out-of-range indices render as "?".
pub fn month_name(index: usize) -> &'static str {
    MONTH_NAMES.get(index).copied().unwrap_or("?")
}
