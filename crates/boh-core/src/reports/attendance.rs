use crate::models::{AttendanceStatus, Meeting};

use super::window::QuarterSelector;

/// Present / excused / absent counts for one meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    pub present: usize,
    pub excused: usize,
    pub absent: usize,
}

impl FromIterator<AttendanceStatus> for AttendanceTally {
    fn from_iter<I: IntoIterator<Item = AttendanceStatus>>(statuses: I) -> Self {
        let mut tally = Self::default();
        for status in statuses {
            tally.add(status);
        }
        tally
    }
}

impl AttendanceTally {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Excused => self.excused += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.present + self.excused + self.absent
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        match status {
            AttendanceStatus::Present => self.present,
            AttendanceStatus::Excused => self.excused,
            AttendanceStatus::Absent => self.absent,
        }
    }
}

/// Meeting counts for a year, bucketed by month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingSummary {
    pub total: usize,
    pub by_month: [usize; 12],
    /// Meetings whose date could not be parsed.
    pub undated: usize,
}

impl MeetingSummary {
    pub fn from_meetings(meetings: &[Meeting]) -> Self {
        let mut summary = Self { total: meetings.len(), ..Default::default() };
        for meeting in meetings {
            match meeting.month_index() {
                Some(m) => summary.by_month[m] += 1,
                None => summary.undated += 1,
            }
        }
        summary
    }

    /// Meetings held in the months covered by `quarter`.
    pub fn in_window(&self, quarter: QuarterSelector) -> usize {
        quarter.months().into_iter().map(|m| self.by_month[m]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(id: &str, date: &str) -> Meeting {
        Meeting { id: id.to_string(), date: date.to_string(), name: None }
    }

    #[test]
    fn test_tally() {
        let tally: AttendanceTally = [
            AttendanceStatus::Present,
            AttendanceStatus::Present,
            AttendanceStatus::Excused,
            AttendanceStatus::Absent,
        ]
        .into_iter()
        .collect();
        assert_eq!(tally, AttendanceTally { present: 2, excused: 1, absent: 1 });
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.count(AttendanceStatus::Excused), 1);
    }

    #[test]
    fn test_meeting_summary() {
        let meetings = vec![
            meeting("1", "2024-01-01"),
            meeting("2", "2024-04-02"),
            meeting("3", "2024-05-07"),
            meeting("4", "someday"),
        ];
        let summary = MeetingSummary::from_meetings(&meetings);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_month[0], 1);
        assert_eq!(summary.undated, 1);
        assert_eq!(summary.in_window(QuarterSelector::Q2), 2);
        assert_eq!(summary.in_window(QuarterSelector::All), 3);
    }
}
