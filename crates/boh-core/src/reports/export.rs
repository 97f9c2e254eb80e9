//! CSV report downloads.
//!
//! The backend generates the CSV; the client only builds the query, picks
//! the filename and writes the returned bytes unmodified. Files are written
//! through a temp file in the target directory and renamed into place, so
//! a failed download or write never leaves a partial file behind.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::api::ClubBackend;

use super::ReportFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Attendance,
    Dues,
    /// Prospect attendance. Not chapter scoped.
    Prospects,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Attendance, ReportKind::Dues, ReportKind::Prospects];

    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::Attendance => "/reports/attendance/quarterly",
            ReportKind::Dues => "/reports/dues/quarterly",
            ReportKind::Prospects => "/reports/prospects/attendance/quarterly",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::Attendance => "attendance",
            ReportKind::Dues => "dues",
            ReportKind::Prospects => "prospects_attendance",
        }
    }

    pub fn uses_chapter(&self) -> bool {
        !matches!(self, ReportKind::Prospects)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Attendance => "Member Attendance",
            ReportKind::Dues => "Member Dues",
            ReportKind::Prospects => "Prospect Attendance",
        }
    }

    /// Notification shown after a successful download.
    pub fn success_message(&self) -> &'static str {
        match self {
            ReportKind::Attendance => "Attendance report downloaded",
            ReportKind::Dues => "Dues report downloaded",
            ReportKind::Prospects => "Prospects report downloaded",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attendance" => Ok(ReportKind::Attendance),
            "dues" => Ok(ReportKind::Dues),
            "prospects" | "prospect-attendance" => Ok(ReportKind::Prospects),
            other => Err(format!("unknown report '{}'", other)),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One CSV download: a report kind plus the filter it is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub filter: ReportFilter,
}

impl ReportQuery {
    pub fn new(kind: ReportKind, filter: ReportFilter) -> Self {
        Self { kind, filter }
    }

    pub fn path(&self) -> &'static str {
        self.kind.path()
    }

    /// Query parameters, in request order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("year", self.filter.year_key()),
            ("quarter", self.filter.quarter.query_value()),
        ];
        if self.kind.uses_chapter() {
            params.push(("chapter", self.filter.chapter.query_value().to_string()));
        }
        params
    }

    /// `dues_Q2_2024_HA.csv`, `attendance_2024.csv`, `prospects_attendance_Q1_2024.csv`
    pub fn filename(&self) -> String {
        let mut name = self.kind.file_stem().to_string();
        if let Some(q) = self.filter.quarter.filename_part() {
            name.push('_');
            name.push_str(&q);
        }
        name.push('_');
        name.push_str(&self.filter.year_key());
        if self.kind.uses_chapter() {
            if let Some(chapter) = self.filter.chapter.chapter() {
                name.push('_');
                name.push_str(chapter.as_str());
            }
        }
        name.push_str(".csv");
        name
    }
}

/// `archived_members_2024-06-01.csv`
pub fn archived_export_filename(date: NaiveDate) -> String {
    format!("archived_members_{}.csv", date.format("%Y-%m-%d"))
}

/// Write `bytes` to `dir/filename` atomically and return the final path.
pub fn save_export(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let target = dir.join(filename);

    let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temp file for export")?;
    tmp.write_all(bytes).context("Failed to write export")?;
    tmp.as_file().sync_all().context("Failed to flush export")?;
    tmp.persist(&target)
        .with_context(|| format!("Failed to move export into {}", target.display()))?;

    debug!(path = %target.display(), bytes = bytes.len(), "Export written");
    Ok(target)
}

/// [`save_export`] on the blocking pool.
pub async fn save_export_async(dir: PathBuf, filename: String, bytes: Vec<u8>) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || save_export(&dir, &filename, &bytes))
        .await
        .context("Export writer task failed")?
}

/// Fetch a report CSV and save it under `dir`.
pub async fn download_report(
    backend: &dyn ClubBackend,
    query: &ReportQuery,
    dir: PathBuf,
) -> Result<PathBuf> {
    let bytes = backend.download_report(query).await?;
    let path = save_export_async(dir, query.filename(), bytes).await?;
    info!(kind = ?query.kind, path = %path.display(), "Report downloaded");
    Ok(path)
}

/// Fetch the archived members CSV and save it under `dir`.
pub async fn download_archived(backend: &dyn ClubBackend, today: NaiveDate, dir: PathBuf) -> Result<PathBuf> {
    let bytes = backend.export_archived_csv().await?;
    let path = save_export_async(dir, archived_export_filename(today), bytes).await?;
    info!(path = %path.display(), "Archived members exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, ChapterFilter};
    use crate::reports::QuarterSelector;

    fn filter(quarter: QuarterSelector, chapter: ChapterFilter) -> ReportFilter {
        ReportFilter { year: 2024, quarter, chapter }
    }

    #[test]
    fn test_filenames() {
        let q2_ha = filter(QuarterSelector::Q2, ChapterFilter::Only(Chapter::Ha));
        assert_eq!(ReportQuery::new(ReportKind::Dues, q2_ha.clone()).filename(), "dues_Q2_2024_HA.csv");
        assert_eq!(
            ReportQuery::new(ReportKind::Attendance, q2_ha.clone()).filename(),
            "attendance_Q2_2024_HA.csv"
        );
        // Prospect reports ignore the chapter
        assert_eq!(
            ReportQuery::new(ReportKind::Prospects, q2_ha).filename(),
            "prospects_attendance_Q2_2024.csv"
        );

        let year_all = filter(QuarterSelector::All, ChapterFilter::All);
        assert_eq!(ReportQuery::new(ReportKind::Attendance, year_all.clone()).filename(), "attendance_2024.csv");
        assert_eq!(
            ReportQuery::new(ReportKind::Prospects, year_all).filename(),
            "prospects_attendance_2024.csv"
        );
    }

    #[test]
    fn test_params() {
        let q = ReportQuery::new(ReportKind::Dues, filter(QuarterSelector::Q3, ChapterFilter::All));
        assert_eq!(q.path(), "/reports/dues/quarterly");
        assert_eq!(
            q.params(),
            vec![("year", "2024".to_string()), ("quarter", "3".to_string()), ("chapter", "All".to_string())]
        );

        let p = ReportQuery::new(ReportKind::Prospects, filter(QuarterSelector::All, ChapterFilter::All));
        assert_eq!(p.params(), vec![("year", "2024".to_string()), ("quarter", "all".to_string())]);
    }

    #[test]
    fn test_archived_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(archived_export_filename(date), "archived_members_2024-06-01.csv");
    }

    #[test]
    fn test_save_export_writes_bytes_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"Handle,Jan\r\nAxle,\xE2\x9C\x93\r\n";
        let path = save_export(dir.path(), "dues_2024.csv", bytes).unwrap();
        assert_eq!(path, dir.path().join("dues_2024.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes.to_vec());
        // Only the final file remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_export_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        save_export(dir.path(), "a.csv", b"old").unwrap();
        let path = save_export(dir.path(), "a.csv", b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new".to_vec());
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!("Dues".parse::<ReportKind>(), Ok(ReportKind::Dues));
        assert_eq!("prospects".parse::<ReportKind>(), Ok(ReportKind::Prospects));
        assert!("payroll".parse::<ReportKind>().is_err());
        assert_eq!(ReportKind::Dues.success_message(), "Dues report downloaded");
    }
}
