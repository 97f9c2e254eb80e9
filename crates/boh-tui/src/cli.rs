//! Command line interface. With no subcommand the TUI starts.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use boh_core::models::ChapterFilter;
use boh_core::reports::{export, DuesPreview, QuarterSelector, ReportFilter, ReportKind, ReportQuery, StatusStyle};
use boh_core::{ApiClient, ClubBackend, Config, Session};

use crate::printing::{self, DEFAULT_PRINT_COMMAND};

#[derive(Debug, Parser)]
#[command(name = "boh", version, about = "Member desk for Brothers of the Highway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and save the session
    Login,
    /// Forget the saved session
    Logout,
    /// Open the invitation form for a token from an invite link
    AcceptInvite { token: String },
    /// Download a quarterly report CSV
    Report {
        /// attendance, dues or prospects
        kind: ReportKind,
        #[command(flatten)]
        filter: FilterArgs,
        /// Directory to save into (defaults to the export directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the dues preview table
    Preview {
        #[command(flatten)]
        filter: FilterArgs,
        /// Also save the print document and send it to the printer
        #[arg(long)]
        print: bool,
    },
    /// Download the archived members CSV
    ExportArchived {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Ask the assistant a single question
    Chat { message: String },
}

/// Report filter flags. Missing values default to today's year and quarter.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub year: Option<i32>,
    /// 1-4 or "all"
    #[arg(long)]
    pub quarter: Option<QuarterSelector>,
    /// National, AD, HA, HS or "all"
    #[arg(long)]
    pub chapter: Option<ChapterFilter>,
}

impl FilterArgs {
    pub fn to_filter(&self, today: NaiveDate) -> ReportFilter {
        let mut filter = ReportFilter::for_date(today);
        if let Some(year) = self.year {
            filter.year = year;
        }
        if let Some(quarter) = self.quarter {
            filter.quarter = quarter;
        }
        if let Some(ref chapter) = self.chapter {
            filter.chapter = chapter.clone();
        }
        filter
    }
}

/// Config, saved session and an authorized backend for one command.
struct CommandContext {
    config: Config,
    session: Session,
    backend: Arc<dyn ClubBackend>,
}

impl CommandContext {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let mut session = Session::new(config.cache_dir()?);
        session.load()?;
        let api = ApiClient::new(&config.api_base())?;
        let backend = api.authorized(session.token());
        Ok(Self { config, session, backend })
    }

    /// Fail early when no session is saved.
    fn require_session(self) -> Result<Self> {
        if !self.session.is_valid() {
            anyhow::bail!("Not logged in. Run `boh login` first.");
        }
        Ok(self)
    }
}

pub async fn logout() -> Result<()> {
    let ctx = CommandContext::load()?;
    let mut session = ctx.session;
    if let Some(name) = session.username() {
        info!(username = name, "Logging out");
    }
    session.clear()?;
    println!("Logged out.");
    Ok(())
}

pub async fn report(kind: ReportKind, filter: &FilterArgs, out: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load()?.require_session()?;
    let query = ReportQuery::new(kind, filter.to_filter(Local::now().date_naive()));
    let dir = out.unwrap_or_else(|| ctx.config.export_dir());
    debug!(?query, "Downloading report");

    let path = export::download_report(ctx.backend.as_ref(), &query, dir)
        .await
        .with_context(|| format!("Failed to download {} report", kind.title()))?;
    println!("{} ({})", kind.success_message(), path.display());
    Ok(())
}

pub async fn preview(filter: &FilterArgs, print: bool) -> Result<()> {
    let ctx = CommandContext::load()?.require_session()?;
    let filter = filter.to_filter(Local::now().date_naive());
    let members = ctx.backend.list_members().await.context("Failed to load members")?;
    let preview = DuesPreview::build(&members, &filter);

    print!("{}", preview_table(&preview));

    if print {
        let outcome = printing::print_document(
            ctx.config.export_dir(),
            preview.print_filename(),
            preview.to_print_html(),
            Some(DEFAULT_PRINT_COMMAND.to_string()),
        )
        .await?;
        if outcome.spooled {
            println!("Sent to printer ({})", outcome.path.display());
        } else {
            println!("No print spooler available. Saved {}", outcome.path.display());
        }
    }
    Ok(())
}

pub async fn export_archived(out: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load()?.require_session()?;
    let dir = out.unwrap_or_else(|| ctx.config.export_dir());
    let path = export::download_archived(ctx.backend.as_ref(), Utc::now().date_naive(), dir)
        .await
        .context("Failed to export CSV")?;
    println!("CSV exported successfully ({})", path.display());
    Ok(())
}

pub async fn chat(message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("Message is empty");
    }
    let ctx = CommandContext::load()?.require_session()?;
    let reply = ctx.backend.send_chat(message).await.context("Chat request failed")?;
    println!("{}", reply);
    Ok(())
}

/// Plain-text rendering of the dues preview.
fn preview_table(preview: &DuesPreview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", preview.title());
    if preview.is_empty() {
        let _ = writeln!(out, "No members found for this filter");
        return out;
    }

    let width = preview.rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0).max(6);
    let _ = write!(out, "{:<width$}  {:<8}", "Member", "Chapter", width = width);
    for month in preview.month_headers() {
        let _ = write!(out, " {:^4}", month);
    }
    out.push('\n');

    for row in &preview.rows {
        let _ = write!(out, "{:<width$}  {:<8}", row.label, row.chapter.to_string(), width = width);
        for status in &row.cells {
            let _ = write!(out, " {:^4}", StatusStyle::of(*status).glyph);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{}", preview.footer());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use boh_core::models::{Chapter, Member};

    #[test]
    fn test_parse_report_command() {
        let cli = Cli::try_parse_from([
            "boh", "report", "dues", "--year", "2024", "--quarter", "2", "--chapter", "HA",
        ])
        .expect("valid arguments");
        match cli.command {
            Some(Command::Report { kind, filter, out }) => {
                assert_eq!(kind, ReportKind::Dues);
                let today = NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date");
                let filter = filter.to_filter(today);
                assert_eq!(filter.year, 2024);
                assert_eq!(filter.quarter, QuarterSelector::Q2);
                assert_eq!(filter.chapter, ChapterFilter::Only(Chapter::from("HA")));
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_report_kind_rejected() {
        assert!(Cli::try_parse_from(["boh", "report", "payroll"]).is_err());
    }

    #[test]
    fn test_filter_defaults_to_today() {
        let args = FilterArgs { year: None, quarter: None, chapter: None };
        let today = NaiveDate::from_ymd_opt(2025, 11, 2).expect("valid date");
        let filter = args.to_filter(today);
        assert_eq!(filter.year, 2025);
        assert_eq!(filter.quarter, QuarterSelector::Q4);
        assert_eq!(filter.chapter, ChapterFilter::All);
    }

    #[test]
    fn test_no_subcommand_starts_tui() {
        let cli = Cli::try_parse_from(["boh"]).expect("valid arguments");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_preview_table_rows() {
        let member = Member {
            id: "1".into(),
            handle: "Ghost".into(),
            chapter: Chapter::from("National"),
            ..Default::default()
        };
        let filter = ReportFilter {
            year: 2024,
            quarter: QuarterSelector::Q2,
            chapter: ChapterFilter::All,
        };
        let table = preview_table(&DuesPreview::build(&[member], &filter));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Dues Report - Q2 (Apr-Jun) 2024");
        assert!(lines[1].contains("Apr") && lines[1].contains("Jun"));
        assert!(lines[2].starts_with("Ghost"));
        assert_eq!(lines[2].matches('✗').count(), 3);
        assert_eq!(lines[3], "1 members");
    }
}
