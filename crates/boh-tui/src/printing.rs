//! Hand the dues print document to the platform print spooler.
//!
//! The document is always saved to the export directory first, so there is
//! something to open by hand when no spooler is installed.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

use boh_core::reports::export::save_export_async;

/// Spooler used on Unix systems.
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOutcome {
    pub path: PathBuf,
    /// Whether the spooler accepted the job.
    pub spooled: bool,
}

/// Save `html` as `dir/filename`, then submit it with `command` if one is
/// given. A missing spooler binary is reported as `spooled: false`.
pub async fn print_document(
    dir: PathBuf,
    filename: String,
    html: String,
    command: Option<String>,
) -> Result<PrintOutcome> {
    let path = save_export_async(dir, filename, html.into_bytes()).await?;

    let Some(command) = command else {
        return Ok(PrintOutcome { path, spooled: false });
    };

    let job = path.clone();
    let spooled = tokio::task::spawn_blocking(move || submit(&command, &job))
        .await
        .context("Print spooler task failed")??;

    Ok(PrintOutcome { path, spooled })
}

fn submit(command: &str, path: &Path) -> Result<bool> {
    match Command::new(command).arg(path).output() {
        Ok(output) if output.status.success() => {
            info!(command, path = %path.display(), "Print job submitted");
            Ok(true)
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} exited with {}: {}", command, output.status, stderr.trim())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(command, "Print spooler not found, document saved only");
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to run {}", command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_without_spooler() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let outcome = print_document(
            dir.path().to_path_buf(),
            "dues_report_2024.html".into(),
            "<html></html>".into(),
            None,
        )
        .await
        .expect("print should save the document");

        assert!(!outcome.spooled);
        assert_eq!(outcome.path, dir.path().join("dues_report_2024.html"));
        let saved = std::fs::read_to_string(&outcome.path).expect("document saved");
        assert_eq!(saved, "<html></html>");
    }

    #[tokio::test]
    async fn test_missing_spooler_is_not_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let outcome = print_document(
            dir.path().to_path_buf(),
            "doc.html".into(),
            "x".into(),
            Some("boh-desk-no-such-spooler".into()),
        )
        .await
        .expect("missing spooler should not fail");
        assert!(!outcome.spooled);
        assert!(outcome.path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spooler_exit_status() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let accepted = print_document(dir.path().to_path_buf(), "a.html".into(), "a".into(), Some("true".into()))
            .await
            .expect("true always succeeds");
        assert!(accepted.spooled);

        let rejected =
            print_document(dir.path().to_path_buf(), "b.html".into(), "b".into(), Some("false".into())).await;
        assert!(rejected.is_err());
    }
}
