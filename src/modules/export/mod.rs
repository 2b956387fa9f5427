//! Export Module
//!
//! Writes the session's submission history to disk.
//!
//! - 'e' key triggers export
//! - History → CSV and JSON, same timestamp
//! - Files saved to <data dir>/exports/

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::{App, HistoryEntry};
use crate::config;
use crate::core::{Action, NotifyLevel};

/// Get the export directory path, creating it if needed
fn get_export_dir() -> std::io::Result<PathBuf> {
    let export_dir = config::export_dir().unwrap_or_else(|| PathBuf::from(".arcpoke").join("exports"));
    fs::create_dir_all(&export_dir)?;
    Ok(export_dir)
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// Export the submission history of the running session
pub fn export_history(app: &App) -> Action {
    if app.history.is_empty() {
        return Action::Notify("No submissions to export".to_string(), NotifyLevel::Warn);
    }

    let export_dir = match get_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return Action::Notify(
                format!("Failed to create export directory: {}", e),
                NotifyLevel::Error,
            )
        }
    };

    match write_history(&export_dir, &app.history) {
        Ok((csv_path, _, count)) => Action::Notify(
            format!(
                "Exported {} submissions to {} (+ .json)",
                count,
                csv_path.display()
            ),
            NotifyLevel::Info,
        ),
        Err(e) => Action::Notify(format!("Export failed: {}", e), NotifyLevel::Error),
    }
}

/// Write history as a CSV/JSON pair into `dir`
pub fn write_history(
    dir: &Path,
    history: &[HistoryEntry],
) -> Result<(PathBuf, PathBuf, usize), Box<dyn std::error::Error>> {
    let csv_path = dir.join(generate_filename("submissions", "csv"));
    let json_path = csv_path.with_extension("json");

    let count = csv_export::write_history(&csv_path, history)?;
    json_export::write_history(&json_path, history)?;

    Ok((csv_path, json_path, count))
}
