//! CSV Export
//!
//! Writes the submission history to a CSV file.

use crate::app::HistoryEntry;
use std::path::Path;

/// Write submissions to CSV file
pub fn write_history(path: &Path, history: &[HistoryEntry]) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    // Write header
    wtr.write_record([
        "submitted_at",
        "contract",
        "call",
        "phase",
        "tx_hash",
        "block_number",
        "error_kind",
        "error",
    ])?;

    // Write data rows
    for entry in history {
        let state = &entry.state;
        wtr.write_record([
            entry.submitted_at.to_rfc3339(),
            entry.contract.clone(),
            entry.call.clone(),
            state.phase().label().to_string(),
            state
                .transaction_id()
                .map(|hash| hash.to_string())
                .unwrap_or_default(),
            entry
                .block_number()
                .map(|number| number.to_string())
                .unwrap_or_default(),
            state.error().map(|err| err.kind()).unwrap_or_default().to_string(),
            state.error_message().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(history.len())
}
