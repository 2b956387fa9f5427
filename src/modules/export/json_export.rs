//! JSON Export
//!
//! Writes the submission history to a JSON file.

use crate::app::HistoryEntry;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Exportable submission (flattens the state machine into plain fields)
#[derive(Serialize)]
struct ExportableSubmission {
    submitted_at: String,
    contract: String,
    call: String,
    phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&HistoryEntry> for ExportableSubmission {
    fn from(entry: &HistoryEntry) -> Self {
        let state = &entry.state;
        Self {
            submitted_at: entry.submitted_at.to_rfc3339(),
            contract: entry.contract.clone(),
            call: entry.call.clone(),
            phase: state.phase().label().to_string(),
            tx_hash: state.transaction_id().map(|hash| hash.to_string()),
            block_number: entry.block_number(),
            error_kind: state.error().map(|err| err.kind().to_string()),
            error: state.error_message(),
        }
    }
}

/// Write submissions to JSON file
pub fn write_history(path: &Path, history: &[HistoryEntry]) -> Result<usize, Box<dyn std::error::Error>> {
    let exportable: Vec<ExportableSubmission> =
        history.iter().map(ExportableSubmission::from).collect();

    let json = serde_json::to_string_pretty(&exportable)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(history.len())
}
