//! Append-only audit ledger and its export renderings.
//!
//! The ledger itself lives in the store (records are appended by the
//! coordinator at commit time); this module is the read side: listing and
//! rendering for operators. Past entries are never mutated.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::DrawRecord;
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to serialize records: {reason}")]
    Serialize { reason: String },
}

pub struct RecordLedger<S> {
    store: Arc<S>,
}

impl<S: Store> RecordLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All records in append order.
    pub fn records(&self) -> Result<Vec<DrawRecord>, StoreError> {
        self.store.records()
    }

    pub fn export_csv(&self) -> Result<String, StoreError> {
        Ok(render_csv(&self.store.records()?))
    }

    pub fn export_json(&self) -> Result<String, ExportError> {
        let records = self.store.records()?;
        serde_json::to_string_pretty(&records).map_err(|e| ExportError::Serialize {
            reason: e.to_string(),
        })
    }
}

/// Render records as CSV with a UTF-8 BOM so spreadsheet imports detect
/// the encoding. Every field is quoted; embedded quotes are doubled.
pub fn render_csv(records: &[DrawRecord]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str("time,participant,tier,prize,description\n");
    for record in records {
        let row = [
            format_timestamp(record.at.as_millis()),
            record.participant.as_str().to_string(),
            record.tier.as_str().to_string(),
            record.title.clone(),
            record.description.clone(),
        ];
        let quoted: Vec<String> = row.iter().map(|field| csv_quote(field)).collect();
        out.push_str(&quoted.join(","));
        out.push('\n');
    }
    out
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn format_timestamp(unix_ms: u64) -> String {
    let nanos = i128::from(unix_ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| unix_ms.to_string())
}
