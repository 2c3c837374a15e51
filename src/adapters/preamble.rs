//! Preamble export adapter
//!
//! Parses the observation export that starts with a block of session metadata
//! (observation id, media file, subjects, ...) before the event table. The header
//! row follows the preamble and already names the status column `Status`.

use super::delimited::{detect_delimiter, DelimitedTable};
use super::{EventLogAdapter, STATUS_COLUMN};
use crate::error::SummaryError;
use crate::types::EventLog;
use tracing::debug;

/// Number of metadata rows ahead of the header in a standard export
pub const DEFAULT_PREAMBLE_ROWS: usize = 14;

/// Adapter for delimited exports with a metadata preamble
#[derive(Debug, Clone)]
pub struct PreambleExportAdapter {
    skip_rows: usize,
    delimiter: Option<char>,
}

impl Default for PreambleExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PreambleExportAdapter {
    pub fn new() -> Self {
        Self {
            skip_rows: DEFAULT_PREAMBLE_ROWS,
            delimiter: None,
        }
    }

    /// Use a different preamble length
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Force a delimiter instead of detecting it
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

impl EventLogAdapter for PreambleExportAdapter {
    fn parse(&self, raw: &str) -> Result<EventLog, SummaryError> {
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(raw));
        let table = DelimitedTable::parse(raw, delimiter, self.skip_rows)?;
        debug!(
            skip_rows = self.skip_rows,
            rows = table.rows.len(),
            "parsed preamble export"
        );
        table.to_event_log(STATUS_COLUMN)
    }
}
