//! Tabular export adapter
//!
//! Parses the flat event export whose first row is the header and whose status
//! column is called `Behavior type`. The column is renamed to `Status` before the
//! rows are normalized.

use super::delimited::{detect_delimiter, DelimitedTable};
use super::{EventLogAdapter, BEHAVIOR_TYPE_COLUMN, STATUS_COLUMN};
use crate::error::SummaryError;
use crate::types::EventLog;
use tracing::debug;

/// Adapter for flat delimited exports
#[derive(Debug, Clone, Default)]
pub struct TabularExportAdapter {
    delimiter: Option<char>,
}

impl TabularExportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a delimiter instead of detecting it
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

impl EventLogAdapter for TabularExportAdapter {
    fn parse(&self, raw: &str) -> Result<EventLog, SummaryError> {
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(raw));
        let mut table = DelimitedTable::parse(raw, delimiter, 0)?;

        // Exports that already carry `Status` are accepted as-is
        if table.column(STATUS_COLUMN).is_none()
            && !table.rename_column(BEHAVIOR_TYPE_COLUMN, STATUS_COLUMN)
        {
            return Err(SummaryError::MissingColumn(BEHAVIOR_TYPE_COLUMN.to_string()));
        }

        debug!(rows = table.rows.len(), "parsed tabular export");
        table.to_event_log(STATUS_COLUMN)
    }
}
