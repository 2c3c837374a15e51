//! Export format adapters
//!
//! This module provides adapters that parse raw exports from observational coding
//! software and map them to the normalized [`EventLog`] the summarizer consumes.

mod delimited;
mod json;
mod preamble;
mod tabular;

pub use delimited::{detect_delimiter, parse_records, DelimitedTable};
pub use json::JsonEventAdapter;
pub use preamble::PreambleExportAdapter;
pub use tabular::TabularExportAdapter;

use crate::error::SummaryError;
use crate::types::EventLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column holding the behaviour label
pub const BEHAVIOR_COLUMN: &str = "Behavior";
/// Column holding START/STOP markers after normalization
pub const STATUS_COLUMN: &str = "Status";
/// Name of the status column in flat tabular exports
pub const BEHAVIOR_TYPE_COLUMN: &str = "Behavior type";
/// Column holding the event time in seconds
pub const TIME_COLUMN: &str = "Time";

/// Trait for export adapters
pub trait EventLogAdapter {
    /// Parse a raw export into a normalized event log
    fn parse(&self, raw: &str) -> Result<EventLog, SummaryError>;
}

/// Supported export layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Delimited export with a 14-row preamble before the header
    Preamble,
    /// Delimited export with the header on the first row and a `Behavior type` column
    Tabular,
    /// JSON array of already-normalized records
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Preamble => "preamble",
            ExportFormat::Tabular => "tabular",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preamble" => Ok(ExportFormat::Preamble),
            "tabular" => Ok(ExportFormat::Tabular),
            "json" => Ok(ExportFormat::Json),
            other => Err(SummaryError::ParseError(format!(
                "Unknown export format: {other}"
            ))),
        }
    }
}

/// Adapter with default settings for `format`
pub fn adapter_for(format: ExportFormat) -> Box<dyn EventLogAdapter> {
    match format {
        ExportFormat::Preamble => Box::new(PreambleExportAdapter::new()),
        ExportFormat::Tabular => Box::new(TabularExportAdapter::new()),
        ExportFormat::Json => Box::new(JsonEventAdapter),
    }
}
