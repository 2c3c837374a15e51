//! Result table encoding
//!
//! Encodes an accumulated [`SummaryTable`] as CSV for plotting/statistics tools,
//! or as a JSON report carrying producer metadata.

use crate::error::SummaryError;
use crate::types::{BehaviourSummary, SummaryTable, SUMMARY_COLUMNS};
use crate::{PRODUCER_NAME, SUMMARY_VERSION};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

impl SummaryTable {
    /// Render as CSV.
    ///
    /// Columns are `ID`, one column per distinct condition name (first-seen
    /// order), then `behaviour,latency,duration`. A row leaves the condition
    /// columns it does not carry empty.
    pub fn to_csv(&self) -> String {
        let conditions = self.condition_names();

        let (id, measures) = SUMMARY_COLUMNS.split_at(1);
        let mut header: Vec<&str> = id.to_vec();
        header.extend(conditions.iter().copied());
        header.extend(measures.iter().copied());

        let mut out = csv_line(header.iter().map(|h| h.to_string()));
        for row in self {
            out.push_str(&csv_line(csv_cells(row, &conditions)));
        }
        out
    }
}

fn csv_cells(row: &BehaviourSummary, conditions: &[&str]) -> Vec<String> {
    let mut cells = Vec::with_capacity(conditions.len() + 4);
    cells.push(row.id.clone());
    for name in conditions {
        if row.condition.name == *name {
            cells.push(row.condition.value.clone());
        } else {
            cells.push(String::new());
        }
    }
    cells.push(row.behaviour.clone());
    cells.push(row.latency.to_string());
    cells.push(row.duration.to_string());
    cells
}

fn csv_line<I: IntoIterator<Item = String>>(cells: I) -> String {
    let mut line = cells
        .into_iter()
        .map(|c| escape_csv(&c))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Producer metadata embedded in every report
#[derive(Debug, Clone, Serialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// JSON envelope around a result table
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub row_count: usize,
    pub rows: SummaryTable,
}

/// Encoder for JSON summary reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn encode(&self, table: &SummaryTable) -> SummaryReport {
        SummaryReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SUMMARY_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            row_count: table.len(),
            rows: table.clone(),
        }
    }

    pub fn encode_to_json(&self, table: &SummaryTable) -> Result<String, SummaryError> {
        serde_json::to_string(&self.encode(table)).map_err(SummaryError::JsonError)
    }

    pub fn encode_to_json_pretty(&self, table: &SummaryTable) -> Result<String, SummaryError> {
        serde_json::to_string_pretty(&self.encode(table)).map_err(SummaryError::JsonError)
    }
}
