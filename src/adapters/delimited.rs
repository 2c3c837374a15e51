//! Delimited text reader shared by the tabular adapters
//!
//! Handles comma or tab separated exports with double-quoted fields (`""` escapes
//! a quote, quoted fields may span lines). Blank lines and a leading UTF-8 byte
//! order mark are skipped.

use super::{BEHAVIOR_COLUMN, TIME_COLUMN};
use crate::error::SummaryError;
use crate::types::{Event, EventLog, EventStatus};

/// Tab when the first non-blank line contains one, comma otherwise
pub fn detect_delimiter(raw: &str) -> char {
    let first = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Split raw text into records of fields
pub fn parse_records(raw: &str, delimiter: char) -> Result<Vec<Vec<String>>, SummaryError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
                line += 1;
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SummaryError::ParseError(format!(
            "Unterminated quoted field starting on line {quote_line}"
        )));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

/// Header row plus data rows of a delimited export
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Parse `raw`, dropping `skip_rows` records before the header
    pub fn parse(raw: &str, delimiter: char, skip_rows: usize) -> Result<Self, SummaryError> {
        let mut records = parse_records(raw, delimiter)?.into_iter().skip(skip_rows);

        let headers = records
            .next()
            .ok_or_else(|| {
                SummaryError::ParseError(format!(
                    "No header row found after skipping {skip_rows} rows"
                ))
            })?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SummaryError> {
        self.column(name)
            .ok_or_else(|| SummaryError::MissingColumn(name.to_string()))
    }

    /// Rename a header in place; returns whether it existed
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column(from) {
            Some(idx) => {
                self.headers[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Build the normalized event log, reading status from `status_column`
    pub fn to_event_log(&self, status_column: &str) -> Result<EventLog, SummaryError> {
        let behaviour_idx = self.require_column(BEHAVIOR_COLUMN)?;
        let status_idx = self.require_column(status_column)?;
        let time_idx = self.require_column(TIME_COLUMN)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| -> Result<Event, SummaryError> {
                let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
                Ok(Event {
                    behaviour: cell(behaviour_idx).to_string(),
                    status: EventStatus::from(cell(status_idx)),
                    time: parse_time(cell(time_idx), i + 1)?,
                })
            })
            .collect()
    }
}

/// Coerce a time cell to seconds
pub(crate) fn parse_time(value: &str, row: usize) -> Result<f64, SummaryError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| SummaryError::MalformedTimestamp {
            row,
            value: value.to_string(),
        })
}
