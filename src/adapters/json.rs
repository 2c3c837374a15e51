//! JSON event adapter
//!
//! Accepts a JSON array of records that already use the normalized column names.
//! `Time` may be a number or a numeric string; `Status` may be omitted.

use super::delimited::parse_time;
use super::EventLogAdapter;
use crate::error::SummaryError;
use crate::types::{Event, EventLog, EventStatus};
use serde::Deserialize;

/// Adapter for JSON arrays of normalized records
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEventAdapter;

impl EventLogAdapter for JsonEventAdapter {
    fn parse(&self, raw: &str) -> Result<EventLog, SummaryError> {
        let records: Vec<JsonRecord> = serde_json::from_str(raw)?;

        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| -> Result<Event, SummaryError> {
                let time = match record.time {
                    JsonTime::Number(t) if t.is_finite() => t,
                    JsonTime::Number(t) => {
                        return Err(SummaryError::MalformedTimestamp {
                            row: i + 1,
                            value: t.to_string(),
                        })
                    }
                    JsonTime::Text(text) => parse_time(&text, i + 1)?,
                };
                Ok(Event {
                    behaviour: record.behavior,
                    status: EventStatus::from(record.status.unwrap_or_default()),
                    time,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(rename = "Behavior")]
    behavior: String,
    #[serde(rename = "Status", alias = "Behavior type", default)]
    status: Option<String>,
    #[serde(rename = "Time")]
    time: JsonTime,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTime {
    Number(f64),
    Text(String),
}
