//! Core types for the behaviour summary pipeline
//!
//! This module defines the data structures that flow through each stage:
//! normalized events, the event log for one session, and the summary rows
//! accumulated into a result table.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Label of the marker event that defines time zero for a session
pub const PUP_INTRO: &str = "pup intro";

/// Label of the merged retrieval category
pub const OVERALL_RETRIEVAL: &str = "overall retrieval";

/// Retrieval sub-behaviours folded into [`OVERALL_RETRIEVAL`]
pub const RETRIEVAL_CONSTITUENTS: [&str; 2] = ["aborted retrieval", "retrieval to nest"];

/// Behaviours summarized when the caller does not supply a list
pub const DEFAULT_BEHAVIOURS: [&str; 8] = [
    "pup sniff",
    "pup groom",
    "aborted retrieval",
    "nest time",
    "retrieval to nest",
    "overall retrieval",
    "crouching",
    "nest building",
];

/// Fixed output columns; the condition column sits between `ID` and `behaviour`
pub const SUMMARY_COLUMNS: [&str; 4] = ["ID", "behaviour", "latency", "duration"];

/// Latency reported for behaviours never observed in the session (seconds)
pub const DEFAULT_LATENCY_SENTINEL: f64 = 900.0;

/// Status marker attached to a coded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    /// Onset of a state behaviour (`START`)
    Start,
    /// Offset of a state behaviour (`STOP`)
    Stop,
    /// Anything else, e.g. point events or the unmarked intro event
    Other(String),
}

impl EventStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Start => "START",
            EventStatus::Stop => "STOP",
            EventStatus::Other(s) => s,
        }
    }
}

impl From<&str> for EventStatus {
    fn from(value: &str) -> Self {
        match value {
            "START" => EventStatus::Start,
            "STOP" => EventStatus::Stop,
            other => EventStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for EventStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "START" => EventStatus::Start,
            "STOP" => EventStatus::Stop,
            _ => EventStatus::Other(value),
        }
    }
}

impl From<EventStatus> for String {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a normalized event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Behaviour label as coded
    pub behaviour: String,
    /// START / STOP / other marker
    pub status: EventStatus,
    /// Timestamp in seconds from the start of the recording
    pub time: f64,
}

impl Event {
    pub fn new(behaviour: impl Into<String>, status: impl Into<EventStatus>, time: f64) -> Self {
        Self {
            behaviour: behaviour.into(),
            status: status.into(),
            time,
        }
    }

    /// Unmarked event (no START/STOP), such as the pup intro marker
    pub fn point(behaviour: impl Into<String>, time: f64) -> Self {
        Self::new(behaviour, EventStatus::Other(String::new()), time)
    }

    pub fn start(behaviour: impl Into<String>, time: f64) -> Self {
        Self::new(behaviour, EventStatus::Start, time)
    }

    pub fn stop(behaviour: impl Into<String>, time: f64) -> Self {
        Self::new(behaviour, EventStatus::Stop, time)
    }
}

/// Ordered events for one subject/session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Time of the first event carrying `label`, if any
    pub fn first_time_of(&self, label: &str) -> Option<f64> {
        self.events
            .iter()
            .find(|e| e.behaviour == label)
            .map(|e| e.time)
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Independent-variable label attached to every row of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Column name, e.g. "time" or "treatment"
    pub name: String,
    /// Value for this subject/session
    pub value: String,
}

impl Condition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Latency and duration for one behaviour of one subject/session
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviourSummary {
    /// Subject identifier, stored verbatim
    pub id: String,
    pub condition: Condition,
    pub behaviour: String,
    /// Seconds from the reference event to the first occurrence
    pub latency: f64,
    /// Total seconds spent in the behaviour
    pub duration: f64,
}

// Rows serialize flat, with the condition name as its own key.
impl Serialize for BehaviourSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("ID", &self.id)?;
        map.serialize_entry(&self.condition.name, &self.condition.value)?;
        map.serialize_entry("behaviour", &self.behaviour)?;
        map.serialize_entry("latency", &self.latency)?;
        map.serialize_entry("duration", &self.duration)?;
        map.end()
    }
}

/// Accumulated summary rows across calls, in call order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SummaryTable {
    rows: Vec<BehaviourSummary>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[BehaviourSummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BehaviourSummary> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: BehaviourSummary) {
        self.rows.push(row);
    }

    /// Append all rows of `other` after the existing ones
    pub fn extend_from(&mut self, other: SummaryTable) {
        self.rows.extend(other.rows);
    }

    /// Concatenate independently built tables into one, preserving order
    pub fn concat<I: IntoIterator<Item = SummaryTable>>(tables: I) -> Self {
        let mut combined = Self::new();
        for table in tables {
            combined.extend_from(table);
        }
        combined
    }

    /// Distinct condition column names in first-seen order
    pub fn condition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.condition.name.as_str()) {
                names.push(&row.condition.name);
            }
        }
        names
    }
}

impl Extend<BehaviourSummary> for SummaryTable {
    fn extend<I: IntoIterator<Item = BehaviourSummary>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl From<Vec<BehaviourSummary>> for SummaryTable {
    fn from(rows: Vec<BehaviourSummary>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a SummaryTable {
    type Item = &'a BehaviourSummary;
    type IntoIter = std::slice::Iter<'a, BehaviourSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
