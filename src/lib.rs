//! Retrieval Summary - latency and duration tables from coded behaviour logs
//!
//! Turns START/STOP event exports from observational coding software into one
//! row per (subject, condition, behaviour) with the latency to the first
//! occurrence and the total time spent in the behaviour, measured from the
//! `pup intro` marker. Pipeline: export adaptation → summarization → encoding.
//!
//! ## Modules
//!
//! - **Adapters**: normalize preamble, tabular and JSON exports into an [`EventLog`]
//! - **Summarizer**: per-behaviour latency/duration with the retrieval category merge
//! - **Encoder**: CSV and JSON renderings of the accumulated [`SummaryTable`]

pub mod adapters;
pub mod config;
pub mod encoder;
pub mod error;
pub mod intervals;
pub mod merge;
pub mod summarizer;
pub mod types;

pub use adapters::{adapter_for, EventLogAdapter, ExportFormat};
pub use config::{CategoryMerge, MergeMode, PairingMode, SummarizerConfig};
pub use encoder::ReportEncoder;
pub use error::SummaryError;
pub use summarizer::{summarize, BehaviourSummarizer};
pub use types::{
    BehaviourSummary, Condition, Event, EventLog, EventStatus, SummaryTable, DEFAULT_BEHAVIOURS,
};

/// Crate version embedded in all reports
pub const SUMMARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "retrieval-summary";
