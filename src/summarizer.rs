//! Behaviour summarizer
//!
//! Turns one normalized event log into latency/duration rows, one per requested
//! behaviour, appended to a caller-owned [`SummaryTable`].
//!
//! Per behaviour, in the requested order:
//! 1. apply the retrieval category merge (see [`crate::merge`])
//! 2. select the events counted as the behaviour
//! 3. latency = first selected event − reference event, or the sentinel
//! 4. duration = sum of positionally paired START/STOP bouts

use crate::config::{MergeMode, PairingMode, SummarizerConfig};
use crate::error::SummaryError;
use crate::intervals::{pair_intervals, IntervalPairing};
use crate::merge::LabelView;
use crate::types::{
    BehaviourSummary, Condition, Event, EventLog, EventStatus, SummaryTable, SUMMARY_COLUMNS,
};
use tracing::{debug, warn};

/// Summarize `log` with the default configuration and return the extended table.
///
/// `behaviours` falls back to [`crate::types::DEFAULT_BEHAVIOURS`] when `None`.
///
/// # Example
/// ```
/// use retrieval_summary::{summarize, Event, EventLog, SummaryTable};
///
/// let log = EventLog::new(vec![
///     Event::point("pup intro", 0.0),
///     Event::start("pup sniff", 10.0),
///     Event::stop("pup sniff", 15.0),
/// ]);
/// let names = ["pup sniff"];
/// let table = summarize(&log, "M1", "P5", "day", SummaryTable::new(), Some(&names)).unwrap();
/// assert_eq!(table.rows()[0].latency, 10.0);
/// assert_eq!(table.rows()[0].duration, 5.0);
/// ```
pub fn summarize(
    log: &EventLog,
    subject_id: &str,
    condition_value: &str,
    condition_name: &str,
    table: SummaryTable,
    behaviours: Option<&[&str]>,
) -> Result<SummaryTable, SummaryError> {
    BehaviourSummarizer::new().summarize(
        log,
        subject_id,
        condition_value,
        condition_name,
        table,
        behaviours,
    )
}

/// Latency and interval pairing for one behaviour before it becomes a row
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviourMeasurement {
    pub behaviour: String,
    pub latency: f64,
    pub pairing: IntervalPairing,
}

impl BehaviourMeasurement {
    pub fn duration(&self) -> f64 {
        self.pairing.total()
    }
}

/// Stateless summarizer carrying an immutable configuration.
///
/// Safe to share across threads; each call works only on its own inputs.
#[derive(Debug, Clone, Default)]
pub struct BehaviourSummarizer {
    config: SummarizerConfig,
}

impl BehaviourSummarizer {
    /// Create a summarizer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SummarizerConfig) -> Self {
        Self { config }
    }

    /// Override the latency reported for behaviours that never occur
    pub fn with_latency_sentinel(mut self, sentinel: f64) -> Self {
        self.config.latency_sentinel = sentinel;
        self
    }

    /// Replace the default behaviour list
    pub fn with_behaviours<I, S>(mut self, behaviours: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.behaviours = behaviours.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.config.merge_mode = mode;
        self
    }

    /// Reject behaviours whose START and STOP counts differ
    pub fn strict(mut self) -> Self {
        self.config.pairing = PairingMode::Strict;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarize `log` and return `table` extended with one row per behaviour.
    ///
    /// On error nothing is appended; the table is dropped with the error. Use
    /// [`BehaviourSummarizer::summarize_into`] to keep it.
    pub fn summarize(
        &self,
        log: &EventLog,
        subject_id: &str,
        condition_value: &str,
        condition_name: &str,
        mut table: SummaryTable,
        behaviours: Option<&[&str]>,
    ) -> Result<SummaryTable, SummaryError> {
        self.summarize_into(
            log,
            subject_id,
            condition_value,
            condition_name,
            &mut table,
            behaviours,
        )?;
        Ok(table)
    }

    /// Append one row per behaviour to `table`; leaves it untouched on error.
    ///
    /// `condition_name` becomes its own output column, so it may not be one of
    /// [`SUMMARY_COLUMNS`].
    pub fn summarize_into(
        &self,
        log: &EventLog,
        subject_id: &str,
        condition_value: &str,
        condition_name: &str,
        table: &mut SummaryTable,
        behaviours: Option<&[&str]>,
    ) -> Result<(), SummaryError> {
        if SUMMARY_COLUMNS.contains(&condition_name) {
            return Err(SummaryError::InvalidConfig(format!(
                "condition name {condition_name:?} collides with a summary column"
            )));
        }

        let condition = Condition::new(condition_name, condition_value);
        let measurements = self.measure(log, behaviours)?;

        table.extend(measurements.into_iter().map(|m| BehaviourSummary {
            id: subject_id.to_string(),
            condition: condition.clone(),
            latency: m.latency,
            duration: m.duration(),
            behaviour: m.behaviour,
        }));
        Ok(())
    }

    /// Measure every requested behaviour without building rows
    pub fn measure(
        &self,
        log: &EventLog,
        behaviours: Option<&[&str]>,
    ) -> Result<Vec<BehaviourMeasurement>, SummaryError> {
        check_timestamps(log)?;

        let reference = &self.config.reference_behaviour;
        let intro = log
            .first_time_of(reference)
            .ok_or_else(|| SummaryError::MissingReferenceEvent(reference.clone()))?;

        let names: Vec<&str> = match behaviours {
            Some(list) => list.to_vec(),
            None => self.config.behaviours.iter().map(String::as_str).collect(),
        };

        let mut view = LabelView::new(&self.config.merge_rule, self.config.merge_mode);
        let mut measurements = Vec::with_capacity(names.len());

        for name in names {
            view.advance(name);
            let selected = view.select(log, name);
            let measurement = self.measure_behaviour(name, &selected, intro)?;

            debug!(
                behaviour = name,
                events = selected.len(),
                latency = measurement.latency,
                duration = measurement.duration(),
                "summarized behaviour"
            );
            measurements.push(measurement);
        }

        Ok(measurements)
    }

    fn measure_behaviour(
        &self,
        name: &str,
        selected: &[&Event],
        intro: f64,
    ) -> Result<BehaviourMeasurement, SummaryError> {
        // First selected event of any status, not specifically the first START
        let latency = selected
            .first()
            .map(|e| e.time - intro)
            .unwrap_or(self.config.latency_sentinel);

        let starts = times_with_status(selected, &EventStatus::Start);
        let stops = times_with_status(selected, &EventStatus::Stop);
        let pairing = pair_intervals(&starts, &stops);

        if !pairing.is_balanced() {
            match self.config.pairing {
                PairingMode::Strict => {
                    warn!(
                        behaviour = name,
                        starts = pairing.start_count(),
                        stops = pairing.stop_count(),
                        "unbalanced START/STOP"
                    );
                    return Err(SummaryError::MismatchedIntervalCount {
                        behaviour: name.to_string(),
                        starts: pairing.start_count(),
                        stops: pairing.stop_count(),
                    });
                }
                PairingMode::Lenient => debug!(
                    behaviour = name,
                    unmatched_starts = pairing.unmatched_starts,
                    unmatched_stops = pairing.unmatched_stops,
                    "dropping unmatched interval ends"
                ),
            }
        }

        Ok(BehaviourMeasurement {
            behaviour: name.to_string(),
            latency,
            pairing,
        })
    }
}

fn times_with_status(events: &[&Event], status: &EventStatus) -> Vec<f64> {
    events
        .iter()
        .filter(|e| &e.status == status)
        .map(|e| e.time)
        .collect()
}

fn check_timestamps(log: &EventLog) -> Result<(), SummaryError> {
    match log.iter().position(|e| !e.time.is_finite()) {
        Some(index) => Err(SummaryError::MalformedTimestamp {
            row: index + 1,
            value: log.events()[index].time.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn retrieval_log() -> EventLog {
        EventLog::new(vec![
            Event::point("pup intro", 30.0),
            Event::start("pup sniff", 35.0),
            Event::stop("pup sniff", 38.0),
            Event::start("aborted retrieval", 40.0),
            Event::stop("aborted retrieval", 42.0),
            Event::start("retrieval to nest", 50.0),
            Event::stop("retrieval to nest", 56.0),
            Event::start("pup sniff", 60.0),
            Event::stop("pup sniff", 61.5),
            Event::start("crouching", 70.0),
            Event::stop("crouching", 130.0),
        ])
    }

    fn unbalanced_groom_log() -> EventLog {
        EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::start("pup groom", 10.0),
            Event::stop("pup groom", 14.0),
            Event::start("pup groom", 20.0),
        ])
    }

    /// Summarize for subject M1 on day P5 into a fresh table
    fn run(log: &EventLog, names: Option<&[&str]>) -> SummaryTable {
        run_with(&BehaviourSummarizer::new(), log, names)
    }

    fn run_with(
        summarizer: &BehaviourSummarizer,
        log: &EventLog,
        names: Option<&[&str]>,
    ) -> SummaryTable {
        let table = SummaryTable::new();
        summarizer
            .summarize(log, "M1", "P5", "day", table, names)
            .unwrap()
    }

    fn row(behaviour: &str, latency: f64, duration: f64) -> BehaviourSummary {
        BehaviourSummary {
            id: "M1".to_string(),
            condition: Condition::new("day", "P5"),
            behaviour: behaviour.to_string(),
            latency,
            duration,
        }
    }

    fn find<'a>(table: &'a SummaryTable, behaviour: &str) -> &'a BehaviourSummary {
        table.iter().find(|r| r.behaviour == behaviour).unwrap()
    }

    #[test]
    fn test_single_bout_scenario() {
        let log = EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::start("pup sniff", 10.0),
            Event::stop("pup sniff", 15.0),
        ]);

        let table = run(&log, Some(&["pup sniff"]));

        assert_eq!(table.rows(), &[row("pup sniff", 10.0, 5.0)]);
    }

    #[test]
    fn test_default_behaviour_list() {
        let table = run(&retrieval_log(), None);

        let expected = vec![
            row("pup sniff", 5.0, 4.5),
            row("pup groom", 900.0, 0.0),
            row("aborted retrieval", 10.0, 2.0),
            row("nest time", 900.0, 0.0),
            row("retrieval to nest", 20.0, 6.0),
            row("overall retrieval", 10.0, 8.0),
            row("crouching", 40.0, 60.0),
            row("nest building", 900.0, 0.0),
        ];
        assert_eq!(table.rows(), expected.as_slice());
    }

    #[test]
    fn test_unobserved_behaviour_uses_sentinel() {
        let table = run(&retrieval_log(), Some(&["licking", "nest building"]));

        for r in table.iter() {
            assert_eq!(r.latency, 900.0);
            assert_eq!(r.duration, 0.0);
            assert!(!r.duration.is_sign_negative());
        }
    }

    #[test]
    fn test_unobserved_behaviour_csv_has_plain_zero() {
        let log = EventLog::new(vec![Event::point("pup intro", 0.0)]);
        let table = run(&log, Some(&["pup groom"]));

        assert_eq!(
            table.to_csv(),
            "ID,day,behaviour,latency,duration\nM1,P5,pup groom,900,0\n"
        );
    }

    #[test]
    fn test_custom_sentinel() {
        let summarizer = BehaviourSummarizer::new().with_latency_sentinel(600.0);
        let table = run_with(&summarizer, &retrieval_log(), Some(&["licking"]));

        assert_eq!(table.rows()[0].latency, 600.0);
    }

    #[test]
    fn test_latency_uses_first_event_regardless_of_status() {
        let log = EventLog::new(vec![
            Event::point("pup intro", 5.0),
            Event::stop("nest time", 7.0),
            Event::start("nest time", 9.0),
            Event::stop("nest time", 12.0),
        ]);

        let table = run(&log, Some(&["nest time"]));

        assert_eq!(table.rows()[0].latency, 2.0);
        // START 9 pairs with the first STOP at 7
        assert_eq!(table.rows()[0].duration, -2.0);
    }

    #[test]
    fn test_row_count_matches_request() {
        let names = ["pup sniff", "pup sniff", "licking", "crouching", "pup intro"];
        let table = run(&retrieval_log(), Some(&names));
        assert_eq!(table.len(), names.len());

        let empty = summarize(&retrieval_log(), "M1", "P5", "day", table.clone(), Some(&[]));
        assert_eq!(empty.unwrap(), table);
    }

    #[test]
    fn test_merge_order_dependence() {
        let log = EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::start("aborted retrieval", 5.0),
            Event::stop("aborted retrieval", 8.0),
        ]);

        let before = run(&log, Some(&["aborted retrieval", "overall retrieval"]));
        let after = run(&log, Some(&["overall retrieval", "aborted retrieval"]));

        assert_eq!(
            find(&before, "aborted retrieval"),
            &row("aborted retrieval", 5.0, 3.0)
        );
        assert_eq!(
            find(&after, "aborted retrieval"),
            &row("aborted retrieval", 900.0, 0.0)
        );
        assert_eq!(
            find(&before, "overall retrieval"),
            &row("overall retrieval", 5.0, 3.0)
        );
        assert_eq!(
            find(&before, "overall retrieval"),
            find(&after, "overall retrieval")
        );
    }

    #[test]
    fn test_classified_merge_is_order_independent() {
        let summarizer = BehaviourSummarizer::new().with_merge_mode(MergeMode::Classified);
        let log = retrieval_log();
        let forward_names = ["aborted retrieval", "overall retrieval", "retrieval to nest"];
        let reversed_names = ["retrieval to nest", "overall retrieval", "aborted retrieval"];

        let forward = run_with(&summarizer, &log, Some(&forward_names));
        let reversed = run_with(&summarizer, &log, Some(&reversed_names));

        for name in forward_names {
            assert_eq!(find(&forward, name), find(&reversed, name));
        }
        assert_eq!(find(&forward, "retrieval to nest").duration, 6.0);
    }

    #[test]
    fn test_classified_matches_sequential_for_default_list() {
        let log = retrieval_log();
        let sequential = run(&log, None);
        let classified = BehaviourSummarizer::new().with_merge_mode(MergeMode::Classified);
        let classified = run_with(&classified, &log, None);

        assert_eq!(sequential, classified);
    }

    #[test]
    fn test_unbalanced_intervals_truncate() {
        let table = run(&unbalanced_groom_log(), Some(&["pup groom"]));
        assert_eq!(table.rows()[0].duration, 4.0);
    }

    #[test]
    fn test_strict_mode_rejects_unbalanced() {
        let summarizer = BehaviourSummarizer::new().strict();
        let names = ["pup sniff", "pup groom"];
        let log = unbalanced_groom_log();
        let mut table = SummaryTable::new();
        let result = summarizer.summarize_into(&log, "M1", "P5", "day", &mut table, Some(&names));

        match result {
            Err(SummaryError::MismatchedIntervalCount {
                behaviour,
                starts,
                stops,
            }) => {
                assert_eq!(behaviour, "pup groom");
                assert_eq!(starts, 2);
                assert_eq!(stops, 1);
            }
            other => panic!("expected MismatchedIntervalCount, got {other:?}"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn test_accumulation_appends_without_dedup() {
        let log = retrieval_log();
        let first = run(&log, None);
        let second = summarize(&log, "M1", "P5", "day", first.clone(), None).unwrap();

        assert_eq!(second.len(), first.len() * 2);
        assert_eq!(&second.rows()[..first.len()], first.rows());
        assert_eq!(&second.rows()[first.len()..], first.rows());
    }

    #[test]
    fn test_accumulates_across_subjects() {
        let log = retrieval_log();
        let names = ["pup sniff"];
        let table = run(&log, Some(&names));
        let table = summarize(&log, "M2", "saline", "treatment", table, Some(&names)).unwrap();

        assert_eq!(table.rows()[1].id, "M2");
        assert_eq!(
            table.rows()[1].condition,
            Condition::new("treatment", "saline")
        );
        assert_eq!(table.condition_names(), vec!["day", "treatment"]);
    }

    #[test]
    fn test_condition_name_colliding_with_column_rejected() {
        let mut table = run(&retrieval_log(), Some(&["pup sniff"]));
        let before = table.clone();

        let summarizer = BehaviourSummarizer::new();
        let log = retrieval_log();

        for name in SUMMARY_COLUMNS {
            let result = summarizer.summarize_into(&log, "M1", "P5", name, &mut table, None);
            assert!(matches!(result, Err(SummaryError::InvalidConfig(_))));
        }
        assert_eq!(table, before);
    }

    #[test]
    fn test_missing_reference_event() {
        let log = EventLog::new(vec![
            Event::start("pup sniff", 10.0),
            Event::stop("pup sniff", 15.0),
        ]);

        let mut table = run(&retrieval_log(), None);
        let before = table.clone();
        let summarizer = BehaviourSummarizer::new();
        let result = summarizer.summarize_into(&log, "M1", "P5", "day", &mut table, None);

        assert!(matches!(
            result,
            Err(SummaryError::MissingReferenceEvent(ref label)) if label == "pup intro"
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let log = EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::start("pup sniff", f64::NAN),
        ]);

        let result = summarize(&log, "M1", "P5", "day", SummaryTable::new(), None);
        assert!(matches!(
            result,
            Err(SummaryError::MalformedTimestamp { row: 2, .. })
        ));
    }

    #[test]
    fn test_log_is_not_mutated() {
        let log = retrieval_log();
        let before = log.clone();
        run(&log, None);

        assert_eq!(log, before);
        // A second pass over the same log sees the original labels
        let again = run(&log, Some(&["aborted retrieval"]));
        assert_eq!(again.rows()[0].latency, 10.0);
    }

    #[test]
    fn test_measure_exposes_unmatched_ends() {
        let log = EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::stop("nest building", 3.0),
            Event::start("nest building", 4.0),
            Event::stop("nest building", 9.0),
        ]);

        let measurements = BehaviourSummarizer::new()
            .measure(&log, Some(&["nest building"]))
            .unwrap();

        assert_eq!(measurements[0].pairing.unmatched_stops, 1);
        assert_eq!(measurements[0].pairing.intervals.len(), 1);
        assert_eq!(measurements[0].duration(), -1.0);
    }
}
