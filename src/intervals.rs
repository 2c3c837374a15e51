//! START/STOP interval pairing
//!
//! Onsets and offsets are paired by position: the i-th START with the i-th STOP,
//! in log order. Entries beyond the shorter sequence stay unmatched and are
//! reported rather than silently lost.

use serde::{Deserialize, Serialize};

/// One paired START/STOP bout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub stop: f64,
}

impl Interval {
    /// Bout length in seconds (negative when STOP precedes START)
    pub fn length(&self) -> f64 {
        self.stop - self.start
    }
}

/// Result of pairing the onsets and offsets of one behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalPairing {
    pub intervals: Vec<Interval>,
    /// STARTs left over after pairing
    pub unmatched_starts: usize,
    /// STOPs left over after pairing
    pub unmatched_stops: usize,
}

impl IntervalPairing {
    /// Total time across all paired bouts
    pub fn total(&self) -> f64 {
        // `f64::sum` over nothing yields -0.0
        self.intervals.iter().fold(0.0, |acc, i| acc + i.length())
    }

    pub fn is_balanced(&self) -> bool {
        self.unmatched_starts == 0 && self.unmatched_stops == 0
    }

    pub fn start_count(&self) -> usize {
        self.intervals.len() + self.unmatched_starts
    }

    pub fn stop_count(&self) -> usize {
        self.intervals.len() + self.unmatched_stops
    }
}

/// Pair onset and offset times positionally
pub fn pair_intervals(starts: &[f64], stops: &[f64]) -> IntervalPairing {
    let intervals: Vec<Interval> = starts
        .iter()
        .zip(stops)
        .map(|(&start, &stop)| Interval { start, stop })
        .collect();

    IntervalPairing {
        unmatched_starts: starts.len() - intervals.len(),
        unmatched_stops: stops.len() - intervals.len(),
        intervals,
    }
}
