//! Effective behaviour labels during one summarization call
//!
//! The category merge never touches the caller's [`EventLog`]. A [`LabelView`]
//! decides, per behaviour being summarized, which coded labels count as that
//! behaviour.

use crate::config::{CategoryMerge, MergeMode};
use crate::types::{Event, EventLog};

/// Label matching state for one call
#[derive(Debug, Clone)]
pub struct LabelView<'a> {
    rule: &'a CategoryMerge,
    mode: MergeMode,
    merged: bool,
}

impl<'a> LabelView<'a> {
    pub fn new(rule: &'a CategoryMerge, mode: MergeMode) -> Self {
        Self {
            rule,
            mode,
            merged: false,
        }
    }

    /// Move to the next behaviour in processing order.
    ///
    /// In sequential mode, reaching the merge target relabels constituents for
    /// this and every later behaviour.
    pub fn advance(&mut self, behaviour: &str) {
        if self.mode == MergeMode::Sequential && behaviour == self.rule.target {
            self.merged = true;
        }
    }

    /// Label an event carries at this point of the call
    pub fn effective<'l>(&'l self, label: &'l str) -> &'l str {
        if self.merged {
            self.rule.apply(label)
        } else {
            label
        }
    }

    pub fn matches(&self, label: &str, behaviour: &str) -> bool {
        match self.mode {
            MergeMode::Sequential => self.effective(label) == behaviour,
            MergeMode::Classified => label == behaviour || self.rule.apply(label) == behaviour,
        }
    }

    /// Events counted as `behaviour`, in log order
    pub fn select<'l>(&self, log: &'l EventLog, behaviour: &str) -> Vec<&'l Event> {
        log.iter()
            .filter(|e| self.matches(&e.behaviour, behaviour))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn sample_log() -> EventLog {
        EventLog::new(vec![
            Event::point("pup intro", 0.0),
            Event::start("aborted retrieval", 4.0),
            Event::stop("aborted retrieval", 6.0),
            Event::start("retrieval to nest", 9.0),
            Event::stop("retrieval to nest", 12.0),
        ])
    }

    #[test]
    fn test_sequential_before_target_keeps_labels() {
        let log = sample_log();
        let rule = CategoryMerge::default();
        let mut view = LabelView::new(&rule, MergeMode::Sequential);

        view.advance("aborted retrieval");
        assert_eq!(view.effective("aborted retrieval"), "aborted retrieval");
        assert_eq!(view.select(&log, "aborted retrieval").len(), 2);
        assert_eq!(view.select(&log, "overall retrieval").len(), 0);
    }

    #[test]
    fn test_sequential_merge_is_sticky() {
        let log = sample_log();
        let rule = CategoryMerge::default();
        let mut view = LabelView::new(&rule, MergeMode::Sequential);

        view.advance("overall retrieval");
        assert_eq!(view.select(&log, "overall retrieval").len(), 4);

        view.advance("aborted retrieval");
        assert_eq!(view.effective("aborted retrieval"), "overall retrieval");
        assert!(view.select(&log, "aborted retrieval").is_empty());
    }

    #[test]
    fn test_classified_matches_both_levels() {
        let log = sample_log();
        let rule = CategoryMerge::default();
        let mut view = LabelView::new(&rule, MergeMode::Classified);

        view.advance("overall retrieval");
        assert_eq!(view.effective("retrieval to nest"), "retrieval to nest");
        assert_eq!(view.select(&log, "overall retrieval").len(), 4);
        assert_eq!(view.select(&log, "aborted retrieval").len(), 2);
        assert_eq!(view.select(&log, "retrieval to nest").len(), 2);
        assert_eq!(view.select(&log, "pup intro").len(), 1);
    }

    #[test]
    fn test_select_leaves_log_untouched() {
        let log = sample_log();
        let before = log.clone();
        let rule = CategoryMerge::default();
        let mut view = LabelView::new(&rule, MergeMode::Sequential);
        view.advance("overall retrieval");
        let _ = view.select(&log, "overall retrieval");

        assert_eq!(log, before);
    }
}
