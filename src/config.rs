//! Summarizer configuration
//!
//! Every knob has a default matching the historical behaviour, so an empty JSON
//! object (`{}`) yields the same results as [`SummarizerConfig::default`].

use crate::error::SummaryError;
use crate::types::{
    DEFAULT_BEHAVIOURS, DEFAULT_LATENCY_SENTINEL, OVERALL_RETRIEVAL, PUP_INTRO,
    RETRIEVAL_CONSTITUENTS,
};
use serde::{Deserialize, Serialize};

/// How the retrieval category merge interacts with the behaviour order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Relabel constituents when the merged behaviour is reached; behaviours
    /// processed earlier in the list see the original labels.
    #[default]
    Sequential,
    /// Classify every event once up front; results do not depend on order.
    Classified,
}

/// Handling of START/STOP counts that do not match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Sum the overlapping prefix, drop trailing unmatched entries
    #[default]
    Lenient,
    /// Reject unbalanced behaviours with `MismatchedIntervalCount`
    Strict,
}

/// Folding of several coded labels into one derived category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMerge {
    /// Label of the derived category
    pub target: String,
    /// Labels relabelled to `target`
    pub constituents: Vec<String>,
}

impl Default for CategoryMerge {
    fn default() -> Self {
        Self {
            target: OVERALL_RETRIEVAL.to_string(),
            constituents: RETRIEVAL_CONSTITUENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CategoryMerge {
    pub fn is_constituent(&self, label: &str) -> bool {
        self.constituents.iter().any(|c| c == label)
    }

    /// Effective label of `label` once the merge applies
    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        if self.is_constituent(label) {
            &self.target
        } else {
            label
        }
    }
}

/// Configuration for [`crate::summarizer::BehaviourSummarizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Behaviours to summarize, in processing order
    pub behaviours: Vec<String>,
    /// Latency reported for behaviours that never occur (seconds)
    pub latency_sentinel: f64,
    /// Label of the event defining time zero
    pub reference_behaviour: String,
    pub merge_mode: MergeMode,
    pub merge_rule: CategoryMerge,
    pub pairing: PairingMode,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            behaviours: DEFAULT_BEHAVIOURS.iter().map(|s| s.to_string()).collect(),
            latency_sentinel: DEFAULT_LATENCY_SENTINEL,
            reference_behaviour: PUP_INTRO.to_string(),
            merge_mode: MergeMode::default(),
            merge_rule: CategoryMerge::default(),
            pairing: PairingMode::default(),
        }
    }
}

impl SummarizerConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SummaryError> {
        let config: SummarizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SummaryError> {
        serde_json::to_string_pretty(self).map_err(SummaryError::JsonError)
    }

    pub fn validate(&self) -> Result<(), SummaryError> {
        if !self.latency_sentinel.is_finite() {
            return Err(SummaryError::InvalidConfig(
                "latency_sentinel must be a finite number".to_string(),
            ));
        }
        if self.reference_behaviour.is_empty() {
            return Err(SummaryError::InvalidConfig(
                "reference_behaviour must not be empty".to_string(),
            ));
        }
        if self.merge_rule.target.is_empty() {
            return Err(SummaryError::InvalidConfig(
                "merge_rule.target must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_historical_behaviour() {
        let config = SummarizerConfig::default();
        assert_eq!(config.behaviours.len(), 8);
        assert_eq!(config.behaviours[5], "overall retrieval");
        assert_eq!(config.latency_sentinel, 900.0);
        assert_eq!(config.reference_behaviour, "pup intro");
        assert_eq!(config.merge_mode, MergeMode::Sequential);
        assert_eq!(config.pairing, PairingMode::Lenient);
    }

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = SummarizerConfig::from_json("{}").unwrap();
        assert_eq!(config, SummarizerConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "latency_sentinel": 600,
            "merge_mode": "classified",
            "pairing": "strict",
            "behaviours": ["pup sniff"]
        }"#;
        let config = SummarizerConfig::from_json(json).unwrap();
        assert_eq!(config.latency_sentinel, 600.0);
        assert_eq!(config.merge_mode, MergeMode::Classified);
        assert_eq!(config.pairing, PairingMode::Strict);
        assert_eq!(config.behaviours, vec!["pup sniff".to_string()]);
        assert_eq!(config.merge_rule, CategoryMerge::default());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = SummarizerConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SummarizerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_empty_reference() {
        let result = SummarizerConfig::from_json(r#"{"reference_behaviour": ""}"#);
        assert!(matches!(result, Err(SummaryError::InvalidConfig(_))));
    }

    #[test]
    fn test_category_merge_apply() {
        let merge = CategoryMerge::default();
        assert_eq!(merge.apply("aborted retrieval"), "overall retrieval");
        assert_eq!(merge.apply("retrieval to nest"), "overall retrieval");
        assert_eq!(merge.apply("pup sniff"), "pup sniff");
    }
}
