//! Configuration for analysis heuristics.
//!
//! Layers, lowest to highest priority:
//! 1. Built-in defaults
//! 2. Global `~/.gitmit.json` (or `$GITMIT_GLOBAL_CONFIG`)
//! 3. `.gitmit.json` in the repository root

mod loader;
mod sample;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::Action;

pub use loader::{CONFIG_FILENAME, GLOBAL_CONFIG_ENV, global_config_path, load, load_file, write};
pub use sample::{ProjectType, detect_project_type, sample};

/// Diff-stat threshold used when none is configured.
pub const DEFAULT_DIFF_STAT_THRESHOLD: f64 = 0.5;

/// Per-action keyword weights for keyword scoring.
pub type KeywordWeights = BTreeMap<Action, BTreeMap<String, u32>>;

/// Fully merged configuration consumed by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Path fragment -> topic.
    pub topic_mappings: BTreeMap<String, String>,
    /// Diff keyword -> purpose phrase.
    pub keyword_mappings: BTreeMap<String, String>,
    pub keywords: KeywordWeights,
    pub diff_stat_threshold: f64,
    pub project_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic_mappings: BTreeMap::new(),
            keyword_mappings: BTreeMap::new(),
            keywords: BTreeMap::new(),
            diff_stat_threshold: DEFAULT_DIFF_STAT_THRESHOLD,
            project_type: String::new(),
        }
    }
}

impl Config {
    /// The diff-stat threshold to use; zero or negative means the default.
    pub fn effective_threshold(&self) -> f64 {
        if self.diff_stat_threshold > 0.0 {
            self.diff_stat_threshold
        } else {
            DEFAULT_DIFF_STAT_THRESHOLD
        }
    }

    /// Overlay a partial config file on top of this one.
    ///
    /// Maps merge key by key; scalars replace only when the file sets them.
    pub fn merge(&mut self, other: ConfigFile) {
        if let Some(mappings) = other.topic_mappings {
            self.topic_mappings.extend(mappings);
        }
        if let Some(mappings) = other.keyword_mappings {
            self.keyword_mappings.extend(mappings);
        }
        if let Some(keywords) = other.keywords {
            for (action, weights) in keywords {
                self.keywords.entry(action).or_default().extend(weights);
            }
        }
        if let Some(threshold) = other.diff_stat_threshold {
            self.diff_stat_threshold = threshold;
        }
        if let Some(project_type) = other.project_type {
            self.project_type = project_type;
        }
    }
}

/// One config file on disk; every field optional so layers can be partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_mappings: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_mappings: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordWeights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_stat_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}
