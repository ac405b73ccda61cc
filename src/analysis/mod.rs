//! Heuristic analysis of staged changes.

mod action;
mod analyzer;
mod change;
mod context;
pub mod patterns;
mod purpose;
pub mod scope;
pub mod structure;

pub use action::Action;
pub use analyzer::{
    DiffAnalyzer, MultiFilePattern, RecentScopeLookup, detect_multi_file_patterns, diff_stat_action,
    keyword_action, legacy_action,
};
pub use change::{Change, ChangeKind, MAJOR_CHANGE_THRESHOLD, file_extension, is_test_path};
pub use context::{CommitContext, DEFAULT_PURPOSE, DEFAULT_TOPIC, FileMove};
pub use patterns::Pattern;
pub use purpose::determine_purpose;
