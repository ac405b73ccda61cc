//! gitmit - an offline commit message generator for staged git changes.
//!
//! # Overview
//!
//! gitmit reads the staged diff, infers the commit type, topic, item and purpose
//! with line-level heuristics, then fills a scored template from a JSON corpus
//! to produce Conventional Commits subjects. No network access or model is
//! involved.

pub mod analysis;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod insights;
pub mod template;

// Re-export commonly used types
pub use analysis::{Action, Change, ChangeKind, CommitContext, DiffAnalyzer};
pub use config::Config;
pub use error::{AnalysisError, ConfigError, GitError, HistoryError, TemplateResolutionError, TemplateValidationError};
pub use history::{CommitHistory, HistoryStore};
pub use template::{Corpus, MessageFormatter, Suggestion, SuggestionSelector};
