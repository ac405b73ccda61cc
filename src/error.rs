//! Error types for gitmit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to read last commit: {0}")]
    ReadHead(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Repository has no working directory (bare repositories are not supported)")]
    BareRepository,
}

/// Errors from diff analysis.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No staged changes to analyze. Stage some files first with 'git add'")]
    NoChanges,
}

/// Errors raised while loading and validating a template corpus.
#[derive(Error, Debug)]
pub enum TemplateValidationError {
    #[error("Failed to read template file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template corpus is not valid JSON: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Template corpus is missing required action group '{0}'")]
    MissingActionGroup(String),

    #[error("Action group '{0}' has no non-empty '_default' bucket")]
    MissingDefault(String),

    #[error("Template bucket '{group}/{topic}' is empty")]
    EmptyBucket { group: String, topic: String },

    #[error("Template has unbalanced braces: {template}")]
    UnbalancedBraces { template: String },

    #[error("Template uses unknown placeholder '{{{placeholder}}}': {template}")]
    UnknownPlaceholder {
        placeholder: String,
        template: String,
    },
}

/// No template bucket could be found for a commit context.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("No templates found for action '{action}' and topic '{topic}' (no '_default' bucket after fallbacks)")]
pub struct TemplateResolutionError {
    pub action: String,
    pub topic: String,
}

/// Errors from suggestion history persistence.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read history file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse history file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize history: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Failed to write history file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors during config loading and writing.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Could not determine home directory for the global config")]
    NoHomeDirectory,
}
