//! Suggestion history: recently accepted messages, most recent first.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::HistoryError;

/// History file name, stored in the repository root.
pub const HISTORY_FILENAME: &str = ".gitmit_history.json";

/// Number of messages kept.
pub const HISTORY_CAPACITY: usize = 10;

/// What the selector needs from history.
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore {
    fn contains(&self, message: &str) -> bool;
    fn add(&mut self, message: &str, template: &str);
}

/// One accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
}

/// Capacity-bounded history persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitHistory {
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

impl CommitHistory {
    /// Path of the history file for a repository.
    pub fn path_in(repo_root: &Path) -> PathBuf {
        repo_root.join(HISTORY_FILENAME)
    }

    /// Load history from `path`. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(HistoryError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let mut history: Self = serde_json::from_str(&content).map_err(|e| HistoryError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        history.entries.truncate(HISTORY_CAPACITY);
        Ok(history)
    }

    /// Save history to `path`, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let write_failed = |e: std::io::Error| HistoryError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let json = serde_json::to_string_pretty(self).map_err(HistoryError::SerializeFailed)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;
        file.write_all(json.as_bytes()).map_err(write_failed)?;
        file.write_all(b"\n").map_err(write_failed)?;
        file.persist(path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }

    /// Record a message with an explicit timestamp.
    pub fn add_at(&mut self, message: &str, template: &str, timestamp: DateTime<Utc>) {
        self.entries.insert(
            0,
            HistoryEntry {
                message: message.to_string(),
                timestamp,
                template: template.to_string(),
            },
        );
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryStore for CommitHistory {
    fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|entry| entry.message == message)
    }

    fn add(&mut self, message: &str, template: &str) {
        self.add_at(message, template, Utc::now());
    }
}
