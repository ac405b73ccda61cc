//! Conventional commit parsing, last-commit lookup and commit creation.

use std::sync::LazyLock;

use git2::{Commit, ErrorCode, Oid, Repository};
use regex_lite::Regex;
use tracing::debug;

use crate::analysis::{Action, RecentScopeLookup};
use crate::error::GitError;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?\s*:\s*").expect("Invalid regex"));

/// The parts of a conventional commit header.
///
/// `scope` drives the last-commit lookup; `action` and `breaking` feed the
/// history insights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub action: Option<Action>,
    pub scope: Option<String>,
    pub breaking: bool,
}

/// Parse a conventional commit message.
///
/// An unknown type still yields its scope; a non-conventional message yields
/// neither.
pub fn parse_commit_message(message: &str) -> ParsedHeader {
    let first_line = message.lines().next().unwrap_or("");

    // Check for BREAKING CHANGE in footer
    let breaking_in_footer = message.contains("BREAKING CHANGE:") || message.contains("BREAKING-CHANGE:");

    match HEADER.captures(first_line) {
        Some(caps) => ParsedHeader {
            action: caps.get(1).and_then(|m| m.as_str().parse::<Action>().ok()),
            scope: caps.get(2).map(|m| m.as_str().trim().to_string()),
            breaking: caps.get(3).is_some() || breaking_in_footer,
        },
        None => ParsedHeader {
            action: None,
            scope: None,
            breaking: breaking_in_footer,
        },
    }
}

/// The HEAD commit, or `None` on an unborn branch.
pub(crate) fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>, GitError> {
    match repo.head() {
        Ok(head) => head.peel_to_commit().map(Some).map_err(GitError::ReadHead),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(GitError::ReadHead(e)),
    }
}

/// Reads the scope of the last commit on HEAD.
pub struct LastCommitScope<'r> {
    repo: &'r Repository,
}

impl<'r> LastCommitScope<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }
}

impl RecentScopeLookup for LastCommitScope<'_> {
    fn recent_scope(&self) -> Option<String> {
        let commit = match head_commit(self.repo) {
            Ok(commit) => commit?,
            Err(e) => {
                debug!("Could not read last commit: {e}");
                return None;
            }
        };
        let summary = commit.summary().unwrap_or("");
        parse_commit_message(summary).scope.filter(|s| !s.is_empty())
    }
}

/// Commit the current index on HEAD with `message`.
///
/// Works on an unborn branch, producing a root commit.
pub fn commit_index(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    // Get the signature from git config
    let sig = repo.signature().map_err(GitError::ConfigError)?;

    let parent = head_commit(repo)?;
    let parents: Vec<&Commit> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    debug!(%oid, "Created commit");
    Ok(oid)
}
