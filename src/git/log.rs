//! Walks HEAD's history for `gitmit analyze`.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Repository, Sort};
use tracing::{debug, warn};

use crate::error::GitError;
use crate::git::commits::{head_commit, parse_commit_message};
use crate::insights::CommitStats;

/// Gather statistics over every commit reachable from HEAD.
///
/// Commits authored at or after `since` count as recent. An unborn branch
/// yields empty statistics.
pub fn collect_commit_stats(repo: &Repository, since: DateTime<Utc>) -> Result<CommitStats, GitError> {
    let mut stats = CommitStats::default();
    let Some(head) = head_commit(repo)? else {
        return Ok(stats);
    };

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(head.id()).map_err(GitError::RevwalkError)?;
    revwalk.set_sorting(Sort::TIME).map_err(GitError::RevwalkError)?;

    for oid in revwalk {
        let oid = match oid {
            Ok(oid) => oid,
            Err(e) => {
                warn!("Error during revwalk traversal: {e}. Skipping commit.");
                continue;
            }
        };
        let commit = repo.find_commit(oid).map_err(GitError::RevwalkError)?;

        let header = parse_commit_message(commit.message().unwrap_or(""));
        let author = commit.author().name().unwrap_or("unknown").to_string();
        let authored = Utc.timestamp_opt(commit.time().seconds(), 0).single();
        let recent = authored.is_some_and(|time| time >= since);

        stats.record(&header, &author, changed_paths(repo, &commit)?, recent);
    }

    debug!(commits = stats.total_commits, "Collected commit statistics");
    Ok(stats)
}

/// Paths a commit touched relative to its first parent.
fn changed_paths(repo: &Repository, commit: &Commit<'_>) -> Result<Vec<String>, GitError> {
    let tree = commit.tree().map_err(GitError::DiffFailed)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(GitError::DiffFailed)?),
        Err(_) => None,
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(GitError::DiffFailed)?;

    Ok(diff
        .deltas()
        .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
        .map(|path| path.to_string_lossy().into_owned())
        .collect())
}
