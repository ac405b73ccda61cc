//! Git operations using git2-rs.

pub mod commits;
pub mod log;
pub mod staged;

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::error::GitError;

pub use commits::{LastCommitScope, ParsedHeader, commit_index, parse_commit_message};
pub use log::collect_commit_stats;
pub use staged::{StagedChanges, collect_staged_changes};

/// Open the repository containing `path`, searching parent directories.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
    if repo.is_bare() {
        return Err(GitError::BareRepository);
    }
    Ok(repo)
}

/// The repository's working directory.
pub fn repo_root(repo: &Repository) -> Result<PathBuf, GitError> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or(GitError::BareRepository)
}
