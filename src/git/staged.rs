//! Staged change collection from the index using git2.

use std::collections::HashMap;

use git2::{Delta, Diff, DiffDelta, DiffFindOptions, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::analysis::{Change, ChangeKind};
use crate::error::GitError;

/// Every staged file plus line totals across the whole index diff.
#[derive(Debug, Clone, Default)]
pub struct StagedChanges {
    pub changes: Vec<Change>,
    pub total_added: usize,
    pub total_removed: usize,
}

impl StagedChanges {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A file's patch lines accumulated while walking the diff.
#[derive(Debug)]
struct Pending {
    path: String,
    source: Option<String>,
    kind: ChangeKind,
    diff: String,
    added: usize,
    removed: usize,
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect what `git commit` would record: HEAD tree vs index, without
/// context lines, with renames and copies detected.
///
/// An empty result is not an error here; the analyzer decides what to do with
/// nothing staged.
pub fn collect_staged_changes(repo: &Repository) -> Result<StagedChanges, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut opts = DiffOptions::new();
    opts.context_lines(0);
    let mut diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let mut find = DiffFindOptions::new();
    find.renames(true).copies(true);
    diff.find_similar(Some(&mut find)).map_err(GitError::DiffFailed)?;

    let mut pending = collect_files(&diff);
    let staged = accumulate_lines(&diff, &mut pending);

    let changes = pending
        .into_iter()
        .map(|p| {
            let mut change = Change::with_counts(p.path.clone(), p.kind, p.diff, p.added, p.removed);
            if p.source.is_some() {
                change.target = Some(p.path);
                change.source = p.source;
            }
            change
        })
        .collect::<Vec<_>>();

    debug!(
        files = changes.len(),
        added = staged.0,
        removed = staged.1,
        "Collected staged changes"
    );

    Ok(StagedChanges {
        changes,
        total_added: staged.0,
        total_removed: staged.1,
    })
}

/// One entry per delta, in diff order.
fn collect_files(diff: &Diff<'_>) -> Vec<Pending> {
    diff.deltas()
        .filter_map(|delta| {
            let kind = match delta.status() {
                Delta::Added => ChangeKind::Add,
                Delta::Modified | Delta::Typechange => ChangeKind::Modify,
                Delta::Deleted => ChangeKind::Delete,
                Delta::Renamed => ChangeKind::Rename,
                Delta::Copied => ChangeKind::Copy,
                _ => return None,
            };
            let path = delta_path(&delta)?;
            let source = match kind {
                ChangeKind::Rename | ChangeKind::Copy => delta
                    .old_file()
                    .path()
                    .map(|p| p.to_string_lossy().to_string()),
                _ => None,
            };
            Some(Pending {
                path,
                source,
                kind,
                diff: String::new(),
                added: 0,
                removed: 0,
            })
        })
        .collect()
}

/// Append each `+`/`-` line to its file and return the overall totals.
fn accumulate_lines(diff: &Diff<'_>, pending: &mut [Pending]) -> (usize, usize) {
    let index: HashMap<String, usize> = pending
        .iter()
        .enumerate()
        .map(|(i, p)| (p.path.clone(), i))
        .collect();
    let mut totals = (0usize, 0usize);

    if let Err(e) = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let origin = line.origin();
        if origin != '+' && origin != '-' {
            return true;
        }
        let Some(slot) = delta_path(&delta).and_then(|path| index.get(&path).copied()) else {
            return true;
        };

        let file = &mut pending[slot];
        let content = String::from_utf8_lossy(line.content());
        file.diff.push(origin);
        file.diff.push_str(content.trim_end_matches(['\n', '\r']));
        file.diff.push('\n');

        if origin == '+' {
            file.added += 1;
            totals.0 += 1;
        } else {
            file.removed += 1;
            totals.1 += 1;
        }
        true
    }) {
        warn!("Failed to read staged patch text: {e}");
    }

    totals
}

fn delta_path(delta: &DiffDelta<'_>) -> Option<String> {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
}
