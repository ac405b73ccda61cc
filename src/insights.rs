//! Commit-history statistics and the recommendations drawn from them.

use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::Action;
use crate::git::ParsedHeader;

/// Entries listed for most active files and top contributors.
pub const TOP_LIMIT: usize = 5;

/// Counts gathered over every commit reachable from HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub total_commits: usize,
    /// Commits authored since the cutoff given to the collector.
    pub recent_commits: usize,
    pub breaking_changes: usize,
    pub action_counts: BTreeMap<Action, usize>,
    /// Commits whose subject is not a known conventional type.
    pub unconventional: usize,
    pub file_counts: BTreeMap<String, usize>,
    pub authors: BTreeMap<String, usize>,
}

impl CommitStats {
    /// Record one commit.
    pub fn record<I, S>(&mut self, header: &ParsedHeader, author: &str, files: I, recent: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.total_commits += 1;
        if recent {
            self.recent_commits += 1;
        }
        if header.breaking {
            self.breaking_changes += 1;
        }
        match header.action {
            Some(action) => *self.action_counts.entry(action).or_default() += 1,
            None => self.unconventional += 1,
        }
        for file in files {
            *self.file_counts.entry(file.into()).or_default() += 1;
        }
        *self.authors.entry(author.to_string()).or_default() += 1;
    }

    pub fn count(&self, action: Action) -> usize {
        self.action_counts.get(&action).copied().unwrap_or_default()
    }

    /// Percentage of all commits that `count` represents.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total_commits == 0 {
            0.0
        } else {
            count as f64 / self.total_commits as f64 * 100.0
        }
    }

    /// Files touched by the most commits, ties broken by path.
    pub fn most_active_files(&self, limit: usize) -> Vec<(&str, usize)> {
        top_entries(&self.file_counts, limit)
    }

    /// Authors with the most commits, ties broken by name.
    pub fn top_contributors(&self, limit: usize) -> Vec<(&str, usize)> {
        top_entries(&self.authors, limit)
    }

    /// Gaps worth pointing out in the history's commit mix.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        if self.total_commits == 0 {
            return Vec::new();
        }

        let mut found = Vec::new();
        if self.count(Action::Feat) > self.count(Action::Fix) * 2 {
            found.push(Recommendation::MoreFixes);
        }
        if self.count(Action::Docs) < self.total_commits / 10 {
            found.push(Recommendation::MoreDocs);
        }
        if self.count(Action::Test) < self.total_commits / 5 {
            found.push(Recommendation::MoreTests);
        }
        if self.authors.len() == 1 {
            found.push(Recommendation::SingleContributor);
        }
        found
    }
}

fn top_entries(counts: &BTreeMap<String, usize>, limit: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // BTreeMap order is alphabetical and the sort is stable.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    MoreFixes,
    MoreDocs,
    MoreTests,
    SingleContributor,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Recommendation::MoreFixes => "Feature commits far outnumber fixes; consider scheduling bug fixing",
            Recommendation::MoreDocs => "Consider adding more documentation commits",
            Recommendation::MoreTests => "Consider adding more test commits",
            Recommendation::SingleContributor => "Single contributor detected; consider code reviews",
        };
        f.write_str(text)
    }
}
