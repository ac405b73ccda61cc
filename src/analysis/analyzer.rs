//! Converts staged changes into a [`CommitContext`].
//!
//! Action selection runs in stages and the first conclusive one wins:
//! single-change shortcuts, diff-stat ratios, configured keyword scoring, and
//! finally a per-file rule on the first change. Multi-file signatures detected
//! across the whole change set override the result afterwards.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::analysis::action::Action;
use crate::analysis::change::{Change, ChangeKind};
use crate::analysis::context::{CommitContext, DEFAULT_PURPOSE, DEFAULT_TOPIC, FileMove};
use crate::analysis::patterns;
use crate::analysis::purpose::determine_purpose;
use crate::analysis::scope::{determine_item, determine_topic, resolve_scope};
use crate::analysis::structure;
use crate::config::Config;
use crate::error::AnalysisError;

/// Offset added to the configured threshold for both dominance checks.
const DOMINANCE_OFFSET: f64 = 0.2;

/// Both ratios above this read as a balanced rewrite.
const BALANCED_RATIO: f64 = 0.3;

/// Total added lines required before an addition-dominant diff counts as a feature.
const FEATURE_MIN_ADDED: usize = 50;

/// A single added file must contribute more than this for the feature bias.
const FEATURE_MIN_FILE_ADDED: usize = 30;

/// More files than this, with enough churn per file, is a project restructure.
const RESTRUCTURE_MIN_FILES: usize = 5;
const RESTRUCTURE_MIN_LINES_PER_FILE: f64 = 10.0;

/// Share of changed lines that must be formatting-only for a style change.
const STYLE_RATIO: f64 = 0.7;

/// Supplies the scope of the most recent commit, if it had one.
#[cfg_attr(test, mockall::automock)]
pub trait RecentScopeLookup {
    fn recent_scope(&self) -> Option<String>;
}

/// Cross-file signatures, in override priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MultiFilePattern {
    FeatureAddition,
    BugFixCascade,
    RefactorSweep,
    TestSuiteUpdate,
    ConfigUpdate,
    ApiRedesign,
    DatabaseMigration,
}

impl MultiFilePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiFilePattern::FeatureAddition => "feature-addition",
            MultiFilePattern::BugFixCascade => "bug-fix-cascade",
            MultiFilePattern::RefactorSweep => "refactor-sweep",
            MultiFilePattern::TestSuiteUpdate => "test-suite-update",
            MultiFilePattern::ConfigUpdate => "config-update",
            MultiFilePattern::ApiRedesign => "api-redesign",
            MultiFilePattern::DatabaseMigration => "database-migration",
        }
    }

    /// Action and purpose forced when this pattern wins.
    pub fn outcome(&self) -> (Action, &'static str) {
        match self {
            MultiFilePattern::FeatureAddition => (Action::Feat, "add new feature across multiple modules"),
            MultiFilePattern::BugFixCascade => (Action::Fix, "resolve issue across multiple components"),
            MultiFilePattern::RefactorSweep => (Action::Refactor, "restructure and improve code organization"),
            MultiFilePattern::TestSuiteUpdate => (Action::Test, "update test suite"),
            MultiFilePattern::ConfigUpdate => (Action::Config, "update configuration"),
            MultiFilePattern::ApiRedesign => (Action::Refactor, "redesign api endpoints"),
            MultiFilePattern::DatabaseMigration => (Action::Feat, "migrate database schema"),
        }
    }
}

impl fmt::Display for MultiFilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic analyzer over a staged change set.
pub struct DiffAnalyzer<'a> {
    config: &'a Config,
    recent: Option<&'a dyn RecentScopeLookup>,
}

impl<'a> DiffAnalyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, recent: None }
    }

    /// Consult `lookup` when the derived topic is generic.
    pub fn with_recent_scope(mut self, lookup: &'a dyn RecentScopeLookup) -> Self {
        self.recent = Some(lookup);
        self
    }

    /// Analyze `changes` into a single commit context.
    ///
    /// Only fails when there is nothing to analyze.
    pub fn analyze(
        &self,
        changes: &[Change],
        total_added: usize,
        total_removed: usize,
    ) -> Result<CommitContext, AnalysisError> {
        let first = changes.first().ok_or(AnalysisError::NoChanges)?;

        let aggregate = self.aggregate(changes, total_added, total_removed);

        if let Some(ctx) = self.smart_fallback(changes, &aggregate) {
            debug!(action = %ctx.action, purpose = %ctx.purpose, "Smart fallback matched");
            return Ok(ctx);
        }

        let mut ctx = aggregate;

        let action = match diff_stat_action(changes, total_added, total_removed, self.config.effective_threshold())
        {
            Some(action) => {
                debug!(%action, "Action from diff stat");
                action
            }
            None => match keyword_action(changes, &self.config.keywords) {
                Some(action) => {
                    debug!(%action, "Action from keyword scoring");
                    action
                }
                None => {
                    let action = legacy_action(first);
                    debug!(%action, path = %first.path, "Action from first-file rule");
                    action
                }
            },
        };
        ctx.action = action;
        ctx.topic = determine_topic(&first.path, &self.config.topic_mappings);
        ctx.item = determine_item(&first.path);
        ctx.purpose = determine_purpose(&first.diff, &self.config.keyword_mappings);

        if changes.len() > 1 {
            let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
            let topics: Vec<String> = changes
                .iter()
                .map(|c| determine_topic(&c.path, &self.config.topic_mappings))
                .collect();
            ctx.scope = resolve_scope(&paths, &topics);
            debug!(scope = %ctx.scope, "Resolved multi-file scope");
        }

        if ctx.topic.is_empty() || ctx.topic == DEFAULT_TOPIC {
            if let Some(recent) = self.recent.and_then(|lookup| lookup.recent_scope()) {
                debug!(%recent, "Adopting scope of the last commit");
                ctx.topic = recent;
            }
        }

        if changes.len() > 1 {
            let detected = detect_multi_file_patterns(changes);
            ctx.multi_file_patterns = detected.iter().map(|p| p.as_str().to_string()).collect();
            if let Some(pattern) = detected.first() {
                let (action, purpose) = pattern.outcome();
                debug!(%pattern, %action, "Multi-file pattern override");
                ctx.action = action;
                ctx.purpose = purpose.to_string();
            }
        }

        Ok(ctx)
    }

    /// Fields computed over every change, before any action is chosen.
    fn aggregate(&self, changes: &[Change], total_added: usize, total_removed: usize) -> CommitContext {
        let mut ctx = CommitContext {
            total_added,
            total_removed,
            ..Default::default()
        };

        for change in changes {
            if !change.extension.is_empty() {
                ctx.file_extensions.insert(change.extension.clone());
            }
            ctx.is_major |= change.is_major;

            extend_unique(&mut ctx.detected_functions, structure::detect_functions(&change.diff));
            extend_unique(&mut ctx.detected_structs, structure::detect_structs(&change.diff));
            extend_unique(&mut ctx.detected_methods, structure::detect_methods(&change.diff));
            ctx.change_patterns.extend(patterns::detect(change));

            let file_move = match (&change.source, &change.target) {
                (Some(source), Some(target)) => Some(FileMove {
                    source: source.clone(),
                    target: target.clone(),
                }),
                _ => None,
            };
            match (change.kind, file_move) {
                (ChangeKind::Rename, Some(file_move)) => ctx.renamed_files.push(file_move),
                (ChangeKind::Copy, Some(file_move)) => ctx.copied_files.push(file_move),
                (ChangeKind::Delete, _) => ctx.deleted_files.push(change.path.clone()),
                _ => {}
            }
        }

        ctx.is_docs_only = changes.iter().all(Change::is_docs_file);
        ctx.is_config_only = changes.iter().all(Change::is_config_file);
        ctx.is_deps_only = changes.iter().all(Change::is_dependency_file);
        ctx
    }

    /// Single-change and whole-set shortcuts that bypass the staged pipeline.
    fn smart_fallback(&self, changes: &[Change], aggregate: &CommitContext) -> Option<CommitContext> {
        let shortcut = |action: Action, topic: String, item: String, purpose: &str| CommitContext {
            action,
            topic,
            item,
            purpose: purpose.to_string(),
            scope: String::new(),
            ..aggregate.clone()
        };
        let file_topic = |change: &Change| determine_topic(&change.path, &self.config.topic_mappings);

        if let [only] = changes {
            match only.kind {
                ChangeKind::Add => {
                    return Some(shortcut(
                        Action::Feat,
                        file_topic(only),
                        determine_item(&only.path),
                        "initial implementation",
                    ));
                }
                ChangeKind::Delete => {
                    return Some(shortcut(
                        Action::Chore,
                        file_topic(only),
                        determine_item(&only.path),
                        "remove unused file",
                    ));
                }
                _ if only.is_test_file() => {
                    return Some(shortcut(
                        Action::Test,
                        file_topic(only),
                        determine_item(&only.path),
                        "update tests",
                    ));
                }
                _ => {}
            }
        }

        let files = changes.len();
        let (added, removed) = (aggregate.total_added, aggregate.total_removed);
        if files > RESTRUCTURE_MIN_FILES
            && added > 0
            && removed > 0
            && (added + removed) as f64 / files as f64 > RESTRUCTURE_MIN_LINES_PER_FILE
        {
            return Some(shortcut(
                Action::Refactor,
                DEFAULT_TOPIC.to_string(),
                String::new(),
                "restructure project",
            ));
        }

        let ci_extension = aggregate
            .file_extensions
            .iter()
            .any(|ext| matches!(ext.as_str(), "env" | "yml" | "yaml" | "Dockerfile"));
        if ci_extension {
            return Some(shortcut(
                Action::Ci,
                "config".to_string(),
                String::new(),
                "update build configuration",
            ));
        }

        if aggregate.is_docs_only {
            return Some(shortcut(
                Action::Docs,
                String::new(),
                String::new(),
                "documentation",
            ));
        }

        if changes.iter().any(Change::is_root_manifest) {
            return Some(shortcut(
                Action::Chore,
                "deps".to_string(),
                String::new(),
                "update dependencies",
            ));
        }

        None
    }
}

/// Action suggested by the added/removed line ratio, if it is conclusive.
pub fn diff_stat_action(
    changes: &[Change],
    total_added: usize,
    total_removed: usize,
    threshold: f64,
) -> Option<Action> {
    let total = total_added + total_removed;
    if total == 0 {
        return None;
    }

    let deleted_ratio = total_removed as f64 / total as f64;
    let added_ratio = total_added as f64 / total as f64;

    if deleted_ratio > threshold + DOMINANCE_OFFSET {
        return Some(Action::Refactor);
    }

    if added_ratio > threshold + DOMINANCE_OFFSET
        && total_added > FEATURE_MIN_ADDED
        && changes
            .iter()
            .any(|c| c.kind == ChangeKind::Add && c.added > FEATURE_MIN_FILE_ADDED)
    {
        return Some(Action::Feat);
    }

    if deleted_ratio > BALANCED_RATIO && added_ratio > BALANCED_RATIO {
        return Some(Action::Refactor);
    }

    None
}

/// Action with the strictly highest positive keyword score.
pub fn keyword_action(
    changes: &[Change],
    keywords: &BTreeMap<Action, BTreeMap<String, u32>>,
) -> Option<Action> {
    if keywords.is_empty() {
        return None;
    }

    let haystack = changes
        .iter()
        .map(|c| c.diff.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();

    let mut best: Option<(Action, u64)> = None;
    let mut tied = false;
    for (action, weights) in keywords {
        let score: u64 = weights
            .iter()
            .filter(|(keyword, _)| !keyword.is_empty())
            .map(|(keyword, weight)| haystack.matches(keyword.to_lowercase().as_str()).count() as u64 * u64::from(*weight))
            .sum();
        if score == 0 {
            continue;
        }
        match best {
            Some((_, top)) if score < top => {}
            Some((_, top)) if score == top => tied = true,
            _ => {
                best = Some((*action, score));
                tied = false;
            }
        }
    }

    if tied { None } else { best.map(|(action, _)| action) }
}

/// Per-file rule applied to the first change when nothing else decided.
pub fn legacy_action(change: &Change) -> Action {
    if change.extension == "md" {
        return Action::Docs;
    }

    match change.kind {
        ChangeKind::Add if change.is_test_file() => Action::Test,
        ChangeKind::Add => Action::Feat,
        ChangeKind::Modify => {
            let diff = change.diff.to_lowercase();
            let mentions = |words: &[&str]| words.iter().any(|w| diff.contains(w));
            if mentions(&["security", "vulnerability"]) {
                Action::Security
            } else if mentions(&["optimize", "performance", "cache", "goroutine"]) {
                Action::Perf
            } else if adds_logging(&change.diff) {
                Action::Feat
            } else if mentions(&["fix", "bug", "issue", "resolve"]) {
                Action::Fix
            } else if is_style_change(&change.diff) {
                Action::Style
            } else if change.is_test_file() {
                Action::Test
            } else {
                Action::Refactor
            }
        }
        ChangeKind::Delete if structure::removes_function(&change.diff) => Action::Refactor,
        ChangeKind::Delete => Action::Chore,
        ChangeKind::Rename => Action::Refactor,
        ChangeKind::Copy => Action::Feat,
    }
}

/// Whether any added line writes a log entry or prints.
fn adds_logging(diff: &str) -> bool {
    diff.lines()
        .filter(|line| line.starts_with('+') && !line.starts_with("+++"))
        .any(|line| line.contains("log.") || line.contains("fmt.Print"))
}

/// Whether most changed lines are whitespace, comments, imports or lone brackets.
fn is_style_change(diff: &str) -> bool {
    let mut total = 0usize;
    let mut style = 0usize;
    for line in diff.lines() {
        let body = match line.strip_prefix('+').or_else(|| line.strip_prefix('-')) {
            Some(body) if !line.starts_with("+++") && !line.starts_with("---") => body.trim(),
            _ => continue,
        };
        total += 1;
        if body.is_empty()
            || body.starts_with("//")
            || body.contains("import")
            || matches!(body, "{" | "}" | "(" | ")")
        {
            style += 1;
        }
    }
    total > 0 && style as f64 / total as f64 > STYLE_RATIO
}

/// Every cross-file signature present, in priority order.
pub fn detect_multi_file_patterns(changes: &[Change]) -> Vec<MultiFilePattern> {
    let files = changes.len();
    if files == 0 {
        return Vec::new();
    }
    let share = |count: usize| count as f64 / files as f64;
    let count_kind = |kind: ChangeKind| changes.iter().filter(|c| c.kind == kind).count();

    let adds = count_kind(ChangeKind::Add);
    let modifies = count_kind(ChangeKind::Modify);
    let deletes = count_kind(ChangeKind::Delete);
    let tests = changes.iter().filter(|c| c.is_test_file()).count();
    let configs = changes.iter().filter(|c| c.is_config_file()).count();
    let api_files = changes
        .iter()
        .filter(|c| ["handler", "api", "route"].iter().any(|k| c.path.contains(k)))
        .count();
    let db_files = changes
        .iter()
        .filter(|c| {
            ["migration", "database", "schema"].iter().any(|k| c.path.contains(k))
                || c.path.split('/').any(|part| part == "db")
        })
        .count();
    let mentions_fix = changes.iter().any(|c| {
        let diff = c.diff.to_lowercase();
        diff.contains("fix") || diff.contains("bug")
    });

    let mut found = Vec::new();
    if adds >= 3 && share(adds) > 0.6 {
        found.push(MultiFilePattern::FeatureAddition);
    }
    if modifies >= 3 && share(modifies) > 0.6 && mentions_fix {
        found.push(MultiFilePattern::BugFixCascade);
    }
    if adds > 0 && modifies > 0 && deletes > 0 && files >= 4 {
        found.push(MultiFilePattern::RefactorSweep);
    }
    if share(tests) > 0.7 {
        found.push(MultiFilePattern::TestSuiteUpdate);
    }
    if share(configs) > 0.7 {
        found.push(MultiFilePattern::ConfigUpdate);
    }
    if api_files >= 3 {
        found.push(MultiFilePattern::ApiRedesign);
    }
    if db_files >= 2 {
        found.push(MultiFilePattern::DatabaseMigration);
    }
    found
}

fn extend_unique(target: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}
