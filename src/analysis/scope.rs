//! Topic, item and scope derivation from file paths.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::change::file_stem;
use crate::analysis::context::DEFAULT_TOPIC;

/// Directories whose child names the module better than they do.
const MODULE_PARENTS: &[&str] = &["internal", "pkg"];

/// Container directories skipped when looking for a shared top-level module.
const GENERIC_CONTAINERS: &[&str] = &["internal", "pkg", "src", "lib", "app"];

/// Max distinct topics that are listed in full rather than collapsed.
const MAX_LISTED_TOPICS: usize = 3;

/// Derive the topic for one path.
///
/// Configured mappings win, longest matching fragment first. Otherwise the
/// directory after `internal`/`pkg`, else the deepest directory that is not
/// `src`, else `core`.
pub fn determine_topic(path: &str, topic_mappings: &BTreeMap<String, String>) -> String {
    let mut best: Option<(&str, &str)> = None;
    for (fragment, topic) in topic_mappings {
        if fragment.is_empty() || !path.contains(fragment.as_str()) {
            continue;
        }
        if best.is_none_or(|(current, _)| fragment.len() > current.len()) {
            best = Some((fragment, topic));
        }
    }
    if let Some((_, topic)) = best {
        return topic.to_string();
    }

    let dirs = directories(path);

    for (i, dir) in dirs.iter().enumerate() {
        if MODULE_PARENTS.contains(dir) {
            if let Some(next) = dirs.get(i + 1) {
                return next.to_string();
            }
        }
    }

    dirs.iter()
        .rev()
        .find(|dir| **dir != "." && **dir != "src")
        .map(|dir| dir.to_string())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string())
}

/// The item for one path: its file name without the extension.
pub fn determine_item(path: &str) -> String {
    file_stem(path).to_string()
}

/// Combine per-file topics into a single scope for a multi-file change.
pub fn resolve_scope(paths: &[&str], topics: &[String]) -> String {
    let distinct: BTreeSet<&str> = topics.iter().map(String::as_str).collect();
    if distinct.len() == 1 {
        if let Some(only) = distinct.first() {
            return only.to_string();
        }
    }

    if let Some(shared) = shared_top_level(paths) {
        return shared;
    }

    if !distinct.is_empty() && distinct.len() <= MAX_LISTED_TOPICS {
        return distinct.into_iter().collect::<Vec<_>>().join(",");
    }

    most_frequent(topics).unwrap_or_else(|| DEFAULT_TOPIC.to_string())
}

/// First non-generic directory shared by every path, if there is one.
fn shared_top_level(paths: &[&str]) -> Option<String> {
    let mut shared: Option<&str> = None;
    for path in paths {
        let top = directories(path)
            .into_iter()
            .find(|dir| !GENERIC_CONTAINERS.contains(dir) && *dir != ".")?;
        match shared {
            None => shared = Some(top),
            Some(existing) if existing == top => {}
            Some(_) => return None,
        }
    }
    shared.map(str::to_string)
}

/// Most common topic; ties go to the alphabetically first.
fn most_frequent(topics: &[String]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for topic in topics {
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (topic, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((topic, count));
        }
    }
    best.map(|(topic, _)| topic.to_string())
}

/// Directory components of a path, excluding the file name.
fn directories(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    parts.pop();
    parts
}
