//! Sample configuration written by `gitmit init`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::{ConfigFile, DEFAULT_DIFF_STAT_THRESHOLD, KeywordWeights};
use crate::analysis::Action;

/// Project ecosystem, detected from marker files in the repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Go,
    Rust,
    NodeJs,
    Python,
    Generic,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Go => "go",
            ProjectType::Rust => "rust",
            ProjectType::NodeJs => "nodejs",
            ProjectType::Python => "python",
            ProjectType::Generic => "generic",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the project type from files present in `root`.
pub fn detect_project_type(root: &Path) -> ProjectType {
    let has = |name: &str| root.join(name).exists();
    if has("go.mod") {
        ProjectType::Go
    } else if has("Cargo.toml") {
        ProjectType::Rust
    } else if has("package.json") {
        ProjectType::NodeJs
    } else if has("requirements.txt") || has("pyproject.toml") || has("setup.py") {
        ProjectType::Python
    } else {
        ProjectType::Generic
    }
}

/// A starter config with keyword weights tuned for `project_type`.
pub fn sample(project_type: ProjectType) -> ConfigFile {
    let topic_mappings = pairs(&[
        ("internal/api", "api"),
        ("internal/database", "db"),
        ("internal/auth", "auth"),
        ("internal/config", "config"),
        ("cmd", "cli"),
        ("docs", "docs"),
    ]);

    let keyword_mappings = pairs(&[
        ("authentication", "auth"),
        ("database", "db"),
        ("configuration", "config"),
    ]);

    let mut keywords = KeywordWeights::new();
    add_weights(&mut keywords, Action::Feat, &[("func", 3), ("class", 2), ("new", 2), ("add", 2), ("implement", 2)]);
    add_weights(
        &mut keywords,
        Action::Fix,
        &[
            ("bug", 3),
            ("fix", 3),
            ("error", 2),
            ("issue", 2),
            ("resolve", 2),
            ("if err", 2),
            ("try", 1),
            ("catch", 1),
        ],
    );
    add_weights(
        &mut keywords,
        Action::Refactor,
        &[("refactor", 3), ("restructure", 2), ("rename", 2), ("move", 2)],
    );
    add_weights(&mut keywords, Action::Test, &[("test", 3), ("assert", 2), ("expect", 2), ("mock", 2)]);
    add_weights(
        &mut keywords,
        Action::Docs,
        &[("docs", 3), ("documentation", 3), ("//", 1), ("comment", 2)],
    );

    match project_type {
        ProjectType::Go => {
            add_weights(&mut keywords, Action::Feat, &[("type", 2), ("struct", 2), ("interface", 2)]);
            add_weights(&mut keywords, Action::Fix, &[("if err != nil", 3), ("panic", 2)]);
        }
        ProjectType::Rust => {
            add_weights(&mut keywords, Action::Feat, &[("pub fn", 3), ("impl", 2), ("struct", 2), ("trait", 2)]);
            add_weights(&mut keywords, Action::Fix, &[("map_err", 2), ("panic", 2), ("unwrap", 1)]);
        }
        ProjectType::NodeJs => {
            add_weights(&mut keywords, Action::Feat, &[("export", 2), ("const", 1)]);
            add_weights(&mut keywords, Action::Fix, &[("throw", 2)]);
        }
        ProjectType::Python => {
            add_weights(&mut keywords, Action::Feat, &[("def", 3), ("async def", 3)]);
            add_weights(&mut keywords, Action::Fix, &[("except", 2), ("raise", 2)]);
        }
        ProjectType::Generic => {}
    }

    ConfigFile {
        topic_mappings: Some(topic_mappings),
        keyword_mappings: Some(keyword_mappings),
        keywords: Some(keywords),
        diff_stat_threshold: Some(DEFAULT_DIFF_STAT_THRESHOLD),
        project_type: Some(project_type.to_string()),
    }
}

fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn add_weights(keywords: &mut KeywordWeights, action: Action, weights: &[(&str, u32)]) {
    let entry = keywords.entry(action).or_default();
    for (keyword, weight) in weights {
        entry.insert(keyword.to_string(), *weight);
    }
}
