//! The closed set of commit types a suggestion can carry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conventional commit types recognized by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Feat,
    Fix,
    Refactor,
    Chore,
    Test,
    Docs,
    Style,
    Perf,
    Ci,
    Build,
    Security,
    Config,
    Deploy,
    Revert,
    Wip,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 15] = [
        Action::Feat,
        Action::Fix,
        Action::Refactor,
        Action::Chore,
        Action::Test,
        Action::Docs,
        Action::Style,
        Action::Perf,
        Action::Ci,
        Action::Build,
        Action::Security,
        Action::Config,
        Action::Deploy,
        Action::Revert,
        Action::Wip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Feat => "feat",
            Action::Fix => "fix",
            Action::Refactor => "refactor",
            Action::Chore => "chore",
            Action::Test => "test",
            Action::Docs => "docs",
            Action::Style => "style",
            Action::Perf => "perf",
            Action::Ci => "ci",
            Action::Build => "build",
            Action::Security => "security",
            Action::Config => "config",
            Action::Deploy => "deploy",
            Action::Revert => "revert",
            Action::Wip => "wip",
        }
    }

    /// Primary corpus bucket for this action.
    ///
    /// `chore` is split between deletions (`D`) and everything else (`MISC`),
    /// so callers pass whether the change set removed files.
    pub fn bucket_key(&self, has_deletions: bool) -> &'static str {
        match self {
            Action::Feat => "A",
            Action::Fix => "M",
            Action::Refactor => "R",
            Action::Chore if has_deletions => "D",
            Action::Chore => "MISC",
            Action::Docs => "DOC",
            Action::Security => "SECURITY",
            Action::Style => "STYLE",
            Action::Test => "TEST",
            Action::Perf => "PERF",
            Action::Ci => "CI",
            Action::Build => "BUILD",
            Action::Config => "CONFIG",
            Action::Deploy => "DEPLOY",
            Action::Revert => "REVERT",
            Action::Wip => "WIP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == lower)
            .ok_or_else(|| format!("Unknown commit type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_action() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("FEAT".parse::<Action>(), Ok(Action::Feat));
        assert_eq!("Ci".parse::<Action>(), Ok(Action::Ci));
        assert!("feature".parse::<Action>().is_err());
    }

    #[test]
    fn test_chore_bucket_depends_on_deletions() {
        assert_eq!(Action::Chore.bucket_key(true), "D");
        assert_eq!(Action::Chore.bucket_key(false), "MISC");
        assert_eq!(Action::Feat.bucket_key(true), "A");
        assert_eq!(Action::Docs.bucket_key(false), "DOC");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Action::Wip).unwrap();
        assert_eq!(json, "\"wip\"");
        let parsed: Action = serde_json::from_str("\"security\"").unwrap();
        assert_eq!(parsed, Action::Security);
    }
}
