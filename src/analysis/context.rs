//! The structured commit-intent record produced by the analyzer.

use std::collections::BTreeSet;

use crate::analysis::action::Action;
use crate::analysis::patterns::Pattern;

/// Topic used when nothing more specific can be derived.
pub const DEFAULT_TOPIC: &str = "core";

/// Purpose used when no keyword matched.
pub const DEFAULT_PURPOSE: &str = "general update";

/// A source/target pair for a rename or copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMove {
    pub source: String,
    pub target: String,
}

/// Everything the template engine needs to know about a staged change set.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitContext {
    pub action: Action,
    pub topic: String,
    pub item: String,
    pub purpose: String,
    /// Combined topic for multi-module changes; empty when not derived.
    pub scope: String,
    pub is_major: bool,
    pub total_added: usize,
    pub total_removed: usize,
    pub file_extensions: BTreeSet<String>,
    pub detected_functions: Vec<String>,
    pub detected_structs: Vec<String>,
    pub detected_methods: Vec<String>,
    pub change_patterns: BTreeSet<Pattern>,
    pub is_docs_only: bool,
    pub is_config_only: bool,
    pub is_deps_only: bool,
    pub renamed_files: Vec<FileMove>,
    pub copied_files: Vec<FileMove>,
    pub deleted_files: Vec<String>,
    pub multi_file_patterns: Vec<String>,
}

impl Default for CommitContext {
    fn default() -> Self {
        Self {
            action: Action::Chore,
            topic: DEFAULT_TOPIC.to_string(),
            item: String::new(),
            purpose: DEFAULT_PURPOSE.to_string(),
            scope: String::new(),
            is_major: false,
            total_added: 0,
            total_removed: 0,
            file_extensions: BTreeSet::new(),
            detected_functions: Vec::new(),
            detected_structs: Vec::new(),
            detected_methods: Vec::new(),
            change_patterns: BTreeSet::new(),
            is_docs_only: false,
            is_config_only: false,
            is_deps_only: false,
            renamed_files: Vec::new(),
            copied_files: Vec::new(),
            deleted_files: Vec::new(),
            multi_file_patterns: Vec::new(),
        }
    }
}

impl CommitContext {
    /// Value substituted for `{item}`: the first detected function, struct or
    /// method, falling back to the item derived from the file name.
    pub fn display_item(&self) -> &str {
        self.detected_functions
            .first()
            .or_else(|| self.detected_structs.first())
            .or_else(|| self.detected_methods.first())
            .map(String::as_str)
            .unwrap_or(&self.item)
    }

    /// Whether `{item}` has anything to substitute.
    pub fn has_item(&self) -> bool {
        !self.display_item().is_empty()
    }

    pub fn has_structures(&self) -> bool {
        !self.detected_functions.is_empty()
            || !self.detected_structs.is_empty()
            || !self.detected_methods.is_empty()
    }

    /// First rename, else first copy.
    pub fn file_move(&self) -> Option<&FileMove> {
        self.renamed_files.first().or_else(|| self.copied_files.first())
    }

    pub fn has_deletions(&self) -> bool {
        !self.deleted_files.is_empty()
    }

    pub fn has_specific_purpose(&self) -> bool {
        !self.purpose.is_empty() && self.purpose != DEFAULT_PURPOSE
    }

    /// Topic is set and not the generic fallback.
    pub fn has_meaningful_topic(&self) -> bool {
        !self.topic.is_empty() && self.topic != DEFAULT_TOPIC
    }

    /// Scope if derived, else a meaningful topic, else nothing.
    pub fn project_scope(&self) -> Option<&str> {
        if !self.scope.is_empty() {
            Some(&self.scope)
        } else if self.has_meaningful_topic() {
            Some(&self.topic)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_uses_fallback_topic_and_purpose() {
        let ctx = CommitContext::default();
        assert_eq!(ctx.topic, "core");
        assert_eq!(ctx.purpose, "general update");
        assert!(!ctx.has_specific_purpose());
        assert!(!ctx.has_meaningful_topic());
        assert_eq!(ctx.project_scope(), None);
    }

    #[test]
    fn test_display_item_prefers_functions_then_structs_then_methods() {
        let mut ctx = CommitContext {
            item: "git".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.display_item(), "git");

        ctx.detected_methods.push("Next".to_string());
        assert_eq!(ctx.display_item(), "Next");

        ctx.detected_structs.push("Parser".to_string());
        assert_eq!(ctx.display_item(), "Parser");

        ctx.detected_functions.push("Parse".to_string());
        assert_eq!(ctx.display_item(), "Parse");
    }

    #[test]
    fn test_has_item_without_anything() {
        let ctx = CommitContext::default();
        assert!(!ctx.has_item());
        assert!(!ctx.has_structures());
    }

    #[test]
    fn test_file_move_prefers_renames() {
        let mut ctx = CommitContext::default();
        assert!(ctx.file_move().is_none());

        ctx.copied_files.push(FileMove {
            source: "a.rs".to_string(),
            target: "b.rs".to_string(),
        });
        assert_eq!(ctx.file_move().map(|m| m.target.as_str()), Some("b.rs"));

        ctx.renamed_files.push(FileMove {
            source: "old.rs".to_string(),
            target: "new.rs".to_string(),
        });
        assert_eq!(ctx.file_move().map(|m| m.source.as_str()), Some("old.rs"));
    }

    #[test]
    fn test_project_scope_prefers_scope() {
        let ctx = CommitContext {
            topic: "parser".to_string(),
            scope: "handler,service".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.project_scope(), Some("handler,service"));

        let ctx = CommitContext {
            topic: "parser".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.project_scope(), Some("parser"));
    }
}
