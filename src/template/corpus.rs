//! Template corpus: action group -> topic -> templates, validated at load time.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::analysis::CommitContext;
use crate::error::{TemplateResolutionError, TemplateValidationError};

/// The built-in corpus, compiled into the binary.
const EMBEDDED_TEMPLATES: &str = include_str!("templates.json");

/// Placeholders a template may use.
pub const PLACEHOLDERS: [&str; 5] = ["topic", "item", "purpose", "source", "target"];

/// Groups every corpus must define.
const REQUIRED_GROUPS: [&str; 3] = ["A", "M", "D"];

/// Groups tried in order when the action's own group is missing.
const FALLBACK_GROUPS: [&str; 6] = ["DOC", "A", "M", "R", "D", "MISC"];

/// Topic key every group must provide.
pub const DEFAULT_BUCKET: &str = "_default";

type Groups = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A validated template corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    groups: Groups,
}

/// The templates chosen for a context, with the keys that selected them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket<'a> {
    pub group: &'a str,
    pub topic: &'a str,
    pub templates: &'a [String],
}

impl Corpus {
    /// The corpus shipped with gitmit.
    pub fn embedded() -> Result<Self, TemplateValidationError> {
        Self::from_json(EMBEDDED_TEMPLATES)
    }

    /// Load and validate a corpus file.
    pub fn from_path(path: &Path) -> Result<Self, TemplateValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateValidationError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, TemplateValidationError> {
        let groups: Groups = serde_json::from_str(json).map_err(TemplateValidationError::ParseFailed)?;
        Self::from_groups(groups)
    }

    /// Validate an in-memory corpus.
    pub fn from_groups(groups: Groups) -> Result<Self, TemplateValidationError> {
        for required in REQUIRED_GROUPS {
            if !groups.contains_key(required) {
                return Err(TemplateValidationError::MissingActionGroup(required.to_string()));
            }
        }

        for (group, topics) in &groups {
            if topics.get(DEFAULT_BUCKET).is_none_or(|templates| templates.is_empty()) {
                return Err(TemplateValidationError::MissingDefault(group.clone()));
            }
            for (topic, templates) in topics {
                if templates.is_empty() {
                    return Err(TemplateValidationError::EmptyBucket {
                        group: group.clone(),
                        topic: topic.clone(),
                    });
                }
                for template in templates {
                    validate_template(template)?;
                }
            }
        }

        Ok(Self { groups })
    }

    /// Pick the bucket for a context.
    ///
    /// The action's group, else the first present fallback group; then an
    /// exact topic, else the first key (sorted) sharing a substring with the
    /// topic, else `_default`.
    pub fn resolve(&self, ctx: &CommitContext) -> Result<Bucket<'_>, TemplateResolutionError> {
        let not_found = || TemplateResolutionError {
            action: ctx.action.to_string(),
            topic: ctx.topic.clone(),
        };

        let primary = ctx.action.bucket_key(ctx.has_deletions());
        let (group, topics) = self
            .groups
            .get_key_value(primary)
            .or_else(|| {
                FALLBACK_GROUPS
                    .iter()
                    .find_map(|fallback| self.groups.get_key_value(*fallback))
            })
            .ok_or_else(not_found)?;

        if group != primary {
            debug!(primary, fallback = %group, "Template group missing, using fallback");
        }

        let topic = ctx.topic.as_str();
        let (key, templates) = topics
            .get_key_value(topic)
            .filter(|(key, _)| key.as_str() != DEFAULT_BUCKET)
            .or_else(|| {
                if topic.is_empty() {
                    return None;
                }
                topics.iter().find(|(key, _)| {
                    key.as_str() != DEFAULT_BUCKET
                        && !key.is_empty()
                        && (key.contains(topic) || topic.contains(key.as_str()))
                })
            })
            .or_else(|| topics.get_key_value(DEFAULT_BUCKET))
            .ok_or_else(not_found)?;

        Ok(Bucket {
            group,
            topic: key,
            templates,
        })
    }

    /// Names of all action groups.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

/// Check brace balance and placeholder vocabulary of one template.
fn validate_template(template: &str) -> Result<(), TemplateValidationError> {
    let unbalanced = || TemplateValidationError::UnbalancedBraces {
        template: template.to_string(),
    };

    let mut open: Option<usize> = None;
    for (idx, c) in template.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(idx),
            ('{', Some(_)) => return Err(unbalanced()),
            ('}', None) => return Err(unbalanced()),
            ('}', Some(start)) => {
                let name = &template[start + 1..idx];
                if !PLACEHOLDERS.contains(&name) {
                    return Err(TemplateValidationError::UnknownPlaceholder {
                        placeholder: name.to_string(),
                        template: template.to_string(),
                    });
                }
                open = None;
            }
            _ => {}
        }
    }

    match open {
        Some(_) => Err(unbalanced()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Action;

    fn corpus(json: &str) -> Corpus {
        Corpus::from_json(json).expect("corpus should validate")
    }

    const MINIMAL: &str = r#"{
        "A": {"_default": ["feat({topic}): add {item}"], "api": ["feat({topic}): add endpoint"]},
        "M": {"_default": ["fix({topic}): resolve issue"]},
        "D": {"_default": ["chore({topic}): remove {item}"]},
        "DOC": {"_default": ["docs: update documentation"]}
    }"#;

    #[test]
    fn test_embedded_corpus_is_valid() {
        let corpus = Corpus::embedded().unwrap();
        for action in Action::ALL {
            for deletions in [false, true] {
                let key = action.bucket_key(deletions);
                assert!(corpus.groups().any(|g| g == key), "missing group {key}");
            }
        }
    }

    #[test]
    fn test_missing_required_group() {
        let err = Corpus::from_json(r#"{"A": {"_default": ["x"]}, "M": {"_default": ["y"]}}"#).unwrap_err();
        assert!(matches!(err, TemplateValidationError::MissingActionGroup(g) if g == "D"));
    }

    #[test]
    fn test_missing_default_bucket() {
        let json = r#"{"A": {"api": ["x"]}, "M": {"_default": ["y"]}, "D": {"_default": ["z"]}}"#;
        let err = Corpus::from_json(json).unwrap_err();
        assert!(matches!(err, TemplateValidationError::MissingDefault(g) if g == "A"));
    }

    #[test]
    fn test_empty_bucket() {
        let json = r#"{"A": {"_default": ["x"], "api": []}, "M": {"_default": ["y"]}, "D": {"_default": ["z"]}}"#;
        let err = Corpus::from_json(json).unwrap_err();
        assert!(matches!(err, TemplateValidationError::EmptyBucket { topic, .. } if topic == "api"));
    }

    #[test]
    fn test_template_brace_validation() {
        assert!(validate_template("feat({topic}): add {item}").is_ok());
        assert!(validate_template("no placeholders").is_ok());
        assert!(matches!(
            validate_template("feat({topic): x"),
            Err(TemplateValidationError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            validate_template("feat(topic}): x"),
            Err(TemplateValidationError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            validate_template("feat({{topic}}): x"),
            Err(TemplateValidationError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            validate_template("feat({scope}): x"),
            Err(TemplateValidationError::UnknownPlaceholder { placeholder, .. }) if placeholder == "scope"
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Corpus::from_json("[1, 2"),
            Err(TemplateValidationError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_resolve_exact_topic() {
        let corpus = corpus(MINIMAL);
        let ctx = CommitContext {
            action: Action::Feat,
            topic: "api".to_string(),
            ..Default::default()
        };
        let bucket = corpus.resolve(&ctx).unwrap();
        assert_eq!((bucket.group, bucket.topic), ("A", "api"));
    }

    #[test]
    fn test_resolve_substring_topic() {
        let corpus = corpus(MINIMAL);
        let ctx = CommitContext {
            action: Action::Feat,
            topic: "apiv2".to_string(),
            ..Default::default()
        };
        assert_eq!(corpus.resolve(&ctx).unwrap().topic, "api");
    }

    #[test]
    fn test_resolve_default_topic() {
        let corpus = corpus(MINIMAL);
        let ctx = CommitContext {
            action: Action::Fix,
            topic: "parser".to_string(),
            ..Default::default()
        };
        let bucket = corpus.resolve(&ctx).unwrap();
        assert_eq!((bucket.group, bucket.topic), ("M", "_default"));
    }

    #[test]
    fn test_resolve_falls_back_to_doc_group() {
        let corpus = corpus(MINIMAL);
        let ctx = CommitContext {
            action: Action::Perf,
            ..Default::default()
        };
        assert_eq!(corpus.resolve(&ctx).unwrap().group, "DOC");
    }

    #[test]
    fn test_chore_bucket_uses_deletions() {
        let corpus = corpus(MINIMAL);
        let mut ctx = CommitContext {
            action: Action::Chore,
            ..Default::default()
        };
        // No MISC group here, so the fallback order applies.
        assert_eq!(corpus.resolve(&ctx).unwrap().group, "DOC");

        ctx.deleted_files.push("old.go".to_string());
        assert_eq!(corpus.resolve(&ctx).unwrap().group, "D");
    }
}
