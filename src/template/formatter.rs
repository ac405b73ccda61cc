//! Placeholder substitution and subject-line normalization.

use crate::analysis::CommitContext;

/// Conventional subject-line limit, including any truncation marker.
pub const MAX_SUBJECT_LEN: usize = 72;

/// Appended to subjects of major changes when enabled.
pub const MAJOR_SUFFIX: &str = " (major change)";

const ELLIPSIS: &str = "...";

/// Renders templates into commit subjects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter {
    major_suffix: bool,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark major changes with a trailing ` (major change)`.
    pub fn with_major_suffix(mut self, enabled: bool) -> Self {
        self.major_suffix = enabled;
        self
    }

    /// Render `template` for `ctx`, replacing the topic in parentheses with
    /// `scope` when one is given.
    pub fn format(&self, template: &str, ctx: &CommitContext, scope: &str) -> String {
        let (source, target) = ctx
            .file_move()
            .map(|m| (m.source.as_str(), m.target.as_str()))
            .unwrap_or(("", ""));

        let mut message = template
            .replace("{topic}", &ctx.topic)
            .replace("{item}", ctx.display_item())
            .replace("{purpose}", &ctx.purpose)
            .replace("{source}", source)
            .replace("{target}", target);

        if !scope.is_empty() {
            message = message.replace(&format!("({})", ctx.topic), &format!("({})", scope));
        }

        let suffix = self.major_suffix && ctx.is_major;
        if suffix {
            if let Some(stripped) = message.strip_suffix(MAJOR_SUFFIX) {
                message = stripped.to_string();
            }
            let body = normalize_with_limit(&message, MAX_SUBJECT_LEN - MAJOR_SUFFIX.len());
            format!("{body}{MAJOR_SUFFIX}")
        } else {
            normalize(&message)
        }
    }
}

/// Clean up a rendered subject. Idempotent.
///
/// Empty scopes are dropped, whitespace collapsed, immediately repeated words
/// removed, and the result cut at a word boundary to fit the subject limit.
pub fn normalize(message: &str) -> String {
    normalize_with_limit(message, MAX_SUBJECT_LEN)
}

fn normalize_with_limit(message: &str, limit: usize) -> String {
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed
        .replace("(  ):", ":")
        .replace("( ):", ":")
        .replace("():", ":");

    let mut words: Vec<&str> = Vec::new();
    for word in cleaned.split_whitespace() {
        if words.last().is_some_and(|prev| prev.eq_ignore_ascii_case(word)) {
            continue;
        }
        words.push(word);
    }

    truncate(&words.join(" "), limit)
}

/// Cut at the last space so the result plus `...` fits in `limit` characters.
fn truncate(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let budget = limit.saturating_sub(ELLIPSIS.len());
    let head: String = message.chars().take(budget).collect();
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    format!("{}{ELLIPSIS}", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FileMove;

    fn ctx() -> CommitContext {
        CommitContext {
            topic: "parser".to_string(),
            item: "git".to_string(),
            purpose: "commit parsing".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_substitutes_placeholders() {
        let formatter = MessageFormatter::new();
        assert_eq!(
            formatter.format("feat({topic}): add {item} for {purpose}", &ctx(), ""),
            "feat(parser): add git for commit parsing"
        );
    }

    #[test]
    fn test_item_prefers_detected_function() {
        let mut ctx = ctx();
        ctx.detected_functions.push("ParseCommitHistory".to_string());
        assert_eq!(
            MessageFormatter::new().format("feat({topic}): add {item}", &ctx, ""),
            "feat(parser): add ParseCommitHistory"
        );
    }

    #[test]
    fn test_scope_replaces_topic() {
        let formatter = MessageFormatter::new();
        assert_eq!(
            formatter.format("fix({topic}): resolve issue", &ctx(), "handler,service"),
            "fix(handler,service): resolve issue"
        );
    }

    #[test]
    fn test_source_and_target() {
        let mut ctx = ctx();
        ctx.copied_files.push(FileMove {
            source: "a.go".to_string(),
            target: "b.go".to_string(),
        });
        ctx.renamed_files.push(FileMove {
            source: "old.go".to_string(),
            target: "new.go".to_string(),
        });
        assert_eq!(
            MessageFormatter::new().format("refactor: rename {source} to {target}", &ctx, ""),
            "refactor: rename old.go to new.go"
        );
    }

    #[test]
    fn test_empty_scope_artifacts_removed() {
        assert_eq!(normalize("feat(): add thing"), "feat: add thing");
        assert_eq!(normalize("feat( ): add thing"), "feat: add thing");
        assert_eq!(normalize("feat(  ): add thing"), "feat: add thing");

        let empty_topic = CommitContext {
            topic: String::new(),
            ..ctx()
        };
        assert_eq!(
            MessageFormatter::new().format("docs({topic}): update docs", &empty_topic, ""),
            "docs: update docs"
        );
    }

    #[test]
    fn test_collapses_whitespace_and_repeated_words() {
        assert_eq!(normalize("  fix:   handle   error  "), "fix: handle error");
        assert_eq!(normalize("chore(deps): update update dependencies"), "chore(deps): update dependencies");
        assert_eq!(normalize("fix: the The bug"), "fix: the bug");
    }

    #[test]
    fn test_truncates_at_word_boundary() {
        let words: Vec<String> = (0..20).map(|i| format!("word{i}")).collect();
        let long = format!("feat(core): {}", words.join(" "));
        let result = normalize(&long);
        assert!(result.chars().count() <= MAX_SUBJECT_LEN);

        let kept = result.strip_suffix("...").unwrap();
        assert!(long.starts_with(kept));
        assert!(long[kept.len()..].starts_with(' '));
    }

    #[test]
    fn test_truncates_without_spaces() {
        let long = "x".repeat(100);
        let result = normalize(&long);
        assert_eq!(result.chars().count(), MAX_SUBJECT_LEN);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let long = format!("refactor(core): {}", "restructure module layout ".repeat(6));
        let unbroken = "y".repeat(80);
        let inputs: [&str; 5] = [
            "feat(   ): add  thing",
            "fix(api): fix fix the the handler",
            &long,
            &unbroken,
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_format_output_is_normalized() {
        let formatter = MessageFormatter::new().with_major_suffix(true);
        let mut ctx = ctx();
        ctx.is_major = true;
        ctx.purpose = "a very long purpose phrase that keeps going well past the limit".to_string();
        let message = formatter.format("refactor({topic}): restructure {item} for {purpose}", &ctx, "");
        assert!(message.ends_with(MAJOR_SUFFIX));
        assert!(message.chars().count() <= MAX_SUBJECT_LEN);
        assert_eq!(normalize(&message), message);
        assert_eq!(formatter.format(&message, &ctx, ""), message);
    }

    #[test]
    fn test_major_suffix_only_when_enabled() {
        let mut ctx = ctx();
        ctx.is_major = true;
        assert_eq!(
            MessageFormatter::new().format("refactor({topic}): restructure", &ctx, ""),
            "refactor(parser): restructure"
        );
        assert_eq!(
            MessageFormatter::new()
                .with_major_suffix(true)
                .format("refactor({topic}): restructure", &ctx, ""),
            "refactor(parser): restructure (major change)"
        );
    }
}
