//! Additive scoring of templates against a commit context.

use rand_core::{OsRng, RngCore};

use crate::analysis::CommitContext;

/// Source of uniform randomness for jitter and tie-breaks.
pub trait RandomSource {
    /// A value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// An index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// Operating-system entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_f64(&mut self) -> f64 {
        // 53 random bits fill an f64 mantissa exactly.
        (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Always returns the same value; for reproducible output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRandom(pub f64);

impl RandomSource for ConstantRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Which caller is scoring; the ranked list weighs `{purpose}` less to keep
/// the spread flatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    Select,
    Ranked,
}

const BASE: f64 = 1.0;
const ITEM_BONUS: f64 = 3.0;
const MISSING_VALUE_PENALTY: f64 = -50.0;
const PURPOSE_SELECT_BONUS: f64 = 2.5;
const PURPOSE_RANKED_BONUS: f64 = 1.0;
const MOVE_BONUS: f64 = 3.0;
const TOPIC_BONUS: f64 = 1.5;
const PATTERN_BONUS: f64 = 2.0;
const STRUCTURE_BONUS: f64 = 1.5;
const MAJOR_BONUS: f64 = 2.0;
const SPECIAL_CASE_BONUS: f64 = 2.5;
const GENERIC_PENALTY: f64 = -1.0;
const SCOPE_MATCH_BONUS: f64 = 1.5;
const MEANINGFUL_TOPIC_BONUS: f64 = 1.0;

/// Upper bound (exclusive) of the random jitter added to every score.
pub const JITTER_MAX: f64 = 0.5;

/// Template vocabulary rewarded per file extension, with its bonus.
const EXTENSION_HINTS: &[(&[&str], &[&str], f64)] = &[
    (&["go"], &["func", "method", "type"], 0.5),
    (&["json", "yaml", "yml"], &["config", "setting", "format"], 1.0),
    (&["md"], &["docs", "document"], 1.5),
    (&["sql"], &["database", "query"], 1.0),
];

const MAJOR_WORDS: &[&str] = &["restructure", "refactor", "major"];

/// Whether `template` uses a placeholder the context has no value for.
///
/// Such templates carry the missing-value penalty and are only offered when a
/// bucket has nothing else.
pub fn missing_value(template: &str, ctx: &CommitContext) -> bool {
    (template.contains("{item}") && !ctx.has_item())
        || ((template.contains("{source}") || template.contains("{target}")) && ctx.file_move().is_none())
}

/// Deterministic part of a template's score.
pub fn base_score(template: &str, ctx: &CommitContext, mode: ScoreMode) -> f64 {
    let text = template.to_lowercase();
    let has = |word: &str| text.contains(word);
    let mut score = BASE;

    if template.contains("{item}") {
        score += if ctx.has_item() { ITEM_BONUS } else { MISSING_VALUE_PENALTY };
    }

    if template.contains("{purpose}") && ctx.has_specific_purpose() {
        score += match mode {
            ScoreMode::Select => PURPOSE_SELECT_BONUS,
            ScoreMode::Ranked => PURPOSE_RANKED_BONUS,
        };
    }

    let has_move = ctx.file_move().is_some();
    for placeholder in ["{source}", "{target}"] {
        if template.contains(placeholder) {
            score += if has_move { MOVE_BONUS } else { MISSING_VALUE_PENALTY };
        }
    }

    let has_topic_placeholder = template.contains("{topic}");
    if has_topic_placeholder && !ctx.topic.is_empty() {
        score += TOPIC_BONUS;
    }

    for pattern in &ctx.change_patterns {
        if pattern.template_keywords().iter().any(|k| has(k)) {
            score += PATTERN_BONUS;
        }
    }

    for ext in &ctx.file_extensions {
        for (extensions, words, bonus) in EXTENSION_HINTS {
            if extensions.contains(&ext.as_str()) && words.iter().any(|w| has(w)) {
                score += bonus;
            }
        }
    }

    if !ctx.detected_functions.is_empty() && has("func") {
        score += STRUCTURE_BONUS;
    }
    if !ctx.detected_structs.is_empty() && has("type") {
        score += STRUCTURE_BONUS;
    }
    if !ctx.detected_methods.is_empty() && has("method") {
        score += STRUCTURE_BONUS;
    }

    if ctx.is_major && MAJOR_WORDS.iter().any(|w| has(w)) {
        score += MAJOR_BONUS;
    }

    if ctx.is_docs_only && has("doc") {
        score += SPECIAL_CASE_BONUS;
    }
    if ctx.is_config_only && has("config") {
        score += SPECIAL_CASE_BONUS;
    }
    if ctx.is_deps_only && has("dep") {
        score += SPECIAL_CASE_BONUS;
    }

    if (has("general") || has("update")) && (!ctx.change_patterns.is_empty() || ctx.has_specific_purpose()) {
        score += GENERIC_PENALTY;
    }

    if let Some(scope) = ctx.project_scope() {
        if template.contains(scope) {
            score += SCOPE_MATCH_BONUS;
        }
    }
    if has_topic_placeholder && ctx.has_meaningful_topic() {
        score += MEANINGFUL_TOPIC_BONUS;
    }

    score
}

/// Full score: the deterministic part plus jitter in `[0, JITTER_MAX)`.
pub fn score(template: &str, ctx: &CommitContext, mode: ScoreMode, random: &mut dyn RandomSource) -> f64 {
    base_score(template, ctx, mode) + random.next_f64() * JITTER_MAX
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileMove, Pattern};

    fn ctx_with_item() -> CommitContext {
        CommitContext {
            topic: "parser".to_string(),
            item: "git".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_item_penalty_is_near_disqualifying() {
        let ctx = CommitContext::default();
        let with_item = base_score("feat: add {item}", &ctx, ScoreMode::Select);
        let without = base_score("feat: add ", &ctx, ScoreMode::Select);
        assert!(without - with_item >= 50.0);
    }

    #[test]
    fn test_missing_value() {
        let plain = CommitContext::default();
        assert!(missing_value("docs: document {item}", &plain));
        assert!(missing_value("refactor: move {source}", &plain));
        assert!(!missing_value("docs: update documentation", &plain));
        assert!(!missing_value("feat: add {item}", &ctx_with_item()));

        let mut moved = CommitContext::default();
        moved.renamed_files.push(FileMove {
            source: "a.rs".to_string(),
            target: "b.rs".to_string(),
        });
        assert!(!missing_value("refactor: move {source} to {target}", &moved));
    }

    #[test]
    fn test_item_bonus_with_detected_structure() {
        let ctx = CommitContext {
            detected_structs: vec!["Corpus".to_string()],
            ..Default::default()
        };
        let with_item = base_score("feat: add {item}", &ctx, ScoreMode::Select);
        let without = base_score("feat: add ", &ctx, ScoreMode::Select);
        assert_eq!(with_item - without, ITEM_BONUS);
    }

    #[test]
    fn test_purpose_bonus_depends_on_mode() {
        let ctx = CommitContext {
            purpose: "caching".to_string(),
            ..Default::default()
        };
        let select = base_score("perf: speed up {purpose}", &ctx, ScoreMode::Select);
        let ranked = base_score("perf: speed up {purpose}", &ctx, ScoreMode::Ranked);
        assert_eq!(select - ranked, PURPOSE_SELECT_BONUS - PURPOSE_RANKED_BONUS);

        let generic = CommitContext::default();
        assert_eq!(
            base_score("perf: speed up {purpose}", &generic, ScoreMode::Select),
            base_score("perf: speed up", &generic, ScoreMode::Select)
        );
    }

    #[test]
    fn test_move_placeholders() {
        let template = "refactor: move {source} to {target}";
        let plain = CommitContext::default();
        assert!(base_score(template, &plain, ScoreMode::Select) < -90.0);

        let mut moved = CommitContext::default();
        moved.renamed_files.push(FileMove {
            source: "a.rs".to_string(),
            target: "b.rs".to_string(),
        });
        assert_eq!(
            base_score(template, &moved, ScoreMode::Select),
            BASE + 2.0 * MOVE_BONUS
        );
    }

    #[test]
    fn test_topic_bonuses() {
        let ctx = ctx_with_item();
        let with_topic = base_score("feat({topic}): x", &ctx, ScoreMode::Select);
        let without = base_score("feat: x", &ctx, ScoreMode::Select);
        assert_eq!(with_topic - without, TOPIC_BONUS + MEANINGFUL_TOPIC_BONUS);
    }

    #[test]
    fn test_pattern_keyword_bonus() {
        let mut ctx = CommitContext::default();
        ctx.change_patterns.insert(Pattern::ErrorHandling);
        ctx.change_patterns.insert(Pattern::Database);
        let score = base_score("fix: handle database error", &ctx, ScoreMode::Select);
        assert_eq!(score, BASE + 2.0 * PATTERN_BONUS);
    }

    #[test]
    fn test_extension_and_structure_bonuses() {
        let mut ctx = CommitContext::default();
        ctx.file_extensions.insert("go".to_string());
        ctx.detected_functions.push("Parse".to_string());
        let score = base_score("feat: add func", &ctx, ScoreMode::Select);
        assert_eq!(score, BASE + 0.5 + STRUCTURE_BONUS);
    }

    #[test]
    fn test_special_case_and_generic_penalty() {
        let ctx = CommitContext {
            is_docs_only: true,
            ..Default::default()
        };
        assert_eq!(
            base_score("docs: document api", &ctx, ScoreMode::Select),
            BASE + SPECIAL_CASE_BONUS
        );

        let specific = CommitContext {
            purpose: "caching".to_string(),
            ..Default::default()
        };
        assert_eq!(
            base_score("chore: general update", &specific, ScoreMode::Select),
            BASE + GENERIC_PENALTY
        );
        assert_eq!(
            base_score("chore: general update", &CommitContext::default(), ScoreMode::Select),
            BASE
        );
    }

    #[test]
    fn test_major_bonus() {
        let ctx = CommitContext {
            is_major: true,
            ..Default::default()
        };
        assert_eq!(
            base_score("refactor: restructure layout", &ctx, ScoreMode::Select),
            BASE + MAJOR_BONUS
        );
    }

    #[test]
    fn test_scope_match_bonus() {
        let ctx = CommitContext {
            scope: "api".to_string(),
            ..Default::default()
        };
        assert_eq!(
            base_score("refactor(api): redesign endpoints", &ctx, ScoreMode::Select),
            BASE + SCOPE_MATCH_BONUS
        );
    }

    #[test]
    fn test_jitter_is_bounded() {
        let ctx = CommitContext::default();
        let base = base_score("chore: tidy", &ctx, ScoreMode::Select);
        let low = score("chore: tidy", &ctx, ScoreMode::Select, &mut ConstantRandom(0.0));
        let high = score("chore: tidy", &ctx, ScoreMode::Select, &mut ConstantRandom(0.9));
        assert_eq!(low, base);
        assert!(high < base + JITTER_MAX);
        assert!(high > base);
    }

    #[test]
    fn test_os_random_range() {
        let mut random = OsRandom;
        for _ in 0..100 {
            let value = random.next_f64();
            assert!((0.0..1.0).contains(&value));
            assert!(random.next_index(3) < 3);
        }
    }

    #[test]
    fn test_constant_random_index() {
        assert_eq!(ConstantRandom(0.0).next_index(4), 0);
        assert_eq!(ConstantRandom(0.99).next_index(4), 3);
        assert_eq!(ConstantRandom(1.0).next_index(4), 3);
    }
}
