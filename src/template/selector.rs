//! Chooses and ranks rendered suggestions from a scored bucket.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::analysis::CommitContext;
use crate::error::TemplateResolutionError;
use crate::history::HistoryStore;
use crate::template::corpus::Corpus;
use crate::template::formatter::MessageFormatter;
use crate::template::scorer::{RandomSource, ScoreMode, missing_value, score};

/// Candidates within this distance of the top score are treated as equally good.
const BEST_BAND: f64 = 0.5;

const DIVERSITY_HIGH: f64 = 1.0;
const DIVERSITY_LOW: f64 = 0.5;

/// A rendered message with the template and score that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub message: String,
    pub template: String,
    pub score: f64,
}

/// Scores a context's template bucket and picks messages from it.
pub struct SuggestionSelector<'a> {
    corpus: &'a Corpus,
    history: &'a dyn HistoryStore,
    formatter: MessageFormatter,
}

impl<'a> SuggestionSelector<'a> {
    pub fn new(corpus: &'a Corpus, history: &'a dyn HistoryStore) -> Self {
        Self {
            corpus,
            history,
            formatter: MessageFormatter::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: MessageFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// The single best suggestion, preferring one not already in history.
    pub fn best(
        &self,
        ctx: &CommitContext,
        random: &mut dyn RandomSource,
    ) -> Result<Suggestion, TemplateResolutionError> {
        let mut scored = self.score_bucket(ctx, ScoreMode::Select, random)?;
        sort_descending(&mut scored);

        let top = scored.first().map(|s| s.score).unwrap_or_default();
        let band: Vec<Suggestion> = scored
            .into_iter()
            .filter(|s| s.score >= top - BEST_BAND)
            .collect();

        if let Some(fresh) = band.iter().find(|s| !self.history.contains(&s.message)) {
            return Ok(fresh.clone());
        }

        debug!(candidates = band.len(), "Every top candidate is in history, picking at random");
        let pick = random.next_index(band.len());
        Ok(band[pick].clone())
    }

    /// Up to `max_n` distinct suggestions, best first.
    ///
    /// Messages already in history go to the back and only fill the list when
    /// there are not enough fresh ones. Templates missing a placeholder value
    /// are left out unless the bucket has nothing else.
    pub fn ranked(
        &self,
        ctx: &CommitContext,
        max_n: usize,
        random: &mut dyn RandomSource,
    ) -> Result<Vec<Suggestion>, TemplateResolutionError> {
        let mut scored = self.score_bucket(ctx, ScoreMode::Ranked, random)?;
        sort_descending(&mut scored);

        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        let mut deferred = Vec::new();
        for suggestion in scored {
            if !seen.insert(suggestion.message.clone()) {
                continue;
            }
            if self.history.contains(&suggestion.message) {
                deferred.push(suggestion);
            } else {
                fresh.push(suggestion);
            }
        }

        fresh.extend(deferred);
        fresh.truncate(max_n);
        Ok(fresh)
    }

    /// A suggestion that differs from everything already shown.
    ///
    /// Falls back to the whole bucket when every render has been shown.
    pub fn alternative(
        &self,
        ctx: &CommitContext,
        shown: &BTreeSet<String>,
        random: &mut dyn RandomSource,
    ) -> Result<Suggestion, TemplateResolutionError> {
        let mut scored = self.score_bucket(ctx, ScoreMode::Select, random)?;
        for suggestion in &mut scored {
            suggestion.score += shown
                .iter()
                .map(|previous| diversity_bonus(similarity(&suggestion.message, previous)))
                .sum::<f64>();
        }
        sort_descending(&mut scored);

        let pick = scored
            .iter()
            .find(|s| !shown.contains(&s.message))
            .or_else(|| {
                debug!("Every candidate was already shown, reusing the full set");
                scored.first()
            })
            .cloned();

        // The bucket is never empty once resolved, so `pick` is always set.
        pick.ok_or_else(|| TemplateResolutionError {
            action: ctx.action.to_string(),
            topic: ctx.topic.clone(),
        })
    }

    fn score_bucket(
        &self,
        ctx: &CommitContext,
        mode: ScoreMode,
        random: &mut dyn RandomSource,
    ) -> Result<Vec<Suggestion>, TemplateResolutionError> {
        let bucket = self.corpus.resolve(ctx)?;
        debug!(group = bucket.group, topic = bucket.topic, "Resolved template bucket");

        let usable: Vec<&String> = bucket
            .templates
            .iter()
            .filter(|template| !missing_value(template, ctx))
            .collect();
        let candidates = if usable.is_empty() {
            debug!("No template has values for all its placeholders, using the whole bucket");
            bucket.templates.iter().collect()
        } else {
            usable
        };

        Ok(candidates
            .into_iter()
            .map(|template| Suggestion {
                message: self.formatter.format(template, ctx, &ctx.scope),
                template: template.clone(),
                score: score(template, ctx, mode, random),
            })
            .collect())
    }
}

fn sort_descending(scored: &mut [Suggestion]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

fn diversity_bonus(similarity: f64) -> f64 {
    if similarity < 0.5 {
        DIVERSITY_HIGH
    } else if similarity < 0.7 {
        DIVERSITY_LOW
    } else {
        0.0
    }
}

/// Similarity in `[0, 1]`: 0.6 x word Jaccard + 0.4 x positional character match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let union = words_a.union(&words_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        words_a.intersection(&words_b).count() as f64 / union as f64
    };

    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    let longest = chars_a.len().max(chars_b.len());
    let positional = if longest == 0 {
        0.0
    } else {
        let matching = chars_a.iter().zip(&chars_b).filter(|(x, y)| x == y).count();
        matching as f64 / longest as f64
    };

    0.6 * jaccard + 0.4 * positional
}
