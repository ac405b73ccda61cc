//! Template engine: corpus lookup, scoring, selection and rendering.

mod corpus;
mod formatter;
mod scorer;
mod selector;

pub use corpus::{Bucket, Corpus, DEFAULT_BUCKET, PLACEHOLDERS};
pub use formatter::{MAJOR_SUFFIX, MAX_SUBJECT_LEN, MessageFormatter, normalize};
pub use scorer::{ConstantRandom, JITTER_MAX, OsRandom, RandomSource, ScoreMode, base_score, missing_value, score};
pub use selector::{Suggestion, SuggestionSelector, similarity};
