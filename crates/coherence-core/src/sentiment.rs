//! Lexical sentiment: one entry in, a bounded negativity value out.
//!
//! The scorer is deliberately simple. Each whitespace token that contains a
//! lexicon stem counts as one hit, regardless of how many stems it contains.
//! Hits are capped at [`MAX_NEGATIVITY`] and returned negated, so every entry
//! lands in `[-5, 0]`.

use crate::constants::MAX_NEGATIVITY;
use crate::tokenizer::tokenize;

/// Negative-affect stems matched by substring against lowercase tokens.
pub const DEFAULT_LEXICON: &[&str] = &[
    "trist",
    "raiva",
    "medo",
    "ansios",
    "ansied",
    "sozinh",
    "solidão",
    "solidao",
    "cansad",
    "exaust",
    "angúst",
    "angust",
    "deprimid",
    "depress",
    "estress",
    "culpa",
    "frustr",
    "vazi",
    "perdid",
    "ódio",
    "odio",
    "odeio",
    "chor",
    "desesper",
    "pânico",
    "panico",
    "mágoa",
    "magoa",
    "sofr",
    "irritad",
    "nervos",
    "infeliz",
    "fracass",
    "inútil",
    "inutil",
    "pior",
];

/// Maps one entry's text to an integer in `[-MAX_NEGATIVITY, 0]`.
///
/// Implementations must be pure: the aggregator calls `score` for every
/// entry on every recomputation and expects identical answers.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> i32;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> i32 + Send + Sync,
{
    fn score(&self, text: &str) -> i32 {
        self(text).clamp(-(MAX_NEGATIVITY as i32), 0)
    }
}

/// Substring-lexicon scorer.
#[derive(Clone, Debug)]
pub struct LexicalScorer {
    lexicon: Vec<String>,
    max_hits: u32,
}

impl LexicalScorer {
    /// Build a scorer from lexicon stems. Stems are lowercased and blank
    /// stems dropped: an empty stem would match every token.
    pub fn new<I, S>(lexicon: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lexicon = lexicon
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            lexicon,
            max_hits: MAX_NEGATIVITY,
        }
    }

    pub fn lexicon(&self) -> &[String] {
        &self.lexicon
    }

    /// Number of tokens that contain at least one stem, uncapped.
    pub fn hits(&self, text: &str) -> u32 {
        tokenize(text)
            .iter()
            .filter(|token| self.lexicon.iter().any(|stem| token.contains(stem.as_str())))
            .count() as u32
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new(DEFAULT_LEXICON)
    }
}

impl SentimentScorer for LexicalScorer {
    fn score(&self, text: &str) -> i32 {
        -(self.hits(text).min(self.max_hits) as i32)
    }
}
