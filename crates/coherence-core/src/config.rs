//! Tunable engine parameters.
//!
//! Every field defaults to the corresponding constant in [`crate::constants`],
//! so a partial TOML table only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASELINE_SCORE, COOLDOWN_MS, DROP_THRESHOLD, LOW_SCORE_THRESHOLD, RECENCY_BASE,
    SENTIMENT_SCALE, SUGGESTION_TTL_MS,
};
use crate::sentiment::{DEFAULT_LEXICON, LexicalScorer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score of an empty journal.
    pub baseline_score: f64,
    /// Base of the exponential recency decay.
    pub recency_base: f64,
    /// Points per unit of weighted sentiment.
    pub sentiment_scale: f64,
    /// Minimum fall between cycles that counts as a dissonance.
    pub drop_threshold: f64,
    /// Scores strictly below this earn a suggestion.
    pub low_score_threshold: f64,
    /// Minimum gap between trigger firings, milliseconds.
    pub cooldown_ms: i64,
    /// Suggestion display lifetime, milliseconds.
    pub suggestion_ttl_ms: u64,
    /// Negative-affect stems for the lexical scorer.
    pub lexicon: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_score: BASELINE_SCORE,
            recency_base: RECENCY_BASE,
            sentiment_scale: SENTIMENT_SCALE,
            drop_threshold: DROP_THRESHOLD,
            low_score_threshold: LOW_SCORE_THRESHOLD,
            cooldown_ms: COOLDOWN_MS,
            suggestion_ttl_ms: SUGGESTION_TTL_MS,
            lexicon: DEFAULT_LEXICON.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Lexical scorer over this config's lexicon.
    pub fn scorer(&self) -> LexicalScorer {
        LexicalScorer::new(&self.lexicon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let c = EngineConfig::default();
        assert_eq!(c.baseline_score, 75.0);
        assert_eq!(c.drop_threshold, 20.0);
        assert_eq!(c.low_score_threshold, 50.0);
        assert_eq!(c.cooldown_ms, 300_000);
        assert_eq!(c.suggestion_ttl_ms, 15_000);
        assert_eq!(c.lexicon.len(), DEFAULT_LEXICON.len());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{ "cooldown_ms": 1000 }"#).unwrap();
        assert_eq!(c.cooldown_ms, 1000);
        assert_eq!(c.recency_base, 1.5);
        assert!(!c.lexicon.is_empty());
    }

    #[test]
    fn test_scorer_uses_lexicon() {
        let c = EngineConfig {
            lexicon: vec!["gloomy".into()],
            ..EngineConfig::default()
        };
        let s = c.scorer();
        assert_eq!(crate::SentimentScorer::score(&s, "a gloomy day"), -1);
        assert_eq!(crate::SentimentScorer::score(&s, "triste"), 0);
    }
}
