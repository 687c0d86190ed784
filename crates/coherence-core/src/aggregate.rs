//! Recency-weighted aggregation of the journal into a coherence score.
//!
//! For `n` entries, oldest first, the entry at index `i` has age `n - i`
//! and weight `base^(-age)`. The weighted sentiment sum is scaled and added
//! to the baseline, then clamped to `[SCORE_MIN, SCORE_MAX]`.
//!
//! Recomputation is total: callers pass the whole snapshot every time.

use crate::config::EngineConfig;
use crate::constants::{BASELINE_SCORE, RECENCY_BASE, SCORE_MAX, SCORE_MIN, SENTIMENT_SCALE};
use crate::entry::Entry;
use crate::sentiment::SentimentScorer;

/// Weight of an entry of the given age (newest entry has age 1).
pub fn recency_weight(age: usize, base: f64) -> f64 {
    base.powi(-(age as i32))
}

/// Score a snapshot with the default constants.
pub fn aggregate(entries: &[Entry], scorer: &dyn SentimentScorer) -> f64 {
    fold(entries, scorer, BASELINE_SCORE, RECENCY_BASE, SENTIMENT_SCALE)
}

/// Score a snapshot with the weights and baseline from `config`.
pub fn aggregate_with(
    entries: &[Entry],
    scorer: &dyn SentimentScorer,
    config: &EngineConfig,
) -> f64 {
    fold(
        entries,
        scorer,
        config.baseline_score,
        config.recency_base,
        config.sentiment_scale,
    )
}

fn fold(
    entries: &[Entry],
    scorer: &dyn SentimentScorer,
    baseline: f64,
    base: f64,
    scale: f64,
) -> f64 {
    if entries.is_empty() {
        return baseline.clamp(SCORE_MIN, SCORE_MAX);
    }

    let total = entries.len();
    let sentiment_sum: f64 = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let age = total - index;
            scorer.score(&entry.text) as f64 * recency_weight(age, base)
        })
        .sum();

    let score = baseline + sentiment_sum * scale;
    if score.is_nan() {
        return baseline.clamp(SCORE_MIN, SCORE_MAX);
    }
    score.clamp(SCORE_MIN, SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexicalScorer;
    use approx::assert_relative_eq;

    fn entries(texts: &[&str]) -> Vec<Entry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Entry::new(i as i64 + 1, *t, i as i64 + 1))
            .collect()
    }

    #[test]
    fn test_empty_is_baseline() {
        assert_eq!(aggregate(&[], &LexicalScorer::default()), 75.0);
    }

    #[test]
    fn test_weight_of_newest_entry() {
        assert_relative_eq!(recency_weight(1, 1.5), 2.0 / 3.0);
        assert_relative_eq!(recency_weight(2, 1.5), 4.0 / 9.0);
    }

    #[test]
    fn test_single_negative_entry() {
        // 75 + (-2 * 2/3) * 5
        let score = aggregate(&entries(&["triste raiva"]), &LexicalScorer::default());
        assert_relative_eq!(score, 75.0 - 20.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_recent_entries_dominate() {
        let s = LexicalScorer::default();
        let bad_then_good = aggregate(&entries(&["triste", "bem"]), &s);
        let good_then_bad = aggregate(&entries(&["bem", "triste"]), &s);
        assert!(good_then_bad < bad_then_good);
    }

    #[test]
    fn test_neutral_entries_score_baseline() {
        let s = LexicalScorer::default();
        assert_eq!(aggregate(&entries(&["bom dia", "tudo certo"]), &s), 75.0);
    }

    #[test]
    fn test_clamped_at_zero() {
        let s = |_: &str| -5;
        let config = EngineConfig {
            sentiment_scale: 100.0,
            ..EngineConfig::default()
        };
        let score = aggregate_with(&entries(&["x", "y", "z"]), &s, &config);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_config_baseline_used() {
        let config = EngineConfig {
            baseline_score: 60.0,
            ..EngineConfig::default()
        };
        assert_eq!(aggregate_with(&[], &LexicalScorer::default(), &config), 60.0);
    }
}
