/// Score reported for an empty journal, and the origin the sentiment sum
/// is added to.
pub const BASELINE_SCORE: f64 = 75.0;

/// Lower bound of the coherence score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the coherence score.
pub const SCORE_MAX: f64 = 100.0;

/// Entry weight is `RECENCY_BASE^(-age)`; the newest entry has age 1.
pub const RECENCY_BASE: f64 = 1.5;

/// Multiplier from the weighted sentiment sum to score points.
pub const SENTIMENT_SCALE: f64 = 5.0;

/// Per-entry cap on lexicon hits. Scores are clamped to `[-MAX_NEGATIVITY, 0]`.
pub const MAX_NEGATIVITY: u32 = 5;

/// A fall of at least this many points between two cycles is a dissonance.
pub const DROP_THRESHOLD: f64 = 20.0;

/// A score strictly below this is "sustained low" and earns a suggestion.
pub const LOW_SCORE_THRESHOLD: f64 = 50.0;

/// Minimum gap between two trigger firings of any kind (5 minutes).
pub const COOLDOWN_MS: i64 = 300_000;

/// Display lifetime of a suggestion before it dismisses itself.
pub const SUGGESTION_TTL_MS: u64 = 15_000;
