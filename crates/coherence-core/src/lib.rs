//! Coherence engine core.
//!
//! Folds an append-only journal of free-text entries into a coherence score
//! in [0, 100] and drives the trigger state machine that decides when a
//! suggestion or a dissonance event should be fetched for the user.
//!
//! Zero I/O. The guidance fetch, the journal and the clock are collaborators
//! owned by the layers above.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod entry;
pub mod sentiment;
pub mod time;
pub mod tokenizer;
pub mod trigger;

pub use aggregate::{aggregate, aggregate_with, recency_weight};
pub use config::EngineConfig;
pub use constants::{
    BASELINE_SCORE, COOLDOWN_MS, DROP_THRESHOLD, LOW_SCORE_THRESHOLD, MAX_NEGATIVITY,
    RECENCY_BASE, SCORE_MAX, SCORE_MIN, SENTIMENT_SCALE, SUGGESTION_TTL_MS,
};
pub use entry::Entry;
pub use sentiment::{DEFAULT_LEXICON, LexicalScorer, SentimentScorer};
pub use time::{Clock, ManualClock, SystemClock, now_unix_ms, unix_ms_to_iso8601};
pub use tokenizer::tokenize;
pub use trigger::{
    Completion, CooldownState, FetchTicket, Trigger, TriggerEvaluator, TriggerKind, TriggerSlot,
};
