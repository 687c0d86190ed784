//! Trigger evaluation: when does a score transition deserve an intervention?
//!
//! The evaluator owns a single [`TriggerSlot`]. A slot is idle, pending a
//! guidance fetch, or holding one active trigger, so a suggestion and a
//! dissonance event can never coexist. Each recomputation cycle calls
//! [`TriggerEvaluator::evaluate`], which may move an idle slot to pending and
//! hand back a [`FetchTicket`]. The fetch result comes back through
//! [`TriggerEvaluator::complete`] and is applied only if the slot is still
//! pending under the ticket's generation.
//!
//! The cooldown is stamped when the fetch is decided, not when it resolves,
//! so a failed fetch still counts against it.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::COOLDOWN_MS;

/// Which trigger a fetch is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Sustained low score. Advisory, expires on its own.
    Suggestion,
    /// Sharp drop. Needs explicit acknowledgment.
    Dissonance,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Suggestion => "suggestion",
            TriggerKind::Dissonance => "dissonance",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The trigger visible to the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    None,
    Suggestion {
        text: String,
    },
    DissonanceEvent {
        #[serde(rename = "practiceText")]
        practice_text: String,
    },
}

impl Trigger {
    fn populated(kind: TriggerKind, text: String) -> Self {
        match kind {
            TriggerKind::Suggestion => Trigger::Suggestion { text },
            TriggerKind::Dissonance => Trigger::DissonanceEvent {
                practice_text: text,
            },
        }
    }

    pub fn kind(&self) -> Option<TriggerKind> {
        match self {
            Trigger::None => None,
            Trigger::Suggestion { .. } => Some(TriggerKind::Suggestion),
            Trigger::DissonanceEvent { .. } => Some(TriggerKind::Dissonance),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Trigger::None)
    }

    /// Guidance text carried by the trigger, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Trigger::None => None,
            Trigger::Suggestion { text } => Some(text),
            Trigger::DissonanceEvent { practice_text } => Some(practice_text),
        }
    }
}

/// The evaluator's single trigger slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TriggerSlot {
    #[default]
    Idle,
    /// A fetch is in flight; its result may only land under `generation`.
    Pending { kind: TriggerKind, generation: u64 },
    /// Always holds `Suggestion` or `DissonanceEvent`, never `Trigger::None`.
    Active { trigger: Trigger, generation: u64 },
}

/// Minimum-gap bookkeeping shared by both trigger kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownState {
    /// Epoch ms of the last decision to fetch. `None` until the first one.
    pub last_trigger_time: Option<i64>,
    pub cooldown_ms: i64,
}

impl CooldownState {
    pub fn new(cooldown_ms: i64) -> Self {
        Self {
            last_trigger_time: None,
            cooldown_ms,
        }
    }

    /// True when strictly more than `cooldown_ms` has passed since the stamp.
    pub fn elapsed(&self, now: i64) -> bool {
        match self.last_trigger_time {
            None => true,
            Some(last) => now.saturating_sub(last) > self.cooldown_ms,
        }
    }

    /// Milliseconds until a trigger may fire again (0 when it already may).
    pub fn remaining_ms(&self, now: i64) -> i64 {
        match self.last_trigger_time {
            None => 0,
            Some(last) => self
                .cooldown_ms
                .saturating_add(1)
                .saturating_sub(now.saturating_sub(last))
                .max(0),
        }
    }

    fn stamp(&mut self, now: i64) {
        self.last_trigger_time = Some(now);
    }
}

impl Default for CooldownState {
    fn default() -> Self {
        Self::new(COOLDOWN_MS)
    }
}

/// Permission to run one guidance fetch, returned by `evaluate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: TriggerKind,
    pub generation: u64,
}

/// What `complete` did with a fetch result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The slot now holds this trigger.
    Applied(Trigger),
    /// The fetch failed; the slot is idle again and the cooldown stays.
    Failed,
    /// The slot moved on (cleared or disposed); the result was dropped.
    Stale,
}

#[derive(Clone, Debug)]
pub struct TriggerEvaluator {
    drop_threshold: f64,
    low_score_threshold: f64,
    previous_score: f64,
    cooldown: CooldownState,
    slot: TriggerSlot,
    generation: u64,
}

impl TriggerEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            drop_threshold: config.drop_threshold,
            low_score_threshold: config.low_score_threshold,
            previous_score: config.baseline_score,
            cooldown: CooldownState::new(config.cooldown_ms),
            slot: TriggerSlot::Idle,
            generation: 0,
        }
    }

    /// Seed the previous score without running the rules.
    pub fn prime(&mut self, score: f64) {
        self.previous_score = score;
    }

    /// Run one cycle against `new_score`.
    ///
    /// A sharp drop wins over a low score. Either needs an idle slot and an
    /// elapsed cooldown. The previous score always advances to `new_score`.
    pub fn evaluate(&mut self, new_score: f64, now: i64) -> Option<FetchTicket> {
        let drop = self.previous_score - new_score;
        self.previous_score = new_score;

        if self.slot != TriggerSlot::Idle || !self.cooldown.elapsed(now) {
            return None;
        }

        let kind = if drop >= self.drop_threshold {
            TriggerKind::Dissonance
        } else if new_score < self.low_score_threshold {
            TriggerKind::Suggestion
        } else {
            return None;
        };

        self.generation += 1;
        self.cooldown.stamp(now);
        self.slot = TriggerSlot::Pending {
            kind,
            generation: self.generation,
        };
        Some(FetchTicket {
            kind,
            generation: self.generation,
        })
    }

    /// Apply a fetch result for `ticket`.
    ///
    /// Blank text counts as a failure. Results for a slot that is no longer
    /// pending under the ticket are dropped without touching state.
    pub fn complete<E>(&mut self, ticket: FetchTicket, result: Result<String, E>) -> Completion {
        let expected = TriggerSlot::Pending {
            kind: ticket.kind,
            generation: ticket.generation,
        };
        if self.slot != expected {
            return Completion::Stale;
        }

        match result {
            Ok(text) if !text.trim().is_empty() => {
                let trigger = Trigger::populated(ticket.kind, text);
                self.slot = TriggerSlot::Active {
                    trigger: trigger.clone(),
                    generation: ticket.generation,
                };
                Completion::Applied(trigger)
            }
            _ => {
                self.slot = TriggerSlot::Idle;
                Completion::Failed
            }
        }
    }

    /// Drop a pending or active suggestion. Returns whether the slot changed.
    pub fn clear_suggestion(&mut self) -> bool {
        self.clear_kind(Some(TriggerKind::Suggestion))
    }

    /// Drop a pending or active dissonance event. Returns whether the slot changed.
    pub fn clear_dissonance(&mut self) -> bool {
        self.clear_kind(Some(TriggerKind::Dissonance))
    }

    /// Drop whatever the slot holds. Returns whether the slot changed.
    pub fn acknowledge(&mut self) -> bool {
        self.clear_kind(None)
    }

    /// Auto-dismiss: clear the suggestion only if it is still the one that
    /// became active under `generation`.
    pub fn expire_suggestion(&mut self, generation: u64) -> bool {
        match &self.slot {
            TriggerSlot::Active {
                trigger: Trigger::Suggestion { .. },
                generation: g,
            } if *g == generation => {
                self.generation += 1;
                self.slot = TriggerSlot::Idle;
                true
            }
            _ => false,
        }
    }

    fn clear_kind(&mut self, kind: Option<TriggerKind>) -> bool {
        self.generation += 1;
        let slot_kind = match &self.slot {
            TriggerSlot::Idle => return false,
            TriggerSlot::Pending { kind, .. } => Some(*kind),
            TriggerSlot::Active { trigger, .. } => trigger.kind(),
        };
        if kind.is_some() && kind != slot_kind {
            return false;
        }
        self.slot = TriggerSlot::Idle;
        true
    }

    /// The trigger as the UI sees it. A pending fetch reads as `None`.
    pub fn trigger(&self) -> Trigger {
        match &self.slot {
            TriggerSlot::Active { trigger, .. } => trigger.clone(),
            _ => Trigger::None,
        }
    }

    pub fn slot(&self) -> &TriggerSlot {
        &self.slot
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot, TriggerSlot::Pending { .. })
    }

    pub fn is_idle(&self) -> bool {
        self.slot == TriggerSlot::Idle
    }

    /// Generation of the active trigger, if one is showing.
    pub fn active_generation(&self) -> Option<u64> {
        match self.slot {
            TriggerSlot::Active { generation, .. } => Some(generation),
            _ => None,
        }
    }

    pub fn previous_score(&self) -> f64 {
        self.previous_score
    }

    pub fn cooldown(&self) -> CooldownState {
        self.cooldown
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
