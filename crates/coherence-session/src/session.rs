use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use coherence_core::{
    Clock, Completion, CooldownState, EngineConfig, Entry, FetchTicket, SentimentScorer,
    SystemClock, Trigger, TriggerEvaluator, TriggerKind, aggregate_with,
};
use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::generator::{GenerateError, GuidanceSources};

/// Upper bound on a single guidance fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configures and initializes a [`CoherenceSession`].
pub struct SessionBuilder {
    config: EngineConfig,
    scorer: Option<Arc<dyn SentimentScorer>>,
    sources: GuidanceSources,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl SessionBuilder {
    pub fn new(sources: GuidanceSources) -> Self {
        Self {
            config: EngineConfig::default(),
            scorer: None,
            sources,
            clock: Arc::new(SystemClock),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the lexical scorer built from the config's lexicon.
    pub fn scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Start a session over the journal as it stands.
    ///
    /// The initial score seeds the evaluator's previous score without running
    /// the trigger rules: opening a session never fires on old entries.
    /// Must be called inside a tokio runtime.
    pub fn init(self, snapshot: &[Entry]) -> Result<CoherenceSession> {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let scorer = self
            .scorer
            .unwrap_or_else(|| Arc::new(self.config.scorer()) as Arc<dyn SentimentScorer>);

        let score = aggregate_with(snapshot, scorer.as_ref(), &self.config);
        let mut evaluator = TriggerEvaluator::new(&self.config);
        evaluator.prime(score);

        let (trigger_tx, _) = watch::channel(Trigger::None);
        info!(score, entries = snapshot.len(), "coherence session started");

        Ok(CoherenceSession {
            inner: Arc::new(Inner {
                config: self.config,
                scorer,
                sources: self.sources,
                clock: self.clock,
                runtime,
                fetch_timeout: self.fetch_timeout,
                trigger_tx,
                state: Mutex::new(SessionState {
                    score,
                    entry_count: snapshot.len(),
                    evaluator,
                    disposed: false,
                    fetches: Vec::new(),
                    timers: Vec::new(),
                }),
            }),
        })
    }
}

/// Handle to one session's engine state. Clones share the same state.
///
/// Every mutation goes through one mutex that is never held across an
/// await. Reads and clears are synchronous; only the guidance fetch runs on
/// a task.
#[derive(Clone)]
pub struct CoherenceSession {
    inner: Arc<Inner>,
}

struct Inner {
    config: EngineConfig,
    scorer: Arc<dyn SentimentScorer>,
    sources: GuidanceSources,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    fetch_timeout: Duration,
    trigger_tx: watch::Sender<Trigger>,
    state: Mutex<SessionState>,
}

struct SessionState {
    score: f64,
    entry_count: usize,
    evaluator: TriggerEvaluator,
    disposed: bool,
    fetches: Vec<JoinHandle<()>>,
    timers: Vec<JoinHandle<()>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, trigger: Trigger) {
        self.trigger_tx.send_replace(trigger);
    }
}

impl CoherenceSession {
    pub fn builder(sources: GuidanceSources) -> SessionBuilder {
        SessionBuilder::new(sources)
    }

    /// Recompute from a fresh journal snapshot and run one trigger cycle.
    ///
    /// Returns the ticket of the fetch this cycle dispatched, if any.
    pub fn on_entries_changed(&self, snapshot: &[Entry]) -> Option<FetchTicket> {
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.disposed {
            debug!("ignoring journal change on disposed session");
            return None;
        }

        let now = inner.clock.now_ms();
        let score = aggregate_with(snapshot, inner.scorer.as_ref(), &inner.config);

        let previous = state.evaluator.previous_score();
        state.score = score;
        state.entry_count = snapshot.len();
        let ticket = state.evaluator.evaluate(score, now);
        debug!(score, previous, entries = snapshot.len(), "recomputed coherence");

        if let Some(ticket) = ticket {
            info!(kind = %ticket.kind, score, previous, "dispatching guidance fetch");
            let handle = self.dispatch(ticket);
            state.fetches.retain(|h| !h.is_finished());
            state.fetches.push(handle);
        }
        ticket
    }

    /// Callback for the journal's change notification.
    pub fn listener(&self) -> impl FnMut(&[Entry]) + Send + 'static {
        let session = self.clone();
        move |snapshot| {
            session.on_entries_changed(snapshot);
        }
    }

    fn dispatch(&self, ticket: FetchTicket) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let generator = inner.sources.for_kind(ticket.kind);
        let timeout = inner.fetch_timeout;

        self.inner.runtime.spawn(async move {
            let fetch = AssertUnwindSafe(async move { generator.generate().await }).catch_unwind();
            let result = match tokio::time::timeout(timeout, fetch).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(GenerateError::Failed("generator panicked".into())),
                Err(_) => Err(GenerateError::Timeout(timeout)),
            };
            if let Err(e) = &result {
                warn!(kind = %ticket.kind, "{e}");
            }

            let mut state = inner.lock();
            match state.evaluator.complete(ticket, result) {
                Completion::Applied(trigger) => {
                    info!(kind = %ticket.kind, "guidance ready");
                    inner.publish(trigger);
                    if ticket.kind == TriggerKind::Suggestion {
                        let timer = schedule_expiry(&inner, ticket.generation);
                        if let Some(timer) = timer {
                            state.timers.retain(|h| !h.is_finished());
                            state.timers.push(timer);
                        }
                    }
                }
                Completion::Failed => {
                    warn!(kind = %ticket.kind, "guidance fetch failed; trigger reset, cooldown kept");
                }
                Completion::Stale => {
                    debug!(kind = %ticket.kind, "discarding guidance for a cleared trigger");
                }
            }
        })
    }

    pub fn current_score(&self) -> f64 {
        self.inner.lock().score
    }

    pub fn current_trigger(&self) -> Trigger {
        self.inner.lock().evaluator.trigger()
    }

    /// True while a guidance fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.inner.lock().evaluator.is_pending()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().entry_count
    }

    pub fn cooldown(&self) -> CooldownState {
        self.inner.lock().evaluator.cooldown()
    }

    /// Milliseconds until another trigger may fire.
    pub fn cooldown_remaining_ms(&self) -> i64 {
        let now = self.inner.clock.now_ms();
        self.inner.lock().evaluator.cooldown().remaining_ms(now)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Watch the UI-visible trigger. The value changes whenever guidance
    /// lands or a trigger is cleared.
    pub fn subscribe(&self) -> watch::Receiver<Trigger> {
        self.inner.trigger_tx.subscribe()
    }

    pub fn clear_suggestion(&self) {
        let mut state = self.inner.lock();
        if state.evaluator.clear_suggestion() {
            debug!("suggestion cleared");
            self.inner.publish(Trigger::None);
        }
    }

    pub fn clear_dissonance(&self) {
        let mut state = self.inner.lock();
        if state.evaluator.clear_dissonance() {
            debug!("dissonance event acknowledged");
            self.inner.publish(Trigger::None);
        }
    }

    /// Clear whichever trigger is showing or pending.
    pub fn acknowledge(&self) {
        let mut state = self.inner.lock();
        if state.evaluator.acknowledge() {
            debug!("trigger acknowledged");
            self.inner.publish(Trigger::None);
        }
    }

    /// Wait for every in-flight guidance fetch to resolve.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut self.inner.lock().fetches);
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                let _ = handle.await;
            }
        }
    }

    /// End the session. In-flight fetches are abandoned, timers stopped,
    /// the trigger cleared, and later journal changes ignored.
    pub fn dispose(&self) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.evaluator.acknowledge();
        for handle in state.fetches.drain(..).chain(state.timers.drain(..)) {
            handle.abort();
        }
        self.inner.publish(Trigger::None);
        info!("coherence session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }
}

/// Auto-dismiss the suggestion that became active under `generation`.
fn schedule_expiry(inner: &Arc<Inner>, generation: u64) -> Option<JoinHandle<()>> {
    let ttl = inner.config.suggestion_ttl_ms;
    if ttl == 0 {
        return None;
    }
    let inner = Arc::clone(inner);
    let runtime = inner.runtime.clone();
    Some(runtime.spawn(async move {
        tokio::time::sleep(Duration::from_millis(ttl)).await;
        let mut state = inner.lock();
        if state.evaluator.expire_suggestion(generation) {
            debug!("suggestion expired");
            inner.publish(Trigger::None);
        }
    }))
}
