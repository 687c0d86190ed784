use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use coherence_core::TriggerKind;
use futures_util::future::BoxFuture;

/// Why a guidance fetch produced no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The generator rejected or could not be reached.
    Failed(String),
    /// The generator did not answer within the fetch timeout.
    Timeout(Duration),
    /// The generator answered with nothing usable.
    Empty,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Failed(msg) => write!(f, "guidance generator failed: {msg}"),
            GenerateError::Timeout(d) => {
                write!(f, "guidance generator timed out after {}ms", d.as_millis())
            }
            GenerateError::Empty => write!(f, "guidance generator returned no text"),
        }
    }
}

impl std::error::Error for GenerateError {}

pub type GuidanceFuture = BoxFuture<'static, Result<String, GenerateError>>;

/// Produces one piece of guidance text. Opaque to the engine: it may take
/// arbitrarily long, fail, or panic, and none of that reaches the session.
pub trait GuidanceGenerator: Send + Sync {
    fn generate(&self) -> GuidanceFuture;
}

impl<F, Fut> GuidanceGenerator for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, GenerateError>> + Send + 'static,
{
    fn generate(&self) -> GuidanceFuture {
        Box::pin(self())
    }
}

/// One generator per trigger kind.
#[derive(Clone)]
pub struct GuidanceSources {
    pub suggestion: Arc<dyn GuidanceGenerator>,
    pub practice: Arc<dyn GuidanceGenerator>,
}

impl GuidanceSources {
    pub fn new(suggestion: Arc<dyn GuidanceGenerator>, practice: Arc<dyn GuidanceGenerator>) -> Self {
        Self {
            suggestion,
            practice,
        }
    }

    /// Same generator for both kinds.
    pub fn shared(generator: Arc<dyn GuidanceGenerator>) -> Self {
        Self {
            suggestion: Arc::clone(&generator),
            practice: generator,
        }
    }

    pub fn for_kind(&self, kind: TriggerKind) -> Arc<dyn GuidanceGenerator> {
        match kind {
            TriggerKind::Suggestion => Arc::clone(&self.suggestion),
            TriggerKind::Dissonance => Arc::clone(&self.practice),
        }
    }
}

impl fmt::Debug for GuidanceSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuidanceSources").finish_non_exhaustive()
    }
}
