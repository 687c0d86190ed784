//! Session lifecycle for the coherence engine.
//!
//! A [`CoherenceSession`] owns the score, the trigger evaluator and the
//! cooldown for one user session. The journal pushes snapshots into it on
//! every append; guidance text is fetched on tokio tasks and applied only if
//! the slot it was fetched for is still pending.

pub mod error;
pub mod generator;
pub mod session;

pub use error::{Result, SessionError};
pub use generator::{GenerateError, GuidanceFuture, GuidanceGenerator, GuidanceSources};
pub use session::{CoherenceSession, DEFAULT_FETCH_TIMEOUT, SessionBuilder};
