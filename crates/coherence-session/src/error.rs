use std::fmt;

#[derive(Debug)]
pub enum SessionError {
    /// `init` was called outside a tokio runtime.
    NoRuntime,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoRuntime => {
                write!(f, "coherence session must be initialized inside a tokio runtime")
            }
        }
    }
}

impl std::error::Error for SessionError {}

pub type Result<T> = std::result::Result<T, SessionError>;
