use crate::session::Stage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RandomError {
    #[error("Random source exhausted after {drawn} draws")]
    Exhausted { drawn: usize },

    #[error("Random source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Run length must be positive, got {0}")]
    InvalidLength(usize),

    #[error("Invalid error threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidThreshold(f64),

    #[error("Record length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Sample count must be positive")]
    InvalidSampleCount,

    #[error("Randomness error: {0}")]
    Random(#[from] RandomError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} while session is {stage:?}")]
    InvalidTransition { stage: Stage, action: &'static str },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
