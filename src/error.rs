//! Error types for wheel resolution and spinning.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WheelError {
    #[error("wheel has no entries")]
    EmptyWheel,

    #[error("forced entry {0:?} is not on the wheel")]
    ForcedNotFound(String),

    #[error("a spin is already in progress")]
    AlreadySpinning,

    #[error("font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, WheelError>;
