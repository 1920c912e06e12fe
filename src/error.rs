//! Error types shared by the crate.

/// Errors raised while configuring or running a field computation.
///
/// Configuration faults are always raised before any field is computed.
#[derive(Debug, thiserror::Error)]
pub enum SolenoidError {
    #[error("Invalid solenoid: {0}")]
    InvalidSolenoid(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Field is singular at point {index}, which lies on a winding")]
    SingularPoint { index: usize },

    #[error("Field computation was cancelled")]
    Cancelled,

    #[error("Worker pool failure: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SolenoidError>;
