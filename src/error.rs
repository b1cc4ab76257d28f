//! Error types shared across the crate.
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors raised by network construction, training, and persistence.
#[derive(Debug, Error)]
pub enum NetError {
    /// Invalid construction or training parameter (non-positive size,
    /// learning rate, epoch count, batch size).
    #[error("configuration error: {0}")]
    Config(String),

    /// Dimension or index mismatch between collaborating pieces.
    #[error("shape error: {0}")]
    Shape(String),

    /// An operation required a binding the layer does not have.
    #[error("state error: {0}")]
    State(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl NetError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        NetError::Config(msg.into())
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        NetError::Shape(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        NetError::State(msg.into())
    }
}
