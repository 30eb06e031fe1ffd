//! Error types for the transcript-routing pipeline.

/// Top-level error type for the dictation router.
///
/// Domain-level drops (echo, unclassified, duplicate, busy) are not errors —
/// they are logged and ignored. This type only covers ambient failures.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration load or parse error.
    #[error("config error: {0}")]
    Config(String),

    /// Router task communication error (channel closed, task gone).
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RouterError>;
