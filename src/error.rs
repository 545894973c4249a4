/// Errors from talking to the container runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("failed to parse {subject}: {reason}")]
    Parse { subject: String, reason: String },

    #[error("runtime rejected {operation} (status {status}): {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },
}

impl RuntimeError {
    /// Whether the error only affects the single record that triggered it.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RuntimeError::Unavailable(_))
    }

    pub fn parse(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        RuntimeError::Parse {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
