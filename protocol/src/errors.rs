use thiserror::Error;

/// A single `data: ` line whose payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("malformed fragment payload: {0}")]
    Malformed(String),
}

/// Failures a streaming exchange can end with, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The relay reported an in-band `error` event.
    #[error("{0}")]
    Provider(String),

    /// The relay refused the request before streaming began.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// A caller-imposed deadline elapsed.
    #[error("Request timed out. Please try again.")]
    Timeout,

    #[error("stream cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(String),
}

impl StreamError {
    /// Whether the failure is worth offering a retry for.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Timeout | StreamError::Transport(_) => true,
            StreamError::Http { status, .. } => *status >= 500 || *status == 429,
            StreamError::Provider(_) | StreamError::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_is_offered_for_transient_failures_only() {
        assert!(StreamError::Timeout.is_retryable());
        assert!(StreamError::Transport("offline".into()).is_retryable());
        assert!(StreamError::Http { status: 503, message: "down".into() }.is_retryable());
        assert!(StreamError::Http { status: 429, message: "slow down".into() }.is_retryable());

        assert!(!StreamError::Http { status: 400, message: "bad".into() }.is_retryable());
        assert!(!StreamError::Http { status: 401, message: "who".into() }.is_retryable());
        assert!(!StreamError::Cancelled.is_retryable());
        assert!(!StreamError::Provider("refused".into()).is_retryable());
    }

    #[test]
    fn timeout_message_suggests_retrying() {
        assert_eq!(StreamError::Timeout.to_string(), "Request timed out. Please try again.");
    }
}
