//! Error taxonomy for tool execution.

/// Errors a tool can fail with. Everything a tool surfaces to the dispatcher
/// goes through this type; messages must stay free of credentials.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match what the tool expects.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The Xentral API answered with a non-success status.
    #[error("Xentral API error (status {status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// The Xentral API did not answer within the configured timeout.
    #[error("Xentral API request timed out after {timeout_secs}s")]
    UpstreamTimeout { timeout_secs: u64 },

    /// Anything unexpected (transport failure, bad payload from upstream).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Stable kind label, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "invalid-arguments",
            Self::UpstreamRejected { .. } => "upstream-rejected",
            Self::UpstreamTimeout { .. } => "upstream-timeout",
            Self::Internal(_) => "unexpected-internal",
        }
    }

    /// True for the argument-shaped failures the dispatcher maps to
    /// InvalidParams rather than a tool execution error.
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, Self::InvalidArguments(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            ToolError::InvalidArguments("x".into()).kind(),
            "invalid-arguments"
        );
        assert_eq!(
            ToolError::UpstreamRejected {
                status: 401,
                message: "Unauthorized".into()
            }
            .kind(),
            "upstream-rejected"
        );
        assert_eq!(
            ToolError::UpstreamTimeout { timeout_secs: 30 }.kind(),
            "upstream-timeout"
        );
    }

    #[test]
    fn display_does_not_mention_internals() {
        let err = ToolError::UpstreamRejected {
            status: 403,
            message: "Forbidden".into(),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("Forbidden"));
    }
}
