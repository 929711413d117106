//! Errors surfaced by the grading and report round-trips.
//!
//! Each variant maps one HTTP failure mode of a provider call. The engine
//! never retries these: a failed grading call becomes an incorrect verdict
//! and a failed report call becomes the placeholder narrative, so the
//! messages here exist for logs and for startup checks.

use thiserror::Error;

/// A provider round-trip (grading or report generation) failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 429 from the provider, with the advertised back-off.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Invalid or missing API key (401, or 403 from Gemini).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The configured grading model does not exist. Gemini reports this as
    /// a 404 on the `generateContent` path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other error status from the provider API.
    #[error("provider returned HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    /// No reply within the HTTP client timeout.
    #[error("no reply from the model within {0}s")]
    Timeout(u64),

    /// The provider could not be reached at all.
    #[error("network error: {0}")]
    NetworkError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_diagnostic_detail() {
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_ms: 7000
            }
            .to_string(),
            "rate limited, retry after 7000ms"
        );
        assert_eq!(
            ProviderError::ModelNotFound("gemini-1.5-flash".into()).to_string(),
            "model not found: gemini-1.5-flash"
        );
        assert_eq!(
            ProviderError::ApiError {
                status: 500,
                message: "internal error".into()
            }
            .to_string(),
            "provider returned HTTP 500: internal error"
        );
        assert_eq!(
            ProviderError::Timeout(120).to_string(),
            "no reply from the model within 120s"
        );
        assert!(ProviderError::AuthenticationFailed("bad key".into())
            .to_string()
            .starts_with("authentication failed"));
    }
}
