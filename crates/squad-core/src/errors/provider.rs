// ABOUTME: Structured error types for provider adapter operations
// ABOUTME: Distinguishes missing credentials, refresh failures, rate limits and data errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Errors raised by provider adapters
///
/// Authentication failures (missing session, failed refresh, 401) are kept apart
/// from data failures so callers can report "not linked" separately from
/// "upstream broke".
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The member has no stored session for this provider
    #[error("{provider}: member {member_id} is not authenticated")]
    NotAuthenticated {
        /// Provider identifier
        provider: String,
        /// Roster member id
        member_id: u32,
    },

    /// Credentials were rejected or could not be refreshed
    #[error("{provider} authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider identifier
        provider: String,
        /// Failure detail
        reason: String,
    },

    /// Non-success HTTP response from the provider API
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider identifier
        provider: String,
        /// HTTP status code
        status_code: u16,
        /// Response body or summary
        message: String,
        /// Whether the request may succeed on retry
        retryable: bool,
    },

    /// Provider rate limit hit and retries exhausted
    #[error("{provider} rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Provider identifier
        provider: String,
        /// Estimated seconds until the limit resets
        retry_after_secs: u64,
    },

    /// Transport-level failure (DNS, TLS, connection reset, client timeout)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response body did not match the expected shape
    #[error("{provider}: failed to parse {field}: {reason}")]
    ParseError {
        /// Provider identifier
        provider: String,
        /// Field or payload being decoded
        field: String,
        /// Decoder message
        reason: String,
    },

    /// A caller-imposed deadline elapsed before the provider answered
    #[error("{provider}: {operation} timed out after {timeout_secs}s")]
    Timeout {
        /// Provider identifier
        provider: String,
        /// Operation that was cut off
        operation: String,
        /// Deadline that elapsed
        timeout_secs: u64,
    },

    /// No adapter is registered for the provider tag
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl ProviderError {
    /// Whether retrying the same request could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::RateLimitExceeded { .. } | Self::NetworkError(_) | Self::Timeout { .. } => true,
            Self::NotAuthenticated { .. }
            | Self::AuthenticationFailed { .. }
            | Self::ParseError { .. }
            | Self::UnsupportedProvider(_) => false,
        }
    }

    /// Whether this error concerns credentials rather than data
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated { .. } | Self::AuthenticationFailed { .. }
        )
    }
}

/// Result alias for adapter operations
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server_error = ProviderError::ApiError {
            provider: "strava".to_owned(),
            status_code: 503,
            message: "unavailable".to_owned(),
            retryable: true,
        };
        assert!(server_error.is_retryable());
        assert!(!server_error.is_authentication());

        let refresh = ProviderError::AuthenticationFailed {
            provider: "strava".to_owned(),
            reason: "refresh token revoked".to_owned(),
        };
        assert!(!refresh.is_retryable());
        assert!(refresh.is_authentication());
    }

    #[test]
    fn test_timeout_message() {
        let err = ProviderError::Timeout {
            provider: "garmin".to_owned(),
            operation: "fetch_activities".to_owned(),
            timeout_secs: 20,
        };
        assert_eq!(err.to_string(), "garmin: fetch_activities timed out after 20s");
    }
}
