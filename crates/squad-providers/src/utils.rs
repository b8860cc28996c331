// ABOUTME: Shared utilities for provider adapters
// ABOUTME: Numeric conversions, authenticated GET with 429 backoff, OAuth token refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use squad_core::constants::oauth::REFRESH_THRESHOLD_MINUTES;
use squad_core::errors::{ProviderError, ProviderResult};
use squad_core::models::ProviderSession;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts for a retryable status
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds, doubled per attempt
    pub initial_backoff_ms: u64,
    /// HTTP status codes that trigger a retry
    pub retryable_status_codes: Vec<StatusCode>,
    /// Estimated block duration reported once retries are exhausted (seconds)
    pub estimated_block_duration_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            retryable_status_codes: vec![StatusCode::TOO_MANY_REQUESTS],
            estimated_block_duration_secs: 3600,
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (1-based)
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// Type conversion utilities for provider JSON numbers
pub mod conversions {
    use serde_json::Value;

    /// Clamp a JSON float into `u32`, treating negatives and NaN as zero
    #[must_use]
    pub fn f64_to_u32(value: f64) -> u32 {
        if value.is_nan() {
            return 0;
        }
        value.max(0.0).min(f64::from(u32::MAX)) as u32
    }

    /// Read the first positive numeric field among `keys` as `u32`
    ///
    /// Absent, null and zero fields are skipped so a later alias can supply the value.
    #[must_use]
    pub fn first_u32(value: &Value, keys: &[&str]) -> Option<u32> {
        keys.iter()
            .filter_map(|key| value.get(*key))
            .filter_map(Value::as_f64)
            .find(|n| *n > 0.0)
            .map(f64_to_u32)
    }
}

/// Authenticated GET with exponential backoff on retryable statuses
///
/// # Errors
///
/// - `NetworkError` when the request cannot be sent
/// - `RateLimitExceeded` once retries on a retryable status are exhausted
/// - `AuthenticationFailed` on 401
/// - `ApiError` on any other non-success status (retryable when 5xx)
/// - `ParseError` when the body is not the expected JSON
pub async fn api_get_with_retry<T>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    access_token: &str,
    provider_name: &str,
    retry_config: &RetryConfig,
) -> ProviderResult<T>
where
    T: DeserializeOwned,
{
    debug!(provider = provider_name, url, "provider API request");

    let mut attempt = 0;
    loop {
        let response = client
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("{provider_name}: {e}")))?;

        let status = response.status();

        if retry_config.retryable_status_codes.contains(&status) {
            attempt += 1;
            if attempt >= retry_config.max_retries {
                let max_retries = retry_config.max_retries;
                warn!(
                    provider = provider_name,
                    status = status.as_u16(),
                    "rate limit exceeded, max retries ({max_retries}) reached"
                );
                return Err(ProviderError::RateLimitExceeded {
                    provider: provider_name.to_owned(),
                    retry_after_secs: retry_config.estimated_block_duration_secs,
                });
            }

            let backoff = retry_config.backoff_for(attempt);
            warn!(
                provider = provider_name,
                status = status.as_u16(),
                attempt,
                backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                "rate limited, backing off"
            );
            sleep(backoff).await;
            continue;
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationFailed {
                provider: provider_name.to_owned(),
                reason: "access token rejected (401)".to_owned(),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                provider: provider_name.to_owned(),
                status_code: status.as_u16(),
                message: text,
                retryable: status.is_server_error(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("{provider_name}: {e}")))?;

        return serde_json::from_slice(&body).map_err(|e| ProviderError::ParseError {
            provider: provider_name.to_owned(),
            field: url.to_owned(),
            reason: e.to_string(),
        });
    }
}

/// Standard token refresh response structure
#[derive(Debug, Deserialize)]
pub struct TokenRefreshResponse {
    /// New access token
    pub access_token: String,
    /// Rotated refresh token, when the provider rotates them
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry as a unix timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Client credentials used for the refresh grant
#[derive(Debug, Clone, Copy)]
pub struct RefreshRequest<'a> {
    /// Token endpoint
    pub token_url: &'a str,
    /// OAuth client id
    pub client_id: &'a str,
    /// OAuth client secret
    pub client_secret: &'a str,
    /// Provider name for errors and logs
    pub provider_name: &'a str,
}

/// Exchange `session`'s refresh token for a new access token
///
/// The returned session keeps the stored height and, when the provider does
/// not rotate refresh tokens, the original refresh token.
///
/// # Errors
///
/// Returns `AuthenticationFailed` when there is no refresh token, the token
/// endpoint cannot be reached, answers with a non-success status, or returns
/// an unreadable body.
pub async fn refresh_oauth_token(
    client: &Client,
    request: RefreshRequest<'_>,
    session: &ProviderSession,
) -> ProviderResult<ProviderSession> {
    let provider = request.provider_name;
    let auth_failed = |reason: String| ProviderError::AuthenticationFailed {
        provider: provider.to_owned(),
        reason,
    };

    let refresh_token = session
        .refresh_token
        .as_deref()
        .ok_or_else(|| auth_failed("token expired and no refresh token is stored".to_owned()))?;

    debug!(provider, "refreshing access token");

    let params = [
        ("client_id", request.client_id),
        ("client_secret", request.client_secret),
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = client
        .post(request.token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| auth_failed(format!("token refresh request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(auth_failed(format!("token refresh failed with status {status}")));
    }

    let token_response: TokenRefreshResponse = response
        .json()
        .await
        .map_err(|e| auth_failed(format!("unreadable token refresh response: {e}")))?;

    Ok(ProviderSession {
        access_token: token_response.access_token,
        refresh_token: token_response
            .refresh_token
            .or_else(|| session.refresh_token.clone()),
        expires_at: resolve_expiry(token_response.expires_at, token_response.expires_in),
        height_m: session.height_m,
    })
}

fn resolve_expiry(expires_at: Option<i64>, expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_at
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .or_else(|| expires_in.map(|secs| Utc::now() + ChronoDuration::seconds(secs)))
}

/// Whether the session's token expires within the refresh threshold
#[must_use]
pub fn needs_token_refresh(session: &ProviderSession) -> bool {
    session.expires_within(
        Utc::now(),
        ChronoDuration::minutes(REFRESH_THRESHOLD_MINUTES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig {
            initial_backoff_ms: 100,
            ..RetryConfig::default()
        };
        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_needs_token_refresh_threshold() {
        let mut session = ProviderSession::with_access_token("abc");
        assert!(!needs_token_refresh(&session));

        session.expires_at = Some(Utc::now() + ChronoDuration::minutes(4));
        assert!(needs_token_refresh(&session));

        session.expires_at = Some(Utc::now() + ChronoDuration::hours(2));
        assert!(!needs_token_refresh(&session));
    }

    #[test]
    fn test_first_u32_reads_alternate_keys() {
        let summary = json!({"totalSteps": 0, "dailySteps": 8123.0, "steps": null});
        assert_eq!(
            conversions::first_u32(&summary, &["totalSteps", "steps", "dailySteps"]),
            Some(8123)
        );
        assert_eq!(conversions::first_u32(&summary, &["stepCount"]), None);
        assert_eq!(conversions::f64_to_u32(-5.0), 0);
        assert_eq!(conversions::f64_to_u32(f64::NAN), 0);
    }

    #[test]
    fn test_resolve_expiry_prefers_absolute() {
        let absolute = resolve_expiry(Some(1_700_000_000), Some(10)).unwrap();
        assert_eq!(absolute.timestamp(), 1_700_000_000);
        assert!(resolve_expiry(None, None).is_none());
    }
}
