// ABOUTME: Stored provider credentials for one member
// ABOUTME: Access and refresh tokens with expiry plus the height used for BMI computation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Provider session owned by a session store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Bearer token for data requests
    pub access_token: String,
    /// Token used to obtain a new access token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Member height in meters, when known
    #[serde(default)]
    pub height_m: Option<f64>,
}

impl ProviderSession {
    /// Session holding only an access token
    #[must_use]
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            height_m: None,
        }
    }

    /// Whether the token expires within `threshold` of `now`
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + threshold > expires_at)
    }
}
