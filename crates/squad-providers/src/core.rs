// ABOUTME: Provider adapter capability contract and the factory that binds adapters to members
// ABOUTME: Every provider exposes the same three fetches over an inclusive date window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Provider Adapter Contract
//!
//! The aggregation pipeline never branches on the provider: it asks the
//! [`AdapterRegistry`](crate::registry::AdapterRegistry) for an adapter bound to
//! a roster member and calls the three capability methods below.
//!
//! Adapters own their wire format. They:
//! - fail fast with `NotAuthenticated` when the member has no stored session
//! - refresh tokens that are about to expire and persist the refreshed session
//! - filter activities client-side on the local calendar date
//! - return canonical records, never raw provider JSON

use async_trait::async_trait;
use chrono::NaiveDate;
use squad_core::errors::ProviderResult;
use squad_core::models::{CanonicalActivity, DailySummary, DateWindow, MemberId, ProviderKind};
use std::sync::Arc;

use crate::session::SessionStore;

/// Fetch capabilities every provider implements
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider identifier
    fn name(&self) -> &'static str;

    /// Activities whose local start date falls inside `window`
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a stored session, `AuthenticationFailed` when
    /// the token is rejected or cannot be refreshed, otherwise transport and
    /// decoding errors.
    async fn fetch_activities(&self, window: DateWindow) -> ProviderResult<Vec<CanonicalActivity>>;

    /// Per-day wellness totals for `window`
    ///
    /// Providers without a daily endpoint return an empty list.
    ///
    /// # Errors
    ///
    /// Same classes as [`ProviderAdapter::fetch_activities`]
    async fn fetch_daily_summaries(&self, window: DateWindow) -> ProviderResult<Vec<DailySummary>>;

    /// Most recent BMI known on `as_of`, `None` when nothing valid is recorded
    ///
    /// # Errors
    ///
    /// Authentication and transport errors only; missing data is `Ok(None)`.
    async fn fetch_latest_bmi(&self, as_of: NaiveDate) -> ProviderResult<Option<f64>>;
}

/// Endpoints and client credentials for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider this configuration belongs to
    pub kind: ProviderKind,
    /// Base URL for data requests, no trailing slash
    pub api_base_url: String,
    /// OAuth token endpoint used for refresh
    pub token_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl ProviderConfig {
    /// Join `endpoint` onto the base URL
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Creates adapters bound to a single member
pub trait AdapterFactory: Send + Sync {
    /// Build an adapter for `member_id` that reads and writes sessions through `sessions`
    fn create(
        &self,
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Arc<dyn ProviderAdapter>;

    /// Provider this factory builds adapters for
    fn provider(&self) -> ProviderKind;
}
