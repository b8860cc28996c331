// ABOUTME: Strava adapter fetching athlete activities and athlete weight
// ABOUTME: Pages /athlete/activities by epoch bounds and filters on the local start date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use squad_core::constants::api_provider_limits::{strava, MAX_PAGES};
use squad_core::constants::providers::STRAVA;
use squad_core::errors::ProviderResult;
use squad_core::models::{CanonicalActivity, DailySummary, DateWindow, MemberId, ProviderKind};
use std::sync::Arc;
use tracing::debug;

use crate::bmi::{resolve_bmi, WeightEntry};
use crate::core::{AdapterFactory, ProviderAdapter, ProviderConfig};
use crate::credentials::MemberCredentials;
use crate::http_client::shared_client;
use crate::pagination::collect_pages;
use crate::session::SessionStore;
use crate::utils::{self, conversions, RetryConfig};

const ATHLETE_ENDPOINT: &str = "athlete";
const ATHLETE_ACTIVITIES_ENDPOINT: &str = "athlete/activities";

/// Summary activity from `/athlete/activities`
#[derive(Debug, Deserialize)]
pub(crate) struct StravaActivityResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sport_type: Option<String>,
    #[serde(rename = "type", default)]
    activity_type: Option<String>,
    #[serde(default)]
    start_date_local: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    moving_time: Option<f64>,
    #[serde(default)]
    calories: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StravaAthleteResponse {
    /// Kilograms
    #[serde(default)]
    weight: Option<f64>,
}

/// Convert one activity; Strava reports a single calorie figure used for both totals
pub(crate) fn convert_activity(raw: StravaActivityResponse) -> Option<CanonicalActivity> {
    let date = raw
        .start_date_local
        .as_deref()
        .and_then(|value| value.get(..10))
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
    let Some(date) = date else {
        debug!(activity_id = ?raw.id, "skipping Strava activity without start date");
        return None;
    };

    let raw_type = raw
        .sport_type
        .filter(|value| !value.is_empty())
        .or(raw.activity_type)
        .unwrap_or_default();
    let calories = raw.calories.map_or(0, conversions::f64_to_u32);

    Some(CanonicalActivity::new(
        raw.id.map(|id| id.to_string()).unwrap_or_default(),
        raw.name.unwrap_or_default(),
        &raw_type,
        date,
        calories,
        calories,
        raw.distance.unwrap_or_default(),
        raw.moving_time.unwrap_or_default(),
    ))
}

/// Unix bounds covering the whole window in UTC: start of the first day, last second of the last
fn epoch_bounds(window: DateWindow) -> (i64, i64) {
    let after = window.start().and_time(NaiveTime::MIN).and_utc().timestamp();
    let before = window
        .end()
        .and_hms_opt(23, 59, 59)
        .map_or(after, |end| end.and_utc().timestamp());
    (after, before)
}

/// Strava adapter bound to one member
pub struct StravaAdapter {
    credentials: MemberCredentials,
    retry_config: RetryConfig,
}

impl StravaAdapter {
    /// Adapter using the shared HTTP client
    #[must_use]
    pub fn new(
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self::with_client(member_id, config, sessions, shared_client().clone())
    }

    /// Adapter using a caller-supplied HTTP client
    #[must_use]
    pub fn with_client(
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
        client: Client,
    ) -> Self {
        Self {
            credentials: MemberCredentials::new(member_id, config, sessions, client),
            retry_config: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 1000,
                retryable_status_codes: vec![StatusCode::TOO_MANY_REQUESTS],
                estimated_block_duration_secs: strava::ESTIMATED_RATE_LIMIT_BLOCK_DURATION_SECS,
            },
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Production endpoints, without client credentials
    #[must_use]
    pub fn default_config() -> ProviderConfig {
        ProviderConfig {
            kind: ProviderKind::Strava,
            api_base_url: "https://www.strava.com/api/v3".to_owned(),
            token_url: "https://www.strava.com/oauth/token".to_owned(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }

    async fn api_get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        let access_token = self.credentials.access_token().await?;
        let url = self.credentials.config().endpoint_url(endpoint);
        utils::api_get_with_retry(
            self.credentials.client(),
            &url,
            query,
            &access_token,
            STRAVA,
            &self.retry_config,
        )
        .await
    }
}

#[async_trait]
impl ProviderAdapter for StravaAdapter {
    fn name(&self) -> &'static str {
        STRAVA
    }

    async fn fetch_activities(&self, window: DateWindow) -> ProviderResult<Vec<CanonicalActivity>> {
        let (after, before) = epoch_bounds(window);

        let raw = collect_pages(strava::ACTIVITIES_PAGE_SIZE, MAX_PAGES, |page| {
            let query = [
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("per_page", page.size.to_string()),
                ("page", page.number().to_string()),
            ];
            async move {
                self.api_get::<Vec<StravaActivityResponse>>(ATHLETE_ACTIVITIES_ENDPOINT, &query)
                    .await
            }
        })
        .await?;

        let fetched = raw.len();
        let activities: Vec<CanonicalActivity> = raw
            .into_iter()
            .filter_map(convert_activity)
            .filter(|activity| window.contains(activity.date))
            .collect();

        debug!(
            member_id = self.credentials.member_id(),
            %window,
            fetched,
            kept = activities.len(),
            "Strava activities loaded"
        );
        Ok(activities)
    }

    async fn fetch_daily_summaries(
        &self,
        _window: DateWindow,
    ) -> ProviderResult<Vec<DailySummary>> {
        // No daily wellness endpoint; still surface credential problems
        self.credentials.session().await?;
        Ok(Vec::new())
    }

    async fn fetch_latest_bmi(&self, as_of: NaiveDate) -> ProviderResult<Option<f64>> {
        let session = self.credentials.session().await?;
        let athlete: StravaAthleteResponse = self.api_get(ATHLETE_ENDPOINT, &[]).await?;

        let entries = [WeightEntry {
            date: as_of,
            bmi: None,
            weight: athlete.weight,
        }];
        Ok(resolve_bmi(&entries, session.height_m))
    }
}

/// Factory for Strava adapters
pub struct StravaAdapterFactory;

impl AdapterFactory for StravaAdapterFactory {
    fn create(
        &self,
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Arc<dyn ProviderAdapter> {
        Arc::new(StravaAdapter::new(member_id, config, sessions))
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Strava
    }
}
