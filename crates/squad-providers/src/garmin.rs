// ABOUTME: Garmin Connect adapter fetching activities, daily summaries and body composition
// ABOUTME: Converts Garmin activity search, user summary and weight range payloads into canonical records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use futures_util::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use squad_core::constants::api_provider_limits::{garmin, MAX_PAGES};
use squad_core::constants::bmi::LOOKBACK_DAYS;
use squad_core::constants::providers::GARMIN;
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

const ACTIVITY_SEARCH_ENDPOINT: &str = "activitylist-service/activities/search/activities";
const DAILY_SUMMARY_ENDPOINT: &str = "usersummary-service/usersummary/daily";
const WEIGHT_RANGE_ENDPOINT: &str = "weight-service/weight/range";

/// Day requests in flight at once when loading daily summaries
const DAILY_SUMMARY_CONCURRENCY: usize = 4;

/// Step count aliases, in the order Garmin endpoints and devices use them
const STEP_FIELDS: &[&str] = &["totalSteps", "steps", "dailySteps", "stepCount"];

/// Entry of the activity search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GarminActivityResponse {
    #[serde(default)]
    activity_id: Option<u64>,
    #[serde(default)]
    activity_name: Option<String>,
    #[serde(default)]
    activity_type: Option<GarminActivityType>,
    #[serde(default)]
    start_time_local: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    active_kilocalories: Option<f64>,
}

/// `activityType` is an object with a `typeKey` on current endpoints, a bare string on older ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GarminActivityType {
    Keyed {
        #[serde(rename = "typeKey", default)]
        type_key: String,
    },
    Plain(String),
}

impl GarminActivityType {
    fn raw(&self) -> &str {
        match self {
            Self::Keyed { type_key } => type_key,
            Self::Plain(raw) => raw,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminWeightRange {
    #[serde(default)]
    date_weight_list: Vec<GarminWeightEntry>,
    #[serde(default)]
    all_weight_metrics: Vec<GarminWeightEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminWeightEntry {
    #[serde(default)]
    calendar_date: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    date: Option<i64>,
    #[serde(default)]
    bmi: Option<f64>,
    /// Grams on most accounts
    #[serde(default)]
    weight: Option<f64>,
}

fn parse_local_date(value: &str) -> Option<NaiveDate> {
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

/// Convert one search entry; entries without a readable start date are dropped
pub(crate) fn convert_activity(raw: GarminActivityResponse) -> Option<CanonicalActivity> {
    let Some(date) = raw.start_time_local.as_deref().and_then(parse_local_date) else {
        debug!(activity_id = ?raw.activity_id, "skipping Garmin activity without start date");
        return None;
    };

    let calories = raw.calories.map_or(0, conversions::f64_to_u32);
    let active_calories = raw
        .active_kilocalories
        .map(conversions::f64_to_u32)
        .filter(|kcal| *kcal > 0)
        .unwrap_or(calories);

    Some(CanonicalActivity::new(
        raw.activity_id.map(|id| id.to_string()).unwrap_or_default(),
        raw.activity_name.unwrap_or_default(),
        raw.activity_type
            .as_ref()
            .map_or("", GarminActivityType::raw),
        date,
        calories,
        active_calories,
        raw.distance.unwrap_or_default(),
        raw.duration.unwrap_or_default(),
    ))
}

/// Read a user summary payload for `date`
pub(crate) fn convert_daily_summary(date: NaiveDate, raw: &Value) -> DailySummary {
    DailySummary {
        date,
        active_calories: conversions::first_u32(raw, &["activeKilocalories"]).unwrap_or(0),
        steps: conversions::first_u32(raw, STEP_FIELDS),
    }
}

fn weight_entries(range: GarminWeightRange) -> Vec<WeightEntry> {
    let entries = if range.date_weight_list.is_empty() {
        range.all_weight_metrics
    } else {
        range.date_weight_list
    };

    entries
        .into_iter()
        .map(|entry| WeightEntry {
            date: entry
                .calendar_date
                .as_deref()
                .and_then(parse_local_date)
                .or_else(|| {
                    entry
                        .date
                        .and_then(DateTime::from_timestamp_millis)
                        .map(|ts| ts.date_naive())
                })
                .unwrap_or(NaiveDate::MIN),
            bmi: entry.bmi,
            weight: entry.weight,
        })
        .collect()
}

/// Garmin Connect adapter bound to one member
pub struct GarminAdapter {
    credentials: MemberCredentials,
    retry_config: RetryConfig,
}

impl GarminAdapter {
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
                estimated_block_duration_secs: garmin::ESTIMATED_RATE_LIMIT_BLOCK_DURATION_SECS,
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
            kind: ProviderKind::Garmin,
            api_base_url: "https://connectapi.garmin.com".to_owned(),
            token_url: "https://connectapi.garmin.com/oauth-service/oauth/access_token".to_owned(),
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
            GARMIN,
            &self.retry_config,
        )
        .await
    }

    async fn fetch_day(&self, date: NaiveDate) -> DailySummary {
        let day = date.to_string();
        let endpoint = format!("{DAILY_SUMMARY_ENDPOINT}/{day}");
        match self
            .api_get::<Value>(&endpoint, &[("calendarDate", day.clone())])
            .await
        {
            Ok(raw) => convert_daily_summary(date, &raw),
            Err(e) => {
                debug!(
                    member_id = self.credentials.member_id(),
                    date = %day,
                    error = %e,
                    "daily summary unavailable"
                );
                DailySummary::empty(date)
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for GarminAdapter {
    fn name(&self) -> &'static str {
        GARMIN
    }

    async fn fetch_activities(&self, window: DateWindow) -> ProviderResult<Vec<CanonicalActivity>> {
        let start = window.start().to_string();
        let end = window.end().to_string();

        let raw = collect_pages(garmin::ACTIVITIES_PAGE_SIZE, MAX_PAGES, |page| {
            let query = [
                ("startDate", start.clone()),
                ("endDate", end.clone()),
                ("limit", page.size.to_string()),
                ("start", page.offset.to_string()),
            ];
            async move {
                self.api_get::<Option<Vec<GarminActivityResponse>>>(
                    ACTIVITY_SEARCH_ENDPOINT,
                    &query,
                )
                .await
                .map(Option::unwrap_or_default)
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
            "Garmin activities loaded"
        );
        Ok(activities)
    }

    async fn fetch_daily_summaries(&self, window: DateWindow) -> ProviderResult<Vec<DailySummary>> {
        // Fail fast on missing or unrefreshable credentials before fanning out per day
        self.credentials.session().await?;

        let summaries = stream::iter(window.dates())
            .map(|date| self.fetch_day(date))
            .buffered(DAILY_SUMMARY_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;
        Ok(summaries)
    }

    async fn fetch_latest_bmi(&self, as_of: NaiveDate) -> ProviderResult<Option<f64>> {
        let session = self.credentials.session().await?;
        let start = as_of
            .checked_sub_days(Days::new(LOOKBACK_DAYS))
            .unwrap_or(as_of);

        let range: Option<GarminWeightRange> = self
            .api_get(
                WEIGHT_RANGE_ENDPOINT,
                &[("startDate", start.to_string()), ("endDate", as_of.to_string())],
            )
            .await?;

        let entries = weight_entries(range.unwrap_or_default());
        Ok(resolve_bmi(&entries, session.height_m))
    }
}

/// Factory for Garmin adapters
pub struct GarminAdapterFactory;

impl AdapterFactory for GarminAdapterFactory {
    fn create(
        &self,
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Arc<dyn ProviderAdapter> {
        Arc::new(GarminAdapter::new(member_id, config, sessions))
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Garmin
    }
}
