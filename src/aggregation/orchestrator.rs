// ABOUTME: Per-member aggregation: concurrent window fetches plus a bounded pool of month fetches
// ABOUTME: A failing month degrades to an empty month with the window BMI; siblings are unaffected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use squad_core::constants::rollups::{DEFAULT_MONTH_CONCURRENCY, TRAILING_MONTHS};
use squad_core::errors::{ProviderError, ProviderResult};
use squad_core::models::{CanonicalActivity, DateWindow, MemberId, MonthKey, RosterMember};
use squad_providers::{AdapterRegistry, ProviderAdapter};
use squad_rollups::{compile_stats, CompiledStats, MonthData, WindowData};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::window::ReportWindow;

/// What the orchestrator produced for one member
#[derive(Debug, Clone, PartialEq)]
pub enum MemberOutcome {
    /// Data was fetched and compiled
    Stats(Box<CompiledStats>),
    /// The member has no stored session; nothing was fetched
    NoData,
}

/// Runs the fetch-and-compile pipeline for single members
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<AdapterRegistry>,
    month_concurrency: usize,
    fetch_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Orchestrator dispatching through `registry` with the default month pool width
    #[must_use]
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            month_concurrency: DEFAULT_MONTH_CONCURRENCY,
            fetch_timeout: None,
        }
    }

    /// Limit concurrent month fetches per member (minimum 1)
    #[must_use]
    pub fn with_month_concurrency(mut self, width: usize) -> Self {
        self.month_concurrency = width.max(1);
        self
    }

    /// Apply a deadline to every adapter call
    #[must_use]
    pub fn with_fetch_timeout(mut self, deadline: Option<Duration>) -> Self {
        self.fetch_timeout = deadline;
        self
    }

    /// Registry used to resolve adapters
    #[must_use]
    pub const fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// Fetch and compile statistics for `member`
    ///
    /// Daily-summary and BMI failures degrade to empty values; month failures
    /// degrade to empty months. Only an unsupported provider or a failed
    /// window activity fetch is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns the provider error that prevented the window activities from
    /// being fetched
    #[instrument(skip(self, member), fields(member_id = member.id, provider = %member.provider))]
    pub async fn run(
        &self,
        member: &RosterMember,
        window: ReportWindow,
        today: NaiveDate,
    ) -> ProviderResult<MemberOutcome> {
        let adapter = self.registry.adapter_for(member)?;

        if !self.registry.is_authenticated(member).await {
            debug!("no stored session, skipping fetch");
            return Ok(MemberOutcome::NoData);
        }

        let date_window = window.resolve(today);
        let name = adapter.name();
        let (activities, summaries, bmi) = tokio::join!(
            with_deadline(
                self.fetch_timeout,
                name,
                "fetch_activities",
                adapter.fetch_activities(date_window)
            ),
            with_deadline(
                self.fetch_timeout,
                name,
                "fetch_daily_summaries",
                adapter.fetch_daily_summaries(date_window)
            ),
            with_deadline(
                self.fetch_timeout,
                name,
                "fetch_latest_bmi",
                adapter.fetch_latest_bmi(today)
            ),
        );

        let activities = activities?;
        let summaries = summaries.unwrap_or_else(|error| {
            warn!(member_id = member.id, error = %error, "daily summaries unavailable");
            Vec::new()
        });
        let bmi = bmi.unwrap_or_else(|error| {
            warn!(member_id = member.id, error = %error, "latest BMI unavailable");
            None
        });

        let months = self.fetch_months(&adapter, member.id, today, bmi).await;

        let stats = compile_stats(
            today,
            window.scaling(),
            &WindowData {
                window: date_window,
                activities: &activities,
                summaries: &summaries,
                bmi,
            },
            &months,
        );
        debug!(
            workouts = stats.totals.workouts,
            km = stats.totals.km,
            "member stats compiled"
        );
        Ok(MemberOutcome::Stats(Box::new(stats)))
    }

    /// Fetch the trailing months on a bounded task pool
    ///
    /// Every slot starts as an empty month carrying `window_bmi`, so a month
    /// that fails, panics or times out keeps that default.
    async fn fetch_months(
        &self,
        adapter: &Arc<dyn ProviderAdapter>,
        member_id: MemberId,
        today: NaiveDate,
        window_bmi: Option<f64>,
    ) -> Vec<MonthData> {
        let keys = MonthKey::trailing(today, TRAILING_MONTHS);
        let mut slots: Vec<MonthData> = keys
            .iter()
            .map(|&key| MonthData {
                key,
                activities: Vec::new(),
                bmi: window_bmi,
            })
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.month_concurrency));
        let mut join_set = JoinSet::new();
        for (index, key) in keys.into_iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let semaphore = Arc::clone(&semaphore);
            let deadline = self.fetch_timeout;
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = fetch_month(adapter.as_ref(), key, today, deadline).await;
                (index, key, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, key, Ok((activities, month_bmi)))) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = MonthData {
                            key,
                            activities,
                            bmi: month_bmi.or(window_bmi),
                        };
                    }
                }
                Ok((_, key, Err(error))) => {
                    warn!(
                        member_id,
                        month = %key,
                        error = %error,
                        "month fetch failed, using empty month"
                    );
                }
                Err(error) => {
                    warn!(member_id, error = %error, "month task aborted, using empty month");
                }
            }
        }
        slots
    }
}

/// Activities for one month plus the BMI as of its last day (capped at today)
///
/// A BMI failure is not a month failure: the caller falls back to the window BMI.
async fn fetch_month(
    adapter: &dyn ProviderAdapter,
    key: MonthKey,
    today: NaiveDate,
    deadline: Option<Duration>,
) -> ProviderResult<(Vec<CanonicalActivity>, Option<f64>)> {
    let name = adapter.name();
    let as_of = key.last_day().min(today);
    let (activities, bmi) = tokio::join!(
        with_deadline(
            deadline,
            name,
            "fetch_activities",
            adapter.fetch_activities(DateWindow::for_month(key))
        ),
        with_deadline(deadline, name, "fetch_latest_bmi", adapter.fetch_latest_bmi(as_of)),
    );

    let bmi = bmi.unwrap_or_else(|error| {
        debug!(month = %key, error = %error, "month-end BMI unavailable");
        None
    });
    Ok((activities?, bmi))
}

/// Await `call`, turning an elapsed deadline into `ProviderError::Timeout`
async fn with_deadline<T, F>(
    deadline: Option<Duration>,
    provider: &str,
    operation: &str,
    call: F,
) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    let Some(limit) = deadline else {
        return call.await;
    };
    timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::Timeout {
                provider: provider.to_owned(),
                operation: operation.to_owned(),
                timeout_secs: limit.as_secs(),
            })
        })
}
