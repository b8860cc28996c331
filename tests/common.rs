// ABOUTME: Shared helpers for aggregation integration tests
// ABOUTME: Scripted provider adapters with randomized latency, injected failures and call counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use squad_core::errors::{ProviderError, ProviderResult};
use squad_core::models::{
    CanonicalActivity, DailySummary, DateWindow, MemberId, MonthKey, ProviderKind,
    ProviderSession, RosterMember,
};
use squad_providers::{
    AdapterFactory, AdapterRegistry, InMemorySessionStore, ProviderAdapter, ProviderConfig,
    SessionStore,
};
use squad_stats::aggregation::{Orchestrator, TeamAggregator};
use squad_stats::roster::RosterStore;
use tokio::time::sleep;

/// Date every aggregation test is evaluated on
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn days_ago(n: i64) -> NaiveDate {
    today() - ChronoDuration::days(n)
}

pub fn run(id: &str, date: NaiveDate, meters: f64, active_kcal: u32) -> CanonicalActivity {
    CanonicalActivity::new(
        id,
        "Run",
        "running",
        date,
        active_kcal + 80,
        active_kcal,
        meters,
        1_800.0,
    )
}

pub fn member(id: MemberId, name: &str, provider: ProviderKind) -> RosterMember {
    RosterMember {
        id,
        provider,
        name: name.to_owned(),
        role: "Athlete".to_owned(),
        types: vec!["Running".to_owned()],
        ..RosterMember::default()
    }
}

/// What a scripted adapter returns for one member
#[derive(Clone, Default)]
pub struct MemberPlan {
    /// Activities served, filtered to the requested window
    pub activities: Vec<CanonicalActivity>,
    /// Daily summaries served, filtered to the requested window
    pub summaries: Vec<DailySummary>,
    /// BMI readings; the latest on or before `as_of` is returned
    pub bmi_history: Vec<(NaiveDate, f64)>,
    /// Months whose activity fetch fails
    pub failing_months: Vec<MonthKey>,
    /// Window activity fetch fails
    pub fail_window: bool,
    /// Any fetch panics
    pub panic: bool,
    /// Delay added to every call
    pub base_latency_ms: u64,
    /// Upper bound of the random delay added on top of `base_latency_ms`
    pub max_latency_ms: u64,
}

/// Adapter replaying a [`MemberPlan`]
pub struct ScriptedAdapter {
    plan: MemberPlan,
    calls: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
    async fn pause(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let jitter = rand::thread_rng().gen_range(0..=self.plan.max_latency_ms);
        let delay = self.plan.base_latency_ms + jitter;
        if delay > 0 {
            sleep(Duration::from_millis(delay)).await;
        }
        assert!(!self.plan.panic, "scripted adapter panic");
    }

    fn is_month_window(window: DateWindow) -> Option<MonthKey> {
        let key = MonthKey::containing(window.start());
        (DateWindow::for_month(key) == window).then_some(key)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_activities(&self, window: DateWindow) -> ProviderResult<Vec<CanonicalActivity>> {
        self.pause().await;
        let failing = match Self::is_month_window(window) {
            Some(key) => self.plan.failing_months.contains(&key),
            None => self.plan.fail_window,
        };
        if failing {
            return Err(ProviderError::ApiError {
                provider: "scripted".to_owned(),
                status_code: 503,
                message: format!("injected failure for {}..{}", window.start(), window.end()),
                retryable: true,
            });
        }
        Ok(self
            .plan
            .activities
            .iter()
            .filter(|a| window.contains(a.date))
            .cloned()
            .collect())
    }

    async fn fetch_daily_summaries(&self, window: DateWindow) -> ProviderResult<Vec<DailySummary>> {
        self.pause().await;
        Ok(self
            .plan
            .summaries
            .iter()
            .filter(|s| window.contains(s.date))
            .cloned()
            .collect())
    }

    async fn fetch_latest_bmi(&self, as_of: NaiveDate) -> ProviderResult<Option<f64>> {
        self.pause().await;
        Ok(self
            .plan
            .bmi_history
            .iter()
            .filter(|(date, _)| *date <= as_of)
            .max_by_key(|(date, _)| *date)
            .map(|(_, bmi)| *bmi))
    }
}

/// Factory serving scripted adapters for one provider
pub struct ScriptedFactory {
    kind: ProviderKind,
    plans: HashMap<MemberId, MemberPlan>,
    calls: Arc<AtomicUsize>,
}

impl AdapterFactory for ScriptedFactory {
    fn create(
        &self,
        member_id: MemberId,
        _config: ProviderConfig,
        _sessions: Arc<dyn SessionStore>,
    ) -> Arc<dyn ProviderAdapter> {
        Arc::new(ScriptedAdapter {
            plan: self.plans.get(&member_id).cloned().unwrap_or_default(),
            calls: Arc::clone(&self.calls),
        })
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }
}

/// Builder for a registry of scripted adapters and the sessions they need
pub struct Harness {
    sessions: Arc<InMemorySessionStore>,
    plans: HashMap<ProviderKind, HashMap<MemberId, MemberPlan>>,
    pub calls: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            plans: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Give `member` a stored session and a plan
    pub async fn linked(mut self, member: &RosterMember, plan: MemberPlan) -> Self {
        self.sessions
            .save(
                member.id,
                member.provider,
                &ProviderSession::with_access_token(format!("token-{}", member.id)),
            )
            .await
            .unwrap();
        self.plans
            .entry(member.provider)
            .or_default()
            .insert(member.id, plan);
        self
    }

    pub fn registry(&self) -> Arc<AdapterRegistry> {
        let sessions: Arc<dyn SessionStore> = self.sessions.clone();
        let mut registry = AdapterRegistry::new(sessions);
        for kind in ProviderKind::ALL {
            registry.register(
                Box::new(ScriptedFactory {
                    kind,
                    plans: self.plans.get(&kind).cloned().unwrap_or_default(),
                    calls: Arc::clone(&self.calls),
                }),
                ProviderConfig {
                    kind,
                    api_base_url: "http://scripted.invalid".to_owned(),
                    token_url: "http://scripted.invalid/token".to_owned(),
                    client_id: String::new(),
                    client_secret: String::new(),
                },
            );
        }
        Arc::new(registry)
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.registry())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Roster file in a temp directory seeded with `members`
pub async fn roster_with(dir: &tempfile::TempDir, members: &[RosterMember]) -> Arc<RosterStore> {
    let path = dir.path().join("members.json");
    fs::write(&path, serde_json::to_vec_pretty(members).unwrap()).unwrap();
    Arc::new(RosterStore::open(&path).await.unwrap())
}

pub fn aggregator(roster: Arc<RosterStore>, harness: &Harness) -> TeamAggregator {
    TeamAggregator::new(roster, harness.orchestrator()).with_today(today())
}
