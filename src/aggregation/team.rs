// ABOUTME: Team aggregator fanning the per-member pipeline out across the whole roster
// ABOUTME: Results are slotted by roster index so output order never depends on completion order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use squad_core::errors::{AppError, AppResult};
use squad_core::models::{MemberId, ProviderKind, RosterMember, UserStatsPayload};
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::orchestrator::Orchestrator;
use super::payload::{from_outcome, stub};
use super::window::ReportWindow;
use crate::roster::RosterStore;

/// Whether a member has linked their provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Roster id
    pub id: MemberId,
    /// Display name
    pub name: String,
    /// Provider the member links through
    pub provider: ProviderKind,
    /// A session is stored for the provider
    pub authenticated: bool,
}

/// Aggregates statistics for every roster member
pub struct TeamAggregator {
    roster: Arc<RosterStore>,
    orchestrator: Orchestrator,
    fixed_today: Option<NaiveDate>,
}

impl TeamAggregator {
    /// Aggregator over `roster` using `orchestrator` for each member
    #[must_use]
    pub fn new(roster: Arc<RosterStore>, orchestrator: Orchestrator) -> Self {
        Self {
            roster,
            orchestrator,
            fixed_today: None,
        }
    }

    /// Pin "today" instead of reading the local clock
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The date requests are evaluated against
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Roster backing this aggregator
    #[must_use]
    pub const fn roster(&self) -> &Arc<RosterStore> {
        &self.roster
    }

    /// One payload per roster member, in roster order
    pub async fn team_stats(&self, window: ReportWindow) -> Vec<UserStatsPayload> {
        let members = self.roster.all_members().await;
        self.team_stats_for(&members, window).await
    }

    /// One payload per given member, in the given order
    ///
    /// Each member runs on its own task. A member whose task fails or panics
    /// gets a stub; the rest of the batch is unaffected.
    pub async fn team_stats_for(
        &self,
        members: &[RosterMember],
        window: ReportWindow,
    ) -> Vec<UserStatsPayload> {
        let today = self.today();
        let mut slots: Vec<Option<UserStatsPayload>> = vec![None; members.len()];
        let mut join_set = JoinSet::new();

        for (index, member) in members.iter().cloned().enumerate() {
            let orchestrator = self.orchestrator.clone();
            join_set.spawn(async move {
                let outcome = orchestrator.run(&member, window, today).await;
                (index, from_outcome(&member, today, outcome))
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, payload)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(payload);
                    }
                }
                Err(error) => warn!(error = %error, "member task aborted"),
            }
        }

        let payloads: Vec<UserStatsPayload> = slots
            .into_iter()
            .zip(members)
            .map(|(slot, member)| slot.unwrap_or_else(|| stub(member, today)))
            .collect();

        let stubs = payloads.iter().filter(|p| p.is_stub).count();
        info!(
            members = payloads.len(),
            stubs,
            window = %window,
            "team stats aggregated"
        );
        payloads
    }

    /// Payload for a single member
    ///
    /// # Errors
    ///
    /// Returns a not-found error when `id` is not on the roster; fetch failures
    /// and a panicking member task still produce a stub payload
    pub async fn member_stats(
        &self,
        id: MemberId,
        window: ReportWindow,
    ) -> AppResult<UserStatsPayload> {
        let member = self
            .roster
            .get_member(id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Member {id}")))?;

        let today = self.today();
        let orchestrator = self.orchestrator.clone();
        let task_member = member.clone();
        let task = tokio::spawn(async move {
            let outcome = orchestrator.run(&task_member, window, today).await;
            from_outcome(&task_member, today, outcome)
        });

        let payload = task.await.unwrap_or_else(|error| {
            warn!(member_id = member.id, error = %error, "member task aborted");
            stub(&member, today)
        });
        Ok(payload)
    }

    /// Link status for every roster member, in roster order
    pub async fn auth_status(&self) -> Vec<AuthStatus> {
        let registry = self.orchestrator.registry();
        let mut statuses = Vec::new();
        for member in self.roster.all_members().await {
            let authenticated = registry.is_authenticated(&member).await;
            statuses.push(AuthStatus {
                id: member.id,
                name: member.name,
                provider: member.provider,
                authenticated,
            });
        }
        statuses
    }
}
