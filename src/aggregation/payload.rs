// ABOUTME: Payload assembler combining roster identity with compiled stats, or a zeroed stub
// ABOUTME: Never fails: any orchestration error or missing data becomes a stub payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::NaiveDate;
use squad_core::constants::rollups::{TRAILING_MONTHS, WEEK_DAYS};
use squad_core::models::{KmSplit, MonthKey, MonthSummary, RosterMember, UserStatsPayload};
use squad_rollups::CompiledStats;
use tracing::warn;

use super::orchestrator::MemberOutcome;

/// Payload built from compiled stats
///
/// `types` falls back to the member's declared types when no activity was seen
/// in the window.
#[must_use]
pub fn assemble(member: &RosterMember, stats: &CompiledStats) -> UserStatsPayload {
    let types = if stats.totals.types.is_empty() {
        member.types.clone()
    } else {
        stats.totals.types.clone()
    };

    UserStatsPayload {
        types,
        calories: stats.totals.calories,
        workouts: stats.totals.workouts,
        km: stats.totals.km,
        split: stats.totals.split,
        act_kcal: stats.totals.active_calories,
        steps: stats.steps,
        bmi: stats.bmi,
        week: stats.week.active,
        week_calories: stats.week.calories,
        km_by_type: stats.totals.km_by_type.clone(),
        monthly: stats.monthly.clone(),
        is_stub: false,
        ..identity(member)
    }
}

/// Zeroed payload for a member whose data could not be produced
///
/// The monthly history still lists the twelve trailing months ending with the
/// month of `today`, each with a zeroed 28-day series.
#[must_use]
pub fn stub(member: &RosterMember, today: NaiveDate) -> UserStatsPayload {
    UserStatsPayload {
        types: member.types.clone(),
        monthly: MonthKey::trailing(today, TRAILING_MONTHS)
            .into_iter()
            .map(MonthSummary::empty)
            .collect(),
        is_stub: true,
        ..identity(member)
    }
}

/// Turn an orchestration result into a payload, logging failures
#[must_use]
pub fn from_outcome<E: Display>(
    member: &RosterMember,
    today: NaiveDate,
    outcome: Result<MemberOutcome, E>,
) -> UserStatsPayload {
    match outcome {
        Ok(MemberOutcome::Stats(stats)) => assemble(member, &stats),
        Ok(MemberOutcome::NoData) => stub(member, today),
        Err(error) => {
            warn!(
                member_id = member.id,
                provider = %member.provider,
                error = %error,
                "member stats failed, returning stub"
            );
            stub(member, today)
        }
    }
}

/// Identity fields copied from the roster with every statistic zeroed
fn identity(member: &RosterMember) -> UserStatsPayload {
    UserStatsPayload {
        id: member.id,
        name: member.name.clone(),
        role: member.role.clone(),
        emoji: member.emoji.clone(),
        color: member.color.clone(),
        bg: member.bg.clone(),
        garmin_device: member.device.clone(),
        picture: member.picture.clone(),
        google_email: member.google_email.clone(),
        provider: member.provider,
        types: Vec::new(),
        calories: 0,
        workouts: 0,
        km: 0.0,
        split: KmSplit::default(),
        act_kcal: 0,
        steps: 0,
        bmi: None,
        week: [false; WEEK_DAYS],
        week_calories: [0; WEEK_DAYS],
        km_by_type: BTreeMap::new(),
        monthly: Vec::new(),
        is_stub: true,
    }
}
