// ABOUTME: Trailing 7-day rollup: activity flag and active calories for each day ending today
// ABOUTME: Anchored on today regardless of the reporting window length
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use squad_core::constants::rollups::WEEK_DAYS;
use squad_core::models::{CanonicalActivity, DailySummary, DateWindow};
use std::collections::HashMap;

/// Activity flags and active calories for the last seven days, oldest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRollup {
    /// Whether any activity started on the day
    pub active: [bool; WEEK_DAYS],
    /// Active calories for the day
    pub calories: [u32; WEEK_DAYS],
}

impl WeeklyRollup {
    /// Number of days with at least one activity
    #[must_use]
    pub fn active_days(&self) -> usize {
        self.active.iter().filter(|flag| **flag).count()
    }
}

/// Build the 7-day series ending at `today`
///
/// A day's calories come from its daily summary when that reports a positive
/// figure, otherwise from the active calories of the day's activities.
#[must_use]
pub fn weekly_rollup(
    today: NaiveDate,
    activities: &[CanonicalActivity],
    summaries: &[DailySummary],
) -> WeeklyRollup {
    let reported: HashMap<NaiveDate, u32> = summaries
        .iter()
        .map(|summary| (summary.date, summary.active_calories))
        .collect();

    let mut rollup = WeeklyRollup::default();
    let days = DateWindow::last_n_days(today, WEEK_DAYS as u32);

    for (slot, date) in days.dates().enumerate().take(WEEK_DAYS) {
        let mut any = false;
        let mut from_activities = 0_u32;
        for activity in activities.iter().filter(|a| a.date == date) {
            any = true;
            from_activities = from_activities.saturating_add(activity.active_calories);
        }

        rollup.active[slot] = any;
        rollup.calories[slot] = match reported.get(&date) {
            Some(kcal) if *kcal > 0 => *kcal,
            _ => from_activities,
        };
    }

    rollup
}

/// Sum of reported step counts
#[must_use]
pub fn total_steps(summaries: &[DailySummary]) -> u64 {
    summaries
        .iter()
        .filter_map(|summary| summary.steps)
        .map(u64::from)
        .sum()
}
