// ABOUTME: Stats compiler for the squad dashboard: weekly series, range totals, km split, monthly history
// ABOUTME: Pure functions over canonical activities and daily summaries, no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Squad Rollups
//!
//! Everything here is deterministic given `today` and the fetched records, so
//! the aggregation service can run it after all network work has settled.
//!
//! - [`weekly_rollup`]: the fixed 7-day series ending today
//! - [`range_totals`]: totals for the reporting window under a [`ScalingPolicy`]
//! - [`build_month_summary`]: one entry of the 12-month history
//! - [`compile_stats`]: all of the above in one pass

/// Monthly history entries
pub mod monthly;
/// Reporting-window totals, km split and type breakdown
pub mod totals;
/// Trailing 7-day activity flags and calorie series
pub mod weekly;

pub use monthly::build_month_summary;
pub use totals::{km_by_type, km_split, range_totals, types_seen, RangeTotals, ScalingPolicy};
pub use weekly::{total_steps, weekly_rollup, WeeklyRollup};

use chrono::NaiveDate;
use squad_core::models::{CanonicalActivity, DailySummary, DateWindow, MonthKey, MonthSummary};

/// Round to one decimal place, the precision every km and BMI value is reported with
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Meters to km with one decimal
#[must_use]
pub fn meters_to_km(meters: f64) -> f64 {
    round1(meters / 1000.0)
}

/// Activities and BMI gathered for one trailing month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthData {
    /// Month the data belongs to
    pub key: MonthKey,
    /// Activities whose local date falls in the month
    pub activities: Vec<CanonicalActivity>,
    /// BMI as of the month end, or the window BMI when that was unavailable
    pub bmi: Option<f64>,
}

/// Everything fetched for the reporting window
#[derive(Debug, Clone, Copy)]
pub struct WindowData<'a> {
    /// Reporting window the activities were fetched for
    pub window: DateWindow,
    /// Activities in the window
    pub activities: &'a [CanonicalActivity],
    /// Daily summaries in the window, possibly empty
    pub summaries: &'a [DailySummary],
    /// Latest BMI as of today
    pub bmi: Option<f64>,
}

/// Compiled statistics for one member, ready for the payload assembler
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStats {
    /// Reporting-window totals
    pub totals: RangeTotals,
    /// Trailing 7-day series
    pub week: WeeklyRollup,
    /// Steps summed over the window's daily summaries
    pub steps: u64,
    /// Latest BMI, one decimal
    pub bmi: Option<f64>,
    /// Monthly history in the order the months were given
    pub monthly: Vec<MonthSummary>,
}

/// Run every rollup over one member's fetched data
#[must_use]
pub fn compile_stats(
    today: NaiveDate,
    policy: ScalingPolicy,
    window: &WindowData<'_>,
    months: &[MonthData],
) -> CompiledStats {
    CompiledStats {
        totals: range_totals(window.activities, window.window, policy),
        week: weekly_rollup(today, window.activities, window.summaries),
        steps: total_steps(window.summaries),
        bmi: window.bmi.map(round1),
        monthly: months
            .iter()
            .map(|month| build_month_summary(month.key, &month.activities, month.bmi))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1_to_one_decimal() {
        assert!((round1(15.04) - 15.0).abs() < f64::EPSILON);
        assert!((round1(15.06) - 15.1).abs() < 1e-9);
        assert!((meters_to_km(5_049.0) - 5.0).abs() < f64::EPSILON);
    }
}
