// ABOUTME: Monthly history entry: totals, running km, BMI and the fixed 28-slot day series
// ABOUTME: Days 29 to 31 are never represented and short months leave trailing zeros
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Datelike;
use squad_core::constants::rollups::MONTH_DAY_SLOTS;
use squad_core::models::{ActivityType, CanonicalActivity, DateWindow, MonthKey, MonthSummary};

use crate::{meters_to_km, round1};

/// Summarize the activities of `key`
///
/// Activities dated outside the month are ignored. `bmi` is rounded to one
/// decimal; non-positive values are treated as missing.
#[must_use]
pub fn build_month_summary(
    key: MonthKey,
    activities: &[CanonicalActivity],
    bmi: Option<f64>,
) -> MonthSummary {
    let window = DateWindow::for_month(key);
    let mut summary = MonthSummary::empty(key);
    let mut meters = 0.0;
    let mut run_meters = 0.0;

    for activity in activities.iter().filter(|a| window.contains(a.date)) {
        summary.cal = summary.cal.saturating_add(activity.calories);
        summary.act_kcal = summary.act_kcal.saturating_add(activity.active_calories);
        summary.sess += 1;
        meters += activity.distance_m;
        if activity.activity_type == ActivityType::Running {
            run_meters += activity.distance_m;
        }

        let slot = activity.date.day0() as usize;
        if slot < MONTH_DAY_SLOTS {
            summary.days[slot] = summary.days[slot].saturating_add(activity.active_calories);
        }
    }

    summary.km = meters_to_km(meters);
    summary.run_km = meters_to_km(run_meters);
    summary.bmi = bmi.filter(|value| *value > 0.0).map(round1);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn on(year: i32, month: u32, day: u32, raw_type: &str, active: u32) -> CanonicalActivity {
        CanonicalActivity::new(
            format!("{month}-{day}"),
            "",
            raw_type,
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            active + 100,
            active,
            4_000.0,
            1_200.0,
        )
    }

    #[test]
    fn test_late_days_are_dropped_from_the_series_but_counted_in_totals() {
        let key = MonthKey::new(2025, 1).unwrap();
        let activities = [
            on(2025, 1, 1, "running", 200),
            on(2025, 1, 1, "yoga", 50),
            on(2025, 1, 28, "cycling", 300),
            on(2025, 1, 31, "running", 400),
        ];

        let summary = build_month_summary(key, &activities, Some(23.456));

        assert_eq!(summary.days.len(), 28);
        assert_eq!(summary.days[0], 250);
        assert_eq!(summary.days[27], 300);
        assert_eq!(summary.days.iter().sum::<u32>(), 550);
        assert_eq!(summary.sess, 4);
        assert_eq!(summary.act_kcal, 950);
        assert_eq!(summary.cal, 1_350);
        assert!((summary.km - 16.0).abs() < f64::EPSILON);
        assert!((summary.run_km - 8.0).abs() < f64::EPSILON);
        assert_eq!(summary.bmi, Some(23.5));
    }

    #[test]
    fn test_other_months_are_ignored() {
        let key = MonthKey::new(2025, 2).unwrap();
        let summary = build_month_summary(key, &[on(2025, 3, 1, "running", 500)], None);
        assert_eq!(summary, MonthSummary::empty(key));
    }

    #[test]
    fn test_zero_bmi_is_missing() {
        let key = MonthKey::new(2025, 2).unwrap();
        assert_eq!(build_month_summary(key, &[], Some(0.0)).bmi, None);
    }
}
