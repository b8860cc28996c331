// ABOUTME: Property-style tests for the stats compiler across month lengths and mixed activity sets
// ABOUTME: Checks the 28-slot invariant, km split consistency and the compiled stats pass
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Datelike, NaiveDate};
use squad_core::models::{CanonicalActivity, DailySummary, DateWindow, MonthKey};
use squad_rollups::{
    build_month_summary, compile_stats, km_split, range_totals, MonthData, ScalingPolicy,
    WindowData,
};

const RAW_TYPES: &[&str] = &[
    "running",
    "road_biking",
    "virtual_ride",
    "lap_swimming",
    "resort_skiing_snowboarding_ws",
    "hiking",
    "rowing",
    "kayaking",
];

fn daily_activity(date: NaiveDate, raw_type: &str, seed: u32) -> CanonicalActivity {
    CanonicalActivity::new(
        format!("{date}-{seed}"),
        "",
        raw_type,
        date,
        300 + seed,
        150 + seed,
        f64::from(seed * 1_337 % 20_000) + 0.45,
        1_800.0,
    )
}

#[test]
fn test_day_series_is_28_slots_for_every_month_length() {
    for (year, month) in [(2025, 2), (2024, 2), (2025, 4), (2025, 7)] {
        let key = MonthKey::new(year, month).unwrap();
        let activities: Vec<CanonicalActivity> = DateWindow::for_month(key)
            .dates()
            .map(|date| daily_activity(date, "running", date.day()))
            .collect();

        let summary = build_month_summary(key, &activities, None);

        assert_eq!(summary.days.len(), 28, "{key}");
        assert_eq!(summary.sess as usize, activities.len(), "{key}");
        for (slot, kcal) in summary.days.iter().enumerate() {
            assert_eq!(*kcal, 150 + slot as u32 + 1, "{key} slot {slot}");
        }
    }
}

#[test]
fn test_split_sum_matches_total_km_within_rounding() {
    let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let window = DateWindow::new(start, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()).unwrap();

    let activities: Vec<CanonicalActivity> = window
        .dates()
        .enumerate()
        .map(|(i, date)| daily_activity(date, RAW_TYPES[i % RAW_TYPES.len()], i as u32 * 7 + 3))
        .collect();

    let totals = range_totals(&activities, window, ScalingPolicy::Exact);
    let split = km_split(&activities);

    assert_eq!(totals.split, split);
    assert!((split.total() - totals.km).abs() <= 0.1);
}

#[test]
fn test_compile_stats_end_to_end() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let window = DateWindow::last_n_days(today, 7);
    let activities = vec![
        CanonicalActivity::new("a", "", "running", today, 500, 400, 5_000.0, 1_500.0),
        CanonicalActivity::new(
            "b",
            "",
            "trail_running",
            today.pred_opt().unwrap(),
            500,
            400,
            4_000.0,
            1_400.0,
        ),
        CanonicalActivity::new("c", "", "running", window.start(), 600, 450, 6_000.0, 1_800.0),
    ];
    let summaries = [DailySummary {
        date: today,
        active_calories: 700,
        steps: Some(8_000),
    }];
    let months: Vec<MonthData> = MonthKey::trailing(today, 12)
        .into_iter()
        .map(|key| MonthData {
            key,
            activities: activities
                .iter()
                .filter(|a| MonthKey::containing(a.date) == key)
                .cloned()
                .collect(),
            bmi: Some(24.04),
        })
        .collect();

    let stats = compile_stats(
        today,
        ScalingPolicy::Exact,
        &WindowData {
            window,
            activities: &activities,
            summaries: &summaries,
            bmi: Some(24.04),
        },
        &months,
    );

    assert!((stats.totals.km - 15.0).abs() < f64::EPSILON);
    assert_eq!(stats.totals.workouts, 3);
    assert_eq!(stats.totals.types, vec!["Running"]);
    assert_eq!(stats.week.active_days(), 3);
    assert_eq!(stats.week.calories[6], 700);
    assert_eq!(stats.steps, 8_000);
    assert_eq!(stats.bmi, Some(24.0));
    assert_eq!(stats.monthly.len(), 12);
    assert_eq!(stats.monthly[11].sess, 3);
    assert_eq!(stats.monthly[11].month, 3);
    assert!(stats.monthly[..11].iter().all(|m| m.sess == 0 && m.bmi == Some(24.0)));
}
