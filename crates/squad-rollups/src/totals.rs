// ABOUTME: Reporting-window totals with the two calorie scaling policies, km split and per-type distance
// ABOUTME: Day-count windows scale calories by days/7; explicit windows are summed exactly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use squad_core::models::{ActivityType, CanonicalActivity, DateWindow, KmSplit};
use std::collections::BTreeMap;

use crate::{meters_to_km, round1};

/// How calorie totals relate to the activities in the window
///
/// `DayRatio` is the legacy day-count behavior: calories and active calories
/// are multiplied by `days / 7` and truncated, while distance, workout count
/// and the km split stay exact. `Exact` sums everything as fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Scale calories by `days / 7`
    DayRatio {
        /// Requested day count
        days: u32,
    },
    /// No scaling
    Exact,
}

impl ScalingPolicy {
    /// Apply the policy to a calorie sum
    #[must_use]
    pub fn scale(self, kcal: u64) -> u32 {
        let scaled = match self {
            Self::DayRatio { days } => kcal * u64::from(days) / 7,
            Self::Exact => kcal,
        };
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

/// Totals for the reporting window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeTotals {
    /// Total calories after scaling
    pub calories: u32,
    /// Active calories after scaling
    pub active_calories: u32,
    /// Activity count
    pub workouts: u32,
    /// Distance in km, one decimal
    pub km: f64,
    /// Distance per canonical bucket
    pub split: KmSplit,
    /// Distance per canonical label
    pub km_by_type: BTreeMap<String, f64>,
    /// Canonical labels in first-seen order
    pub types: Vec<String>,
}

/// Totals over the activities dated inside `window`
#[must_use]
pub fn range_totals(
    activities: &[CanonicalActivity],
    window: DateWindow,
    policy: ScalingPolicy,
) -> RangeTotals {
    let in_window: Vec<&CanonicalActivity> = activities
        .iter()
        .filter(|activity| window.contains(activity.date))
        .collect();

    let calories: u64 = in_window.iter().map(|a| u64::from(a.calories)).sum();
    let active: u64 = in_window.iter().map(|a| u64::from(a.active_calories)).sum();
    let meters: f64 = in_window.iter().map(|a| a.distance_m).sum();

    RangeTotals {
        calories: policy.scale(calories),
        active_calories: policy.scale(active),
        workouts: u32::try_from(in_window.len()).unwrap_or(u32::MAX),
        km: meters_to_km(meters),
        split: km_split(in_window.iter().copied()),
        km_by_type: km_by_type(in_window.iter().copied()),
        types: types_seen(in_window.iter().copied()),
    }
}

/// Number of [`KmSplit`] buckets
const SPLIT_BUCKETS: usize = 7;

const fn split_bucket(activity_type: &ActivityType) -> usize {
    match activity_type {
        ActivityType::Running => 0,
        ActivityType::Cycling => 1,
        ActivityType::VirtualCycling => 2,
        ActivityType::Swimming => 3,
        ActivityType::Skiing => 4,
        ActivityType::Walking => 5,
        _ => 6,
    }
}

/// Bucket distances by canonical type; activities without distance are skipped
///
/// Buckets carry one decimal and always add up to the rounded total distance.
#[must_use]
pub fn km_split<'a>(activities: impl IntoIterator<Item = &'a CanonicalActivity>) -> KmSplit {
    let mut meters = [0.0_f64; SPLIT_BUCKETS];
    for activity in activities.into_iter().filter(|a| a.has_distance()) {
        meters[split_bucket(&activity.activity_type)] += activity.distance_m;
    }

    let km = apportion_tenths(&meters).map(|tenths| tenths as f64 / 10.0);
    KmSplit {
        run_km: km[0],
        cycle_km: km[1],
        virtual_km: km[2],
        swim_km: km[3],
        ski_km: km[4],
        walk_km: km[5],
        other_km: km[6],
    }
}

/// Tenths of a km per bucket, summing to the rounded total
///
/// Every bucket is floored, then the tenths lost to flooring go to the buckets
/// with the largest remainders. Ties keep bucket order.
fn apportion_tenths(meters: &[f64; SPLIT_BUCKETS]) -> [u64; SPLIT_BUCKETS] {
    let exact = meters.map(|m| m / 1000.0 * 10.0);
    let mut tenths = exact.map(|t| t.floor() as u64);

    let target = (meters.iter().sum::<f64>() / 1000.0 * 10.0).round() as u64;
    let missing = target.saturating_sub(tenths.iter().sum());

    let remainder = |i: usize| exact[i] - tenths[i] as f64;
    let mut order: Vec<usize> = (0..SPLIT_BUCKETS).filter(|&i| remainder(i) > 0.0).collect();
    order.sort_by(|&a, &b| remainder(b).total_cmp(&remainder(a)));

    for &i in order.iter().take(missing as usize) {
        tenths[i] += 1;
    }
    tenths
}

/// Distance per canonical label, km with one decimal
#[must_use]
pub fn km_by_type<'a>(
    activities: impl IntoIterator<Item = &'a CanonicalActivity>,
) -> BTreeMap<String, f64> {
    let mut meters: BTreeMap<String, f64> = BTreeMap::new();
    for activity in activities.into_iter().filter(|a| a.has_distance()) {
        *meters
            .entry(activity.activity_type.label().to_owned())
            .or_default() += activity.distance_m;
    }
    meters
        .into_iter()
        .map(|(label, total)| (label, round1(total / 1000.0)))
        .collect()
}

/// Canonical labels in the order they first appear
#[must_use]
pub fn types_seen<'a>(activities: impl IntoIterator<Item = &'a CanonicalActivity>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for activity in activities {
        let label = activity.activity_type.label();
        if !seen.iter().any(|existing| existing == label) {
            seen.push(label.to_owned());
        }
    }
    seen
}
