// ABOUTME: Provider-neutral activity and daily summary records
// ABOUTME: Adapters normalize raw provider payloads into these before any rollup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::activity_type::{canonicalize, ActivityType};

/// A single activity after canonicalization
///
/// Numeric fields the provider omitted are zero, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalActivity {
    /// Provider activity id
    pub id: String,
    /// Display name given by the athlete
    pub name: String,
    /// Lower-cased provider type string
    pub raw_type: String,
    /// Canonical category derived from `raw_type`
    pub activity_type: ActivityType,
    /// Local calendar date the activity started on
    pub date: NaiveDate,
    /// Total calories
    pub calories: u32,
    /// Active (non-basal) calories
    pub active_calories: u32,
    /// Distance in meters
    pub distance_m: f64,
    /// Elapsed or moving time in seconds
    pub duration_s: f64,
}

impl CanonicalActivity {
    /// Build an activity, canonicalizing `raw_type` and clamping negative numbers to zero
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_type: &str,
        date: NaiveDate,
        calories: u32,
        active_calories: u32,
        distance_m: f64,
        duration_s: f64,
    ) -> Self {
        let raw_type = raw_type.trim().to_lowercase();
        Self {
            id: id.into(),
            name: name.into(),
            activity_type: canonicalize(&raw_type),
            raw_type,
            date,
            calories,
            active_calories,
            distance_m: non_negative(distance_m),
            duration_s: non_negative(duration_s),
        }
    }

    /// Whether the activity covered any distance
    #[must_use]
    pub fn has_distance(&self) -> bool {
        self.distance_m > 0.0
    }
}

/// Per-day totals reported by a provider's wellness endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Calendar date
    pub date: NaiveDate,
    /// Active calories for the day
    pub active_calories: u32,
    /// Step count, when the provider reports one
    pub steps: Option<u32>,
}

impl DailySummary {
    /// Summary with no data, used when a single day fails to load
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            active_calories: 0,
            steps: None,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_type_and_numbers() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let activity = CanonicalActivity::new(
            "42",
            "Lunch Run",
            " Trail_Running ",
            date,
            500,
            420,
            -3.0,
            f64::NAN,
        );
        assert_eq!(activity.raw_type, "trail_running");
        assert_eq!(activity.activity_type, ActivityType::Running);
        assert!(activity.distance_m.abs() < f64::EPSILON);
        assert!(activity.duration_s.abs() < f64::EPSILON);
        assert!(!activity.has_distance());
    }
}
