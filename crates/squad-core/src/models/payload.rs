// ABOUTME: Per-member statistics payload rendered by the dashboard
// ABOUTME: Real and stub results share one shape, distinguished by the isStub flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::month::MonthSummary;
use super::roster::{MemberId, ProviderKind};
use crate::constants::rollups::WEEK_DAYS;

/// Distance per canonical bucket, km with one decimal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmSplit {
    /// Running
    pub run_km: f64,
    /// Outdoor cycling
    pub cycle_km: f64,
    /// Indoor and virtual cycling
    pub virtual_km: f64,
    /// Swimming
    pub swim_km: f64,
    /// Skiing and snowboarding
    pub ski_km: f64,
    /// Walking and hiking
    pub walk_km: f64,
    /// Everything else with a distance
    pub other_km: f64,
}

impl KmSplit {
    /// Sum of every bucket
    #[must_use]
    pub fn total(&self) -> f64 {
        self.run_km
            + self.cycle_km
            + self.virtual_km
            + self.swim_km
            + self.ski_km
            + self.walk_km
            + self.other_km
    }
}

/// Statistics for one member over the requested window plus the trailing year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsPayload {
    /// Roster id
    pub id: MemberId,
    /// Display name
    pub name: String,
    /// Role shown on the dashboard
    pub role: String,
    /// Dashboard emoji
    pub emoji: String,
    /// Accent color
    pub color: String,
    /// Background color
    pub bg: String,
    /// Device shown on the card
    pub garmin_device: String,
    /// Avatar URL
    pub picture: String,
    /// Google account email
    #[serde(rename = "google_email")]
    pub google_email: String,
    /// Provider the stats came from
    pub provider: ProviderKind,
    /// Canonical labels seen in the window, or the member's declared types
    pub types: Vec<String>,
    /// Total calories for the window, scaled for day-count requests
    pub calories: u32,
    /// Activities in the window
    pub workouts: u32,
    /// Distance in the window, one decimal
    pub km: f64,
    /// Distance per type bucket, serialized inline
    #[serde(flatten)]
    pub split: KmSplit,
    /// Active calories from daily summaries
    pub act_kcal: u32,
    /// Steps from daily summaries
    pub steps: u64,
    /// Most recent BMI, if the provider reports one
    pub bmi: Option<f64>,
    /// Active flag per day, oldest first, last entry is today
    pub week: [bool; WEEK_DAYS],
    /// Active calories per day, aligned with `week`
    pub week_calories: [u32; WEEK_DAYS],
    /// Distance per canonical label
    pub km_by_type: BTreeMap<String, f64>,
    /// Twelve months, oldest first
    pub monthly: Vec<MonthSummary>,
    /// Placeholder payload for a member whose stats could not be fetched
    pub is_stub: bool,
}
