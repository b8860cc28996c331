// ABOUTME: Canonical activity categories and the raw-type canonicalizer
// ABOUTME: Maps Garmin and Strava type strings through a lookup table, substring heuristics, then a title-cased fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical activity category shared by every provider
///
/// `Other` carries the best-effort label produced for raw types that neither
/// the lookup table nor the substring heuristics recognize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// Outdoor, trail and treadmill running
    Running,
    /// Road, gravel and mountain cycling
    Cycling,
    /// Indoor trainer and virtual platform rides
    VirtualCycling,
    /// Pool and open water swimming
    Swimming,
    /// Alpine, nordic and backcountry skiing, snowboarding
    Skiing,
    /// Walking and hiking
    Walking,
    /// Yoga
    Yoga,
    /// Strength and weight training
    Strength,
    /// High intensity interval and cardio training
    Hiit,
    /// Unrecognized raw type, labelled from the raw string
    Other(String),
}

/// Exact raw-key table, union of the Garmin `typeKey` and Strava `sport_type` vocabularies
const RAW_TYPE_TABLE: &[(&str, ActivityType)] = &[
    // Garmin
    ("running", ActivityType::Running),
    ("trail_running", ActivityType::Running),
    ("treadmill_running", ActivityType::Running),
    ("ultra_run", ActivityType::Running),
    ("obstacle_run", ActivityType::Running),
    ("cycling", ActivityType::Cycling),
    ("mountain_biking", ActivityType::Cycling),
    ("gravel_cycling", ActivityType::Cycling),
    ("road_biking", ActivityType::Cycling),
    ("cyclocross", ActivityType::Cycling),
    ("bmx", ActivityType::Cycling),
    ("indoor_cycling", ActivityType::VirtualCycling),
    ("virtual_ride", ActivityType::VirtualCycling),
    ("virtual_cycling", ActivityType::VirtualCycling),
    ("swimming", ActivityType::Swimming),
    ("lap_swimming", ActivityType::Swimming),
    ("open_water_swimming", ActivityType::Swimming),
    ("skiing", ActivityType::Skiing),
    ("resort_skiing_snowboarding_ws", ActivityType::Skiing),
    ("backcountry_skiing_snowboarding_ws", ActivityType::Skiing),
    ("skate_skiing_ws", ActivityType::Skiing),
    ("cross_country_skiing_ws", ActivityType::Skiing),
    ("snowboarding", ActivityType::Skiing),
    ("yoga", ActivityType::Yoga),
    ("strength_training", ActivityType::Strength),
    ("hiit", ActivityType::Hiit),
    ("cardio_training", ActivityType::Hiit),
    ("walking", ActivityType::Walking),
    ("hiking", ActivityType::Walking),
    // Strava
    ("run", ActivityType::Running),
    ("trail_run", ActivityType::Running),
    ("treadmill", ActivityType::Running),
    ("virtualrun", ActivityType::Running),
    ("ride", ActivityType::Cycling),
    ("mountain_bike_ride", ActivityType::Cycling),
    ("gravel_ride", ActivityType::Cycling),
    ("handcycle", ActivityType::Cycling),
    ("velomobile", ActivityType::Cycling),
    ("virtualride", ActivityType::VirtualCycling),
    ("ebikeride", ActivityType::VirtualCycling),
    ("swim", ActivityType::Swimming),
    ("alpineski", ActivityType::Skiing),
    ("backcountryski", ActivityType::Skiing),
    ("nordicski", ActivityType::Skiing),
    ("snowboard", ActivityType::Skiing),
    ("snowshoe", ActivityType::Skiing),
    ("weighttraining", ActivityType::Strength),
    ("walk", ActivityType::Walking),
    ("hike", ActivityType::Walking),
];

/// Ordered substring heuristics applied when the table has no entry
const HEURISTICS: &[(&[&str], ActivityType)] = &[
    (&["run"], ActivityType::Running),
    (&["walk", "hik"], ActivityType::Walking),
    (&["cycl", "bik", "ride"], ActivityType::Cycling),
    (&["swim"], ActivityType::Swimming),
    (&["ski", "snowboard"], ActivityType::Skiing),
];

const FALLBACK_LABEL: &str = "Other";

/// Map a provider raw type string to its canonical category
///
/// Resolution is first-match-wins: exact case-insensitive table lookup, then the
/// substring heuristics in fixed priority, then the raw string with underscores
/// turned into spaces and title-cased. Empty input yields `Other("Other")`.
#[must_use]
pub fn canonicalize(raw: &str) -> ActivityType {
    let key = raw.trim().to_lowercase();

    if let Some((_, canonical)) = RAW_TYPE_TABLE.iter().find(|(k, _)| *k == key) {
        return canonical.clone();
    }

    for (needles, canonical) in HEURISTICS {
        if needles.iter().any(|needle| key.contains(needle)) {
            return canonical.clone();
        }
    }

    let label = title_case(&key.replace('_', " "));
    if label.is_empty() {
        ActivityType::Other(FALLBACK_LABEL.to_owned())
    } else {
        ActivityType::Other(label)
    }
}

/// Title-case each whitespace-delimited word, collapsing runs of whitespace
fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl ActivityType {
    /// Display label used in payloads and rollup keys
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
            Self::VirtualCycling => "VirtualCycling",
            Self::Swimming => "Swimming",
            Self::Skiing => "Skiing",
            Self::Walking => "Walking",
            Self::Yoga => "Yoga",
            Self::Strength => "Strength",
            Self::Hiit => "HIIT",
            Self::Other(label) => label,
        }
    }

    /// Parse a label previously produced by [`ActivityType::label`]
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Running" => Self::Running,
            "Cycling" => Self::Cycling,
            "VirtualCycling" => Self::VirtualCycling,
            "Swimming" => Self::Swimming,
            "Skiing" => Self::Skiing,
            "Walking" => Self::Walking,
            "Yoga" => Self::Yoga,
            "Strength" => Self::Strength,
            "HIIT" => Self::Hiit,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        assert_eq!(canonicalize("Trail_Running"), ActivityType::Running);
        assert_eq!(canonicalize("VirtualRide"), ActivityType::VirtualCycling);
        assert_eq!(canonicalize("WeightTraining"), ActivityType::Strength);
        assert_eq!(canonicalize("cardio_training"), ActivityType::Hiit);
    }

    #[test]
    fn test_table_wins_over_heuristics() {
        // "virtual_ride" contains "ride" but the table entry takes precedence
        assert_eq!(canonicalize("virtual_ride"), ActivityType::VirtualCycling);
        // "virtual_row_ride" has no table entry and falls to the "ride" heuristic
        assert_eq!(canonicalize("virtual_row_ride"), ActivityType::Cycling);
    }

    #[test]
    fn test_heuristic_priority() {
        assert_eq!(canonicalize("indoor_running"), ActivityType::Running);
        assert_eq!(
            canonicalize("fitness_equipment_running"),
            ActivityType::Running
        );
        // run beats walk when both appear
        assert_eq!(canonicalize("run_walk"), ActivityType::Running);
        assert_eq!(canonicalize("speed_walking"), ActivityType::Walking);
        assert_eq!(canonicalize("e_bike_mountain"), ActivityType::Cycling);
        assert_eq!(canonicalize("pool_swim_drill"), ActivityType::Swimming);
        assert_eq!(canonicalize("splitboarding_ski"), ActivityType::Skiing);
    }

    #[test]
    fn test_fallback_title_cases_raw_label() {
        assert_eq!(
            canonicalize("rock_climbing"),
            ActivityType::Other("Rock Climbing".to_owned())
        );
        assert_eq!(
            canonicalize("PILATES"),
            ActivityType::Other("Pilates".to_owned())
        );
    }

    #[test]
    fn test_canonicalize_is_total() {
        let samples = [
            "", "   ", "_", "__", "x", "rowing", "stand_up_paddleboarding", "golf", "7",
            "élan_vital", "breathwork", "Run", "HIKE",
        ];
        for raw in samples {
            let label = canonicalize(raw).label().to_owned();
            assert!(!label.is_empty(), "empty label for {raw:?}");
        }
        assert_eq!(canonicalize(""), ActivityType::Other("Other".to_owned()));
    }

    #[test]
    fn test_label_round_trip_through_serde() {
        let json = serde_json::to_string(&ActivityType::VirtualCycling).unwrap();
        assert_eq!(json, "\"VirtualCycling\"");
        let other: ActivityType = serde_json::from_str("\"Rock Climbing\"").unwrap();
        assert_eq!(other, ActivityType::Other("Rock Climbing".to_owned()));
    }
}
