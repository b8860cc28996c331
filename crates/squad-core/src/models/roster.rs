// ABOUTME: Roster member records and the provider tag each member is linked through
// ABOUTME: Field names match the persisted members.json document consumed by the dashboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::providers;
use crate::errors::AppError;

/// Stable roster member identifier
pub type MemberId = u32;

/// Fitness data provider a member is linked through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Garmin Connect
    #[default]
    Garmin,
    /// Strava
    Strava,
}

impl ProviderKind {
    /// Every supported provider
    pub const ALL: [Self; 2] = [Self::Garmin, Self::Strava];

    /// Provider tag used in storage paths, registry keys and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Garmin => providers::GARMIN,
            Self::Strava => providers::STRAVA,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            providers::GARMIN => Ok(Self::Garmin),
            providers::STRAVA => Ok(Self::Strava),
            other => Err(AppError::invalid_input(format!(
                "unknown provider '{other}', expected garmin or strava"
            ))),
        }
    }
}

/// One member of the squad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterMember {
    /// Stable integer id, assigned as max existing id + 1
    pub id: MemberId,
    /// Provider the member's data is fetched from
    #[serde(default)]
    pub provider: ProviderKind,
    /// Google account subject id
    #[serde(default)]
    pub google_sub: String,
    /// Google account email
    #[serde(default)]
    pub google_email: String,
    /// Email used for the Garmin Connect login
    #[serde(default)]
    pub garmin_email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    #[serde(default)]
    pub picture: String,
    /// Team role shown under the name
    #[serde(default)]
    pub role: String,
    /// Avatar emoji
    #[serde(default)]
    pub emoji: String,
    /// Accent color
    #[serde(default)]
    pub color: String,
    /// Background color
    #[serde(default)]
    pub bg: String,
    /// Device label shown on the card
    #[serde(rename = "garminDevice", default)]
    pub device: String,
    /// Activity types the member declared, used when no activity is seen
    #[serde(default)]
    pub types: Vec<String>,
    /// When the member joined
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document_defaults_to_garmin() {
        let member: RosterMember = serde_json::from_str(
            r##"{"id": 3, "name": "Sam", "garminDevice": "Fenix 7", "types": ["Yoga"]}"##,
        )
        .unwrap();
        assert_eq!(member.provider, ProviderKind::Garmin);
        assert_eq!(member.device, "Fenix 7");
        assert!(member.joined_at.is_none());
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("Strava".parse::<ProviderKind>().unwrap(), ProviderKind::Strava);
        assert!("polar".parse::<ProviderKind>().is_err());
    }
}
