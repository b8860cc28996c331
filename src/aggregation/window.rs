// ABOUTME: Reporting window requested by callers: a legacy day count or an explicit date range
// ABOUTME: Resolves to a concrete DateWindow and selects the matching calorie scaling policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::NaiveDate;
use squad_core::constants::rollups::DEFAULT_RANGE_DAYS;
use squad_core::errors::AppResult;
use squad_core::models::DateWindow;
use squad_rollups::ScalingPolicy;

/// Window a stats request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// The last `n` days ending today; calories are scaled by `n / 7`
    Days(u32),
    /// Inclusive calendar range; totals are exact
    Explicit {
        /// First day
        start: NaiveDate,
        /// Last day
        end: NaiveDate,
    },
}

impl Default for ReportWindow {
    fn default() -> Self {
        Self::Days(DEFAULT_RANGE_DAYS)
    }
}

impl ReportWindow {
    /// Recognized presets: `today`, `1w` and `4w`
    #[must_use]
    pub fn parse_preset(preset: &str) -> Option<Self> {
        match preset.trim().to_lowercase().as_str() {
            "today" => Some(Self::Days(1)),
            "1w" => Some(Self::Days(7)),
            "4w" => Some(Self::Days(28)),
            _ => None,
        }
    }

    /// Preset lookup where anything unrecognized means one week
    #[must_use]
    pub fn from_preset(preset: &str) -> Self {
        Self::parse_preset(preset).unwrap_or_default()
    }

    /// Explicit inclusive range
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when `start` is after `end`
    pub fn explicit(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        DateWindow::new(start, end)?;
        Ok(Self::Explicit { start, end })
    }

    /// Concrete dates covered when the request is served on `today`
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> DateWindow {
        match self {
            Self::Days(n) => DateWindow::last_n_days(today, n.max(1)),
            Self::Explicit { start, end } => {
                DateWindow::new(start, end).unwrap_or_else(|_| DateWindow::last_n_days(end, 1))
            }
        }
    }

    /// Calorie scaling applied to range totals
    ///
    /// A zero day count scales like one day, matching the window `resolve` returns.
    #[must_use]
    pub const fn scaling(self) -> ScalingPolicy {
        match self {
            Self::Days(0) => ScalingPolicy::DayRatio { days: 1 },
            Self::Days(days) => ScalingPolicy::DayRatio { days },
            Self::Explicit { .. } => ScalingPolicy::Exact,
        }
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "last {n} days"),
            Self::Explicit { start, end } => write!(f, "{start}..={end}"),
        }
    }
}
