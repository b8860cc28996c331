// ABOUTME: Calendar month keys and the per-month rollup shape
// ABOUTME: MonthKey does real calendar arithmetic; MonthSummary always carries 28 day slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::rollups::MONTH_DAY_SLOTS;
use crate::errors::{AppError, AppResult};

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// Build a key from a year and a 1-based month
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when the month is outside 1..=12
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| AppError::invalid_input(format!("invalid month {year}-{month}")))
    }

    /// The month containing `date`
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self(NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date))
    }

    /// `count` months ending with the month containing `today`, oldest first
    #[must_use]
    pub fn trailing(today: NaiveDate, count: usize) -> Vec<Self> {
        let mut keys = Vec::with_capacity(count);
        let mut cursor = Some(Self::containing(today));
        while keys.len() < count {
            let Some(key) = cursor else { break };
            keys.push(key);
            cursor = key.previous();
        }
        keys.reverse();
        keys
    }

    /// Calendar year
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based calendar month
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The month before this one
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        self.0.checked_sub_months(Months::new(1)).map(Self)
    }

    /// The month after this one
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Day 1 of the month
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Last calendar day of the month
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .and_then(|next| next.0.pred_opt())
            .unwrap_or(self.0)
    }

    /// Number of days in the month (28 to 31)
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// One entry of the trailing monthly history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Calendar year
    pub year: i32,
    /// 1-based calendar month
    pub month: u32,
    /// Total calories across the month's activities
    pub cal: u32,
    /// Activity (session) count
    pub sess: u32,
    /// Distance in km, one decimal
    pub km: f64,
    /// Running distance in km, one decimal
    pub run_km: f64,
    /// Active calories across the month's activities
    pub act_kcal: u32,
    /// Body-mass index for the month, one decimal
    pub bmi: Option<f64>,
    /// Active calories for days 1 through 28; later days are never represented
    pub days: [u32; MONTH_DAY_SLOTS],
}

impl MonthSummary {
    /// A zeroed entry for `key`, used by stub payloads and failed months
    #[must_use]
    pub fn empty(key: MonthKey) -> Self {
        Self {
            year: key.year(),
            month: key.month(),
            cal: 0,
            sess: 0,
            km: 0.0,
            run_km: 0.0,
            act_kcal: 0,
            bmi: None,
            days: [0; MONTH_DAY_SLOTS],
        }
    }
}
