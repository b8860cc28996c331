// ABOUTME: Inclusive calendar date windows used for every provider fetch
// ABOUTME: Built from a trailing day count, an explicit range, or a calendar month
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::MonthKey;
use crate::errors::{AppError, AppResult};

/// Inclusive `[start, end]` range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::invalid_input(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The `n` days ending at `today` inclusive; `n = 0` is treated as 1
    #[must_use]
    pub fn last_n_days(today: NaiveDate, n: u32) -> Self {
        let back = u64::from(n.max(1) - 1);
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
        Self { start, end: today }
    }

    /// First through last day of the month
    #[must_use]
    pub fn for_month(month: MonthKey) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }

    /// First day in the window
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day in the window
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, always at least 1
    #[must_use]
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span).unwrap_or(u32::MAX)
    }

    /// Every date in the window, oldest first
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
