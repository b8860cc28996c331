// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Rollup shapes, BMI plausibility bounds, provider identifiers and OAuth timing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Provider identifiers used as roster tags and log fields
pub mod providers {
    /// Garmin Connect
    pub const GARMIN: &str = "garmin";
    /// Strava
    pub const STRAVA: &str = "strava";
}

/// Shapes of the rollups consumed by the dashboard
pub mod rollups {
    /// Days in the weekly rollup window (always ending today)
    pub const WEEK_DAYS: usize = 7;
    /// Fixed number of per-day slots in a month summary
    pub const MONTH_DAY_SLOTS: usize = 28;
    /// Number of trailing months in the monthly history, current month included
    pub const TRAILING_MONTHS: usize = 12;
    /// Default width of the per-member month fetch pool
    pub const DEFAULT_MONTH_CONCURRENCY: usize = 4;
    /// Day-count used when a range preset is not recognized
    pub const DEFAULT_RANGE_DAYS: u32 = 7;
}

/// Body-mass-index resolution bounds
pub mod bmi {
    /// Raw weight values above this are grams, not kilograms
    pub const GRAMS_THRESHOLD: f64 = 500.0;
    /// Computed BMI must be strictly above this
    pub const MIN_PLAUSIBLE: f64 = 10.0;
    /// Computed BMI must be strictly below this
    pub const MAX_PLAUSIBLE: f64 = 60.0;
    /// How far back body-composition history is searched
    pub const LOOKBACK_DAYS: u64 = 90;
}

/// OAuth token handling
pub mod oauth {
    /// Tokens expiring within this many minutes are refreshed before use
    pub const REFRESH_THRESHOLD_MINUTES: i64 = 5;
}

/// Upstream API paging limits
pub mod api_provider_limits {
    /// Garmin Connect activity search
    pub mod garmin {
        /// Page size used against the activity search endpoint
        pub const ACTIVITIES_PAGE_SIZE: usize = 100;
        /// Estimated rate-limit block duration reported to operators
        pub const ESTIMATED_RATE_LIMIT_BLOCK_DURATION_SECS: u64 = 3600;
    }

    /// Strava athlete activities
    pub mod strava {
        /// Page size used against `/athlete/activities`
        pub const ACTIVITIES_PAGE_SIZE: usize = 100;
        /// Estimated rate-limit block duration (Strava resets every 15 minutes)
        pub const ESTIMATED_RATE_LIMIT_BLOCK_DURATION_SECS: u64 = 900;
    }

    /// Hard cap on pages fetched for a single window
    pub const MAX_PAGES: usize = 50;
}
