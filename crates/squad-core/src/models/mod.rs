// ABOUTME: Domain models for the Squad Stats aggregation service
// ABOUTME: Re-exports activities, activity types, date windows, months, payloads, roster and sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Provider-neutral structures shared by the adapters, the stats compiler and
//! the aggregation service.
//!
//! - `CanonicalActivity` / `DailySummary`: normalized adapter output
//! - `ActivityType` and [`canonicalize`]: the fixed canonical category set
//! - `DateWindow` / `MonthKey`: inclusive date ranges and calendar months
//! - `MonthSummary` / `UserStatsPayload` / `KmSplit`: dashboard shapes
//! - `RosterMember` / `ProviderKind`: squad membership
//! - `ProviderSession`: stored provider credentials

mod activity;
mod activity_type;
mod month;
mod payload;
mod roster;
mod session;
mod window;

pub use activity::{CanonicalActivity, DailySummary};
pub use activity_type::{canonicalize, ActivityType};
pub use month::{MonthKey, MonthSummary};
pub use payload::{KmSplit, UserStatsPayload};
pub use roster::{MemberId, ProviderKind, RosterMember};
pub use session::ProviderSession;
pub use window::DateWindow;
