// ABOUTME: Main library entry point for the Squad Stats aggregation service
// ABOUTME: Roster, session and MFA stores plus the concurrent per-member and team aggregation pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Squad Stats
//!
//! Fitness statistics for a small squad whose members track with different
//! providers. Each member is fetched through the adapter matching their
//! provider tag, their activities are canonicalized and rolled up, and the
//! team result is one payload per member in roster order.
//!
//! ## Architecture
//!
//! - **`squad-core`**: errors, domain models, the activity type canonicalizer
//! - **`squad-providers`**: the `ProviderAdapter` contract, Garmin and Strava adapters, registry
//! - **`squad-rollups`**: weekly, range and monthly rollups
//! - **this crate**: configuration, logging, storage, orchestration and the CLI
//!
//! A member whose provider is unreachable, unlinked or misbehaving comes back
//! as a stub payload; a single month that fails comes back empty. Neither
//! aborts the batch.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use squad_stats::aggregation::ReportWindow;
//! use squad_stats::config::SquadConfig;
//! use squad_stats::context::SquadContext;
//! use squad_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = SquadConfig::from_env()?;
//!     let context = SquadContext::from_config(config).await?;
//!
//!     let payloads = context.aggregator.team_stats(ReportWindow::Days(7)).await;
//!     println!("{} members", payloads.len());
//!     Ok(())
//! }
//! ```

/// Aggregation pipeline: windows, orchestrator, payloads, team fan-out
pub mod aggregation;

/// Environment-driven configuration
pub mod config;

/// Component wiring from configuration
pub mod context;

/// Structured logging setup
pub mod logging;

/// Roster store and palette
pub mod roster;

/// Provider session and MFA handoff stores
pub mod session;

/// Atomic JSON file persistence
pub mod storage;

pub use squad_core::errors::{AppError, AppResult, ErrorCode};
pub use squad_core::models::{RosterMember, UserStatsPayload};
