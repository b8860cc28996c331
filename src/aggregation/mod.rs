// ABOUTME: Aggregation pipeline: report windows, per-member orchestration, payload assembly, team fan-out
// ABOUTME: Failures stop at the member or month boundary and surface as stub payloads or empty months
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Aggregation
//!
//! ```text
//! TeamAggregator ──(task per member)──> Orchestrator ──> ProviderAdapter
//!                                            │
//!                                            ├──(pool of 4)──> month fetches
//!                                            ▼
//!                                      compile_stats ──> payload::assemble / payload::stub
//! ```

/// Per-member fetch and compile
pub mod orchestrator;
/// Real and stub payload construction
pub mod payload;
/// Roster-wide fan-out
pub mod team;
/// Reporting windows and presets
pub mod window;

pub use orchestrator::{MemberOutcome, Orchestrator};
pub use payload::{assemble, from_outcome, stub};
pub use team::{AuthStatus, TeamAggregator};
pub use window::ReportWindow;
