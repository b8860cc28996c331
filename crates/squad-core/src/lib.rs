// ABOUTME: Core types and constants for the Squad Stats aggregation service
// ABOUTME: Foundation crate with error handling, domain models, and activity canonicalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Squad Core
//!
//! Foundation crate shared by the provider adapters, the stats compiler and the
//! aggregation service. It changes rarely so the rest of the workspace can
//! compile incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the provider-facing `ProviderError`
//! - **models**: canonical activities, daily summaries, month keys, payloads, roster members
//! - **constants**: rollup shapes, BMI plausibility bounds, provider identifiers

/// Unified error handling with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Domain models shared across the workspace
pub mod models;

pub use errors::{AppError, AppResult, ErrorCode, ProviderError, ProviderResult};
