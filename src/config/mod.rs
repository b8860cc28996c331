// ABOUTME: Configuration module for the aggregation service and CLI
// ABOUTME: Re-exports the environment-driven SquadConfig and per-provider overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from environment variables only. See
//! [`SquadConfig::from_env`] for the recognized keys.

/// Environment variable parsing
pub mod environment;

pub use environment::{ProviderOverrides, SquadConfig};
