// ABOUTME: Fitness provider adapters for the squad stats pipeline: Garmin Connect and Strava
// ABOUTME: Adapter contract, dispatch registry, session store contract, retry and paging utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Provider adapters and their shared infrastructure.
//!
//! Each adapter turns one provider's REST API into canonical activities,
//! daily summaries and a latest BMI reading. The [`AdapterRegistry`] picks the
//! adapter for a roster member, so callers never branch on the provider.

#![deny(unsafe_code)]
#![deny(missing_docs)]

/// BMI resolution from weight history
pub mod bmi;
/// Adapter contract and factory trait
pub mod core;
/// Per-member credential cache with token refresh
pub mod credentials;
/// Shared HTTP client
pub mod http_client;
/// Offset and page-number pagination as a stream
pub mod pagination;
/// Provider dispatch registry
pub mod registry;
/// Session store contract and in-memory implementation
pub mod session;
/// Retry, token refresh and value conversion helpers
pub mod utils;

/// Garmin Connect adapter
#[cfg(feature = "provider-garmin")]
pub mod garmin;
/// Strava adapter
#[cfg(feature = "provider-strava")]
pub mod strava;

pub use crate::core::{AdapterFactory, ProviderAdapter, ProviderConfig};
pub use bmi::{resolve_bmi, WeightEntry};
pub use credentials::MemberCredentials;
#[cfg(feature = "provider-garmin")]
pub use garmin::{GarminAdapter, GarminAdapterFactory};
pub use http_client::{build_client, initialize_shared_client, shared_client, HttpClientConfig};
pub use pagination::{collect_pages, page_stream, PageRequest, PageStream};
pub use registry::AdapterRegistry;
pub use session::{InMemorySessionStore, SessionStore};
pub use squad_core::errors::{ProviderError, ProviderResult};
#[cfg(feature = "provider-strava")]
pub use strava::{StravaAdapter, StravaAdapterFactory};
pub use utils::RetryConfig;
