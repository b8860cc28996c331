// ABOUTME: Pooled HTTP client shared by every provider adapter
// ABOUTME: Timeouts come from HttpClientConfig, applied once before the first adapter request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Timeouts and identity for outbound provider requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

const USER_AGENT: &str = concat!("squad-stats/", env!("CARGO_PKG_VERSION"));

static CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the configuration used by [`shared_client`]
///
/// Returns `false` when a configuration was already recorded; the first one wins.
pub fn initialize_shared_client(config: HttpClientConfig) -> bool {
    CLIENT_CONFIG.set(config).is_ok()
}

/// Build a standalone client with the given timeouts
#[must_use]
pub fn build_client(config: HttpClientConfig) -> Client {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Process-wide pooled client; uses defaults if never initialized
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| build_client(CLIENT_CONFIG.get().copied().unwrap_or_default()))
}
