// ABOUTME: Wires configuration into the stores, adapter registry and team aggregator
// ABOUTME: One context per process; every component is shared behind an Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use squad_core::errors::AppResult;
use squad_core::models::ProviderKind;
use squad_providers::{initialize_shared_client, AdapterRegistry, SessionStore};
use tracing::{debug, info, warn};

use crate::aggregation::{Orchestrator, TeamAggregator};
use crate::config::SquadConfig;
use crate::roster::RosterStore;
use crate::session::{FileMfaStore, FileSessionStore, MfaStore};

/// Shared service components built from a [`SquadConfig`]
pub struct SquadContext {
    /// Loaded configuration
    pub config: SquadConfig,
    /// Squad membership
    pub roster: Arc<RosterStore>,
    /// Provider sessions on disk
    pub sessions: Arc<dyn SessionStore>,
    /// Provider dispatch by member tag
    pub registry: Arc<AdapterRegistry>,
    /// Pending MFA logins
    pub mfa: Arc<dyn MfaStore>,
    /// Roster-wide aggregation
    pub aggregator: TeamAggregator,
}

impl SquadContext {
    /// Build every component rooted at `config.home`
    ///
    /// # Errors
    ///
    /// Returns a storage error when the roster file cannot be opened
    pub async fn from_config(config: SquadConfig) -> AppResult<Self> {
        if !initialize_shared_client(config.http) {
            debug!("shared HTTP client already configured");
        }

        let roster = Arc::new(RosterStore::open(config.roster_path()).await?);
        let sessions: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.home));
        let registry = Arc::new(build_registry(&config, Arc::clone(&sessions)));
        let mfa: Arc<dyn MfaStore> = Arc::new(FileMfaStore::new(config.mfa_dir(), config.mfa_ttl));

        let orchestrator = Orchestrator::new(Arc::clone(&registry))
            .with_month_concurrency(config.month_concurrency)
            .with_fetch_timeout(config.fetch_timeout);
        let aggregator = TeamAggregator::new(Arc::clone(&roster), orchestrator);

        info!(
            home = %config.home.display(),
            providers = ?registry.supported_providers(),
            "squad context ready"
        );

        Ok(Self {
            config,
            roster,
            sessions,
            registry,
            mfa,
            aggregator,
        })
    }
}

/// Registry with every compiled-in provider plus configured overrides
#[must_use]
pub fn build_registry(config: &SquadConfig, sessions: Arc<dyn SessionStore>) -> AdapterRegistry {
    let mut registry = AdapterRegistry::with_defaults(sessions);
    for kind in ProviderKind::ALL {
        let Some(overrides) = config.provider_overrides(kind) else {
            continue;
        };
        let Some(base) = registry.config(kind).cloned() else {
            warn!(provider = %kind, "overrides configured for a provider that is not compiled in");
            continue;
        };
        registry.configure(overrides.apply(&base));
    }
    registry
}
