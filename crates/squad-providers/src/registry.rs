// ABOUTME: Provider dispatch registry mapping each roster member to an adapter for their provider
// ABOUTME: Holds one factory and one endpoint configuration per provider plus the shared session store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use squad_core::errors::{ProviderError, ProviderResult};
use squad_core::models::{MemberId, ProviderKind, RosterMember};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::{AdapterFactory, ProviderAdapter, ProviderConfig};
use crate::session::SessionStore;

#[cfg(feature = "provider-garmin")]
use crate::garmin::{GarminAdapter, GarminAdapterFactory};
#[cfg(feature = "provider-strava")]
use crate::strava::{StravaAdapter, StravaAdapterFactory};

/// Dispatches roster members to provider adapters
pub struct AdapterRegistry {
    factories: HashMap<ProviderKind, Box<dyn AdapterFactory>>,
    configs: HashMap<ProviderKind, ProviderConfig>,
    sessions: Arc<dyn SessionStore>,
}

impl AdapterRegistry {
    /// Empty registry; nothing is dispatchable until a factory is registered
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            factories: HashMap::new(),
            configs: HashMap::new(),
            sessions,
        }
    }

    /// Registry with every compiled-in provider using its production endpoints
    #[must_use]
    pub fn with_defaults(sessions: Arc<dyn SessionStore>) -> Self {
        let mut registry = Self::new(sessions);
        Self::register_garmin(&mut registry);
        Self::register_strava(&mut registry);

        info!(
            "Adapter registry initialized with {} provider(s): [{}]",
            registry.factories.len(),
            registry
                .supported_providers()
                .into_iter()
                .map(ProviderKind::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        registry
    }

    #[cfg(feature = "provider-garmin")]
    fn register_garmin(registry: &mut Self) {
        registry.register(Box::new(GarminAdapterFactory), GarminAdapter::default_config());
    }

    #[cfg(not(feature = "provider-garmin"))]
    fn register_garmin(_registry: &mut Self) {}

    #[cfg(feature = "provider-strava")]
    fn register_strava(registry: &mut Self) {
        registry.register(Box::new(StravaAdapterFactory), StravaAdapter::default_config());
    }

    #[cfg(not(feature = "provider-strava"))]
    fn register_strava(_registry: &mut Self) {}

    /// Register or replace the factory and configuration for the factory's provider
    pub fn register(&mut self, factory: Box<dyn AdapterFactory>, config: ProviderConfig) {
        let provider = factory.provider();
        self.factories.insert(provider, factory);
        self.configs.insert(provider, ProviderConfig { kind: provider, ..config });
    }

    /// Replace the configuration of an already registered provider
    ///
    /// Returns `false` when no factory is registered for `config.kind`.
    pub fn configure(&mut self, config: ProviderConfig) -> bool {
        if !self.factories.contains_key(&config.kind) {
            return false;
        }
        self.configs.insert(config.kind, config);
        true
    }

    /// Configuration in effect for `provider`
    #[must_use]
    pub fn config(&self, provider: ProviderKind) -> Option<&ProviderConfig> {
        self.configs.get(&provider)
    }

    /// Session store shared by every adapter this registry creates
    #[must_use]
    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Providers with a registered factory, in stable order
    #[must_use]
    pub fn supported_providers(&self) -> Vec<ProviderKind> {
        let mut providers: Vec<ProviderKind> = self.factories.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    /// Whether `provider` can be dispatched
    #[must_use]
    pub fn is_supported(&self, provider: ProviderKind) -> bool {
        self.factories.contains_key(&provider)
    }

    /// Adapter for `member_id` on `provider`
    ///
    /// # Errors
    ///
    /// `UnsupportedProvider` when the provider is not registered
    pub fn adapter(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
    ) -> ProviderResult<Arc<dyn ProviderAdapter>> {
        let factory = self
            .factories
            .get(&provider)
            .ok_or_else(|| ProviderError::UnsupportedProvider(provider.as_str().to_owned()))?;
        let config = self
            .configs
            .get(&provider)
            .cloned()
            .ok_or_else(|| ProviderError::UnsupportedProvider(provider.as_str().to_owned()))?;

        debug!(member_id, provider = provider.as_str(), "creating adapter");
        Ok(factory.create(member_id, config, self.sessions()))
    }

    /// Adapter for the member's own provider
    ///
    /// # Errors
    ///
    /// See [`AdapterRegistry::adapter`]
    pub fn adapter_for(&self, member: &RosterMember) -> ProviderResult<Arc<dyn ProviderAdapter>> {
        self.adapter(member.id, member.provider)
    }

    /// Whether the member has a stored session for their provider
    pub async fn is_authenticated(&self, member: &RosterMember) -> bool {
        self.sessions.has_session(member.id, member.provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;

    fn member(id: MemberId, provider: ProviderKind) -> RosterMember {
        RosterMember {
            id,
            provider,
            ..RosterMember::default()
        }
    }

    #[test]
    fn test_empty_registry_rejects_every_provider() {
        let registry = AdapterRegistry::new(Arc::new(InMemorySessionStore::new()));
        let result = registry.adapter_for(&member(1, ProviderKind::Strava));
        assert!(matches!(
            result,
            Err(ProviderError::UnsupportedProvider(ref p)) if p == "strava"
        ));
        assert!(registry.supported_providers().is_empty());
    }

    #[cfg(feature = "all-providers")]
    #[test]
    fn test_defaults_dispatch_by_member_provider() {
        let registry = AdapterRegistry::with_defaults(Arc::new(InMemorySessionStore::new()));
        assert_eq!(
            registry.supported_providers(),
            vec![ProviderKind::Garmin, ProviderKind::Strava]
        );
        assert_eq!(
            registry.adapter_for(&member(1, ProviderKind::Garmin)).unwrap().name(),
            "garmin"
        );
        assert_eq!(
            registry.adapter_for(&member(2, ProviderKind::Strava)).unwrap().name(),
            "strava"
        );
    }

    #[cfg(feature = "provider-strava")]
    #[test]
    fn test_configure_overrides_endpoints() {
        let mut registry = AdapterRegistry::with_defaults(Arc::new(InMemorySessionStore::new()));
        let updated = registry.configure(ProviderConfig {
            api_base_url: "http://127.0.0.1:9/api".to_owned(),
            ..StravaAdapter::default_config()
        });
        assert!(updated);
        assert_eq!(
            registry.config(ProviderKind::Strava).unwrap().api_base_url,
            "http://127.0.0.1:9/api"
        );
    }
}
