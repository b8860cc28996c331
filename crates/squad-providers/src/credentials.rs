// ABOUTME: Per-adapter credential cache backed by the session store
// ABOUTME: Loads the member session on first use, refreshes near expiry, persists the refreshed session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::Client;
use squad_core::errors::{ProviderError, ProviderResult};
use squad_core::models::{MemberId, ProviderSession};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::core::ProviderConfig;
use crate::session::SessionStore;
use crate::utils::{self, RefreshRequest};

/// Credentials for one member and provider
///
/// Concurrent month fetches share one adapter, so refreshes are serialized
/// behind `refresh_lock` and re-checked once the lock is held.
pub struct MemberCredentials {
    member_id: MemberId,
    config: ProviderConfig,
    sessions: Arc<dyn SessionStore>,
    client: Client,
    cached: RwLock<Option<ProviderSession>>,
    refresh_lock: Mutex<()>,
}

impl MemberCredentials {
    /// Bind credentials for `member_id` to the session store
    #[must_use]
    pub fn new(
        member_id: MemberId,
        config: ProviderConfig,
        sessions: Arc<dyn SessionStore>,
        client: Client,
    ) -> Self {
        Self {
            member_id,
            config,
            sessions,
            client,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Member these credentials belong to
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// Provider configuration
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// HTTP client used for data and refresh requests
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Current usable session, refreshing it first when it is about to expire
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when nothing is stored, `AuthenticationFailed` when
    /// the store cannot be read or the refresh fails.
    pub async fn session(&self) -> ProviderResult<ProviderSession> {
        if let Some(session) = self.fresh_cached().await {
            return Ok(session);
        }

        let _refresh_guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while this one waited
        if let Some(session) = self.fresh_cached().await {
            return Ok(session);
        }

        let cached = self.cached.read().await.clone();
        let stored = match cached {
            Some(session) => session,
            None => self.load_stored().await?,
        };

        let session = if utils::needs_token_refresh(&stored) {
            self.refresh(&stored).await?
        } else {
            stored
        };

        *self.cached.write().await = Some(session.clone());
        Ok(session)
    }

    /// Bearer token for the next request
    ///
    /// # Errors
    ///
    /// See [`MemberCredentials::session`]
    pub async fn access_token(&self) -> ProviderResult<String> {
        Ok(self.session().await?.access_token)
    }

    async fn fresh_cached(&self) -> Option<ProviderSession> {
        let guard = self.cached.read().await;
        let session = guard
            .as_ref()
            .filter(|session| !utils::needs_token_refresh(session))
            .cloned();
        drop(guard);
        session
    }

    async fn load_stored(&self) -> ProviderResult<ProviderSession> {
        let provider = self.config.kind;
        self.sessions
            .load(self.member_id, provider)
            .await
            .map_err(|e| ProviderError::AuthenticationFailed {
                provider: provider.as_str().to_owned(),
                reason: format!("session store unavailable: {e}"),
            })?
            .ok_or_else(|| ProviderError::NotAuthenticated {
                provider: provider.as_str().to_owned(),
                member_id: self.member_id,
            })
    }

    async fn refresh(&self, stored: &ProviderSession) -> ProviderResult<ProviderSession> {
        let provider = self.config.kind;
        info!(
            provider = provider.as_str(),
            member_id = self.member_id,
            "access token near expiry, refreshing"
        );

        let refreshed = utils::refresh_oauth_token(
            &self.client,
            RefreshRequest {
                token_url: &self.config.token_url,
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                provider_name: provider.as_str(),
            },
            stored,
        )
        .await?;

        if let Err(e) = self
            .sessions
            .save(self.member_id, provider, &refreshed)
            .await
        {
            warn!(
                provider = provider.as_str(),
                member_id = self.member_id,
                error = %e,
                "refreshed session could not be persisted"
            );
        }

        Ok(refreshed)
    }
}
