// ABOUTME: Session store contract used by adapters to load and persist provider credentials
// ABOUTME: Includes an in-memory implementation for tests and single-process deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use squad_core::errors::AppResult;
use squad_core::models::{MemberId, ProviderKind, ProviderSession};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage for per-member provider sessions
///
/// Implementations serialize their own writes; adapters may call `save`
/// concurrently after a token refresh.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored session for the member, if any
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read
    async fn load(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
    ) -> AppResult<Option<ProviderSession>>;

    /// Insert or replace the member's session
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written
    async fn save(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
        session: &ProviderSession,
    ) -> AppResult<()>;

    /// Delete the member's session, returning whether one existed
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written
    async fn remove(&self, member_id: MemberId, provider: ProviderKind) -> AppResult<bool>;

    /// Whether a session is stored; storage errors count as "no"
    async fn has_session(&self, member_id: MemberId, provider: ProviderKind) -> bool {
        matches!(self.load(member_id, provider).await, Ok(Some(_)))
    }
}

/// Process-local session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<(MemberId, ProviderKind), ProviderSession>>,
}

impl InMemorySessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is stored
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
    ) -> AppResult<Option<ProviderSession>> {
        Ok(self.sessions.read().await.get(&(member_id, provider)).cloned())
    }

    async fn save(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
        session: &ProviderSession,
    ) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .insert((member_id, provider), session.clone());
        Ok(())
    }

    async fn remove(&self, member_id: MemberId, provider: ProviderKind) -> AppResult<bool> {
        Ok(self
            .sessions
            .write()
            .await
            .remove(&(member_id, provider))
            .is_some())
    }
}
