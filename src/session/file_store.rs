// ABOUTME: File-backed provider session store, one JSON document per member and provider
// ABOUTME: Layout is <home>/<member-id>/<provider>_session.json with atomic writes under a mutex
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use squad_core::errors::AppResult;
use squad_core::models::{MemberId, ProviderKind, ProviderSession};
use squad_providers::SessionStore;
use tokio::sync::Mutex;
use tracing::debug;

use crate::storage::{read_json, remove_file, write_json_atomic};

/// Session store persisting each session to its own file
///
/// Reads always go to disk so sessions written by another process are visible.
#[derive(Debug)]
pub struct FileSessionStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Store rooted at `root` (usually the squad home directory)
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the session file for a member and provider
    #[must_use]
    pub fn session_path(&self, member_id: MemberId, provider: ProviderKind) -> PathBuf {
        self.root
            .join(member_id.to_string())
            .join(format!("{provider}_session.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
    ) -> AppResult<Option<ProviderSession>> {
        read_json(&self.session_path(member_id, provider)).await
    }

    async fn save(
        &self,
        member_id: MemberId,
        provider: ProviderKind,
        session: &ProviderSession,
    ) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        write_json_atomic(&self.session_path(member_id, provider), session).await?;
        debug!(member_id, provider = %provider, "session saved");
        Ok(())
    }

    async fn remove(&self, member_id: MemberId, provider: ProviderKind) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        remove_file(&self.session_path(member_id, provider)).await
    }
}
