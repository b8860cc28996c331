// ABOUTME: Single-use handoff store for logins paused on a multi-factor challenge
// ABOUTME: Entries are keyed by a random token, expire after a TTL, and are deleted when taken
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MFA Handoff
//!
//! A provider login that stops on a second-factor prompt hands its partial
//! state to this store and returns the token to the caller. The follow-up
//! request presents the token and the code; [`MfaStore::take`] returns the
//! state exactly once.
//!
//! [`InMemoryMfaStore`] serves single-process deployments. [`FileMfaStore`]
//! keeps one file per token so every worker process sharing the directory can
//! complete a login started by another; a record is claimed by renaming it,
//! which only one process can win.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use squad_core::errors::{AppError, AppResult};
use squad_core::models::{MemberId, ProviderKind};
use tokio::fs;
use tracing::{debug, warn};

use crate::storage::{read_json, remove_file, write_json_atomic};

const TOKEN_BYTES: usize = 32;
const RECORD_EXTENSION: &str = "json";
const CLAIMED_EXTENSION: &str = "claimed";

/// Login state captured when the provider asked for a second factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLogin {
    /// Member completing the login
    pub member_id: MemberId,
    /// Provider being linked
    pub provider: ProviderKind,
    /// Login email submitted with the first step
    pub email: String,
    /// Provider-specific partial session (cookies, ticket ids, client state)
    #[serde(default)]
    pub state: Value,
}

/// Stored record: the pending login plus its deadline
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MfaRecord {
    login: PendingLogin,
    expires_at: DateTime<Utc>,
}

impl MfaRecord {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Generate an unguessable handoff token
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Whether `token` has the shape produced by [`generate_token`]
///
/// File-backed stores use the token as a file name, so anything outside the
/// URL-safe alphabet is rejected before it reaches the filesystem.
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 64
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Store for logins waiting on a second factor
#[async_trait]
pub trait MfaStore: Send + Sync {
    /// Store `login` and return the token that retrieves it
    ///
    /// # Errors
    ///
    /// Returns a storage error when the record cannot be written
    async fn put(&self, login: PendingLogin) -> AppResult<String>;

    /// Remove and return the login for `token`
    ///
    /// Unknown, malformed, already-taken and expired tokens all yield `None`;
    /// an expired record is deleted as a side effect.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing medium fails
    async fn take(&self, token: &str) -> AppResult<Option<PendingLogin>>;

    /// Delete every expired record, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing medium fails
    async fn purge_expired(&self) -> AppResult<usize>;
}

fn ttl_to_chrono(ttl: StdDuration) -> Duration {
    Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(365))
}

fn deadline(ttl: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Process-local MFA store
#[derive(Debug)]
pub struct InMemoryMfaStore {
    entries: DashMap<String, MfaRecord>,
    ttl: Duration,
}

impl InMemoryMfaStore {
    /// Store whose entries live for `ttl`
    #[must_use]
    pub fn new(ttl: StdDuration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: ttl_to_chrono(ttl),
        }
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MfaStore for InMemoryMfaStore {
    async fn put(&self, login: PendingLogin) -> AppResult<String> {
        let token = generate_token();
        let record = MfaRecord {
            login,
            expires_at: deadline(self.ttl),
        };
        self.entries.insert(token.clone(), record);
        Ok(token)
    }

    async fn take(&self, token: &str) -> AppResult<Option<PendingLogin>> {
        let Some((_, record)) = self.entries.remove(token) else {
            return Ok(None);
        };
        if record.is_expired(Utc::now()) {
            debug!(member_id = record.login.member_id, "mfa handoff expired");
            return Ok(None);
        }
        Ok(Some(record.login))
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, record| !record.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()))
    }
}

/// MFA store keeping one JSON file per token in a shared directory
#[derive(Debug)]
pub struct FileMfaStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileMfaStore {
    /// Store writing records under `dir` that live for `ttl`
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, ttl: StdDuration) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ttl: ttl_to_chrono(ttl),
        }
    }

    fn record_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{token}.{RECORD_EXTENSION}"))
    }

    fn claimed_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{token}.{CLAIMED_EXTENSION}"))
    }

    /// Move the record out of the way; only one caller can succeed
    async fn claim(&self, token: &str) -> AppResult<Option<PathBuf>> {
        let claimed = self.claimed_path(token);
        match fs::rename(self.record_path(token), &claimed).await {
            Ok(()) => Ok(Some(claimed)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(AppError::storage(format!("cannot claim mfa record: {e}")).with_source(e))
            }
        }
    }
}

#[async_trait]
impl MfaStore for FileMfaStore {
    async fn put(&self, login: PendingLogin) -> AppResult<String> {
        let token = generate_token();
        let record = MfaRecord {
            login,
            expires_at: deadline(self.ttl),
        };
        write_json_atomic(&self.record_path(&token), &record).await?;
        Ok(token)
    }

    async fn take(&self, token: &str) -> AppResult<Option<PendingLogin>> {
        if !is_well_formed(token) {
            warn!("rejected malformed mfa token");
            return Ok(None);
        }
        let Some(claimed) = self.claim(token).await? else {
            return Ok(None);
        };

        let record = read_json::<MfaRecord>(&claimed).await;
        remove_file(&claimed).await?;

        match record? {
            Some(record) if !record.is_expired(Utc::now()) => Ok(Some(record.login)),
            Some(record) => {
                debug!(member_id = record.login.member_id, "mfa handoff expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(
                    AppError::storage(format!("cannot list mfa records: {e}")).with_source(e)
                )
            }
        };

        let now = Utc::now();
        let mut purged = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let expired = match read_json::<MfaRecord>(&path).await {
                Ok(Some(record)) => record.is_expired(now),
                Ok(None) => false,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable mfa record removed");
                    true
                }
            };
            if expired && remove_file(&path).await? {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_distinct() {
        let first = generate_token();
        let second = generate_token();
        assert_eq!(first.len(), 43);
        assert!(is_well_formed(&first));
        assert_ne!(first, second);
    }

    #[test]
    fn test_path_like_tokens_are_malformed() {
        assert!(!is_well_formed("../members"));
        assert!(!is_well_formed("a/b"));
        assert!(!is_well_formed(""));
    }
}
