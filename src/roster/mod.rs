// ABOUTME: Roster store over the members.json document: snapshot reads, serialized atomic writes
// ABOUTME: Assigns ids and palette slots to new members and rejects duplicate Google accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Roster Store
//!
//! The roster is a JSON array of [`RosterMember`] records. Readers receive a
//! cloned snapshot; writers hold a mutex for the whole read-modify-persist
//! cycle, and the snapshot is swapped only after the file has been replaced.

/// Palette slots and default role derivation
pub mod palette;

pub use palette::{default_role, palette_for, PaletteEntry, PALETTE};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use squad_core::errors::{AppError, AppResult, ErrorCode};
use squad_core::models::{MemberId, ProviderKind, RosterMember};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::storage::{read_json, write_json_atomic};

/// Device label given to members at registration
pub const DEFAULT_DEVICE: &str = "Garmin";

/// Registration input for a new member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    /// Google account subject id; must be unique across the roster
    pub google_sub: String,
    /// Google account email
    pub google_email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    #[serde(default)]
    pub picture: String,
    /// Garmin Connect login email
    #[serde(default)]
    pub garmin_email: String,
    /// Team role; derived from `google_email` when absent or empty
    #[serde(default)]
    pub role: Option<String>,
    /// Provider the member links through
    #[serde(default)]
    pub provider: ProviderKind,
}

/// Field-level update for an existing member; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberPatch {
    /// Provider the member links through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Google account email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_email: Option<String>,
    /// Garmin Connect login email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garmin_email: Option<String>,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Role shown on the dashboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Dashboard emoji
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Accent color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    /// Watch or bike computer shown on the card
    #[serde(rename = "garminDevice", skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Activity types the member declares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

impl MemberPatch {
    fn apply(self, member: &mut RosterMember) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut member.provider, self.provider);
        set(&mut member.google_email, self.google_email);
        set(&mut member.garmin_email, self.garmin_email);
        set(&mut member.name, self.name);
        set(&mut member.picture, self.picture);
        set(&mut member.role, self.role);
        set(&mut member.emoji, self.emoji);
        set(&mut member.color, self.color);
        set(&mut member.bg, self.bg);
        set(&mut member.device, self.device);
        set(&mut member.types, self.types);
    }
}

/// Ordered squad membership backed by a JSON file
pub struct RosterStore {
    path: PathBuf,
    snapshot: RwLock<Arc<Vec<RosterMember>>>,
    write_lock: Mutex<()>,
}

impl RosterStore {
    /// Open the roster at `path`, starting empty when the file does not exist
    ///
    /// A file that cannot be decoded is moved aside to `<path>.corrupt.<unix-ts>`
    /// and the roster starts empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file exists but cannot be read or moved
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let members = Self::load(&path).await?;
        info!(path = %path.display(), count = members.len(), "roster loaded");

        Ok(Self {
            path,
            snapshot: RwLock::new(Arc::new(members)),
            write_lock: Mutex::new(()),
        })
    }

    async fn load(path: &Path) -> AppResult<Vec<RosterMember>> {
        match read_json::<Vec<RosterMember>>(path).await {
            Ok(members) => Ok(members.unwrap_or_default()),
            Err(e) if e.code == ErrorCode::SerializationError => {
                let backup = format!("{}.corrupt.{}", path.display(), Utc::now().timestamp());
                warn!(error = %e, backup = %backup, "corrupted roster file, starting empty");
                fs::rename(path, &backup).await.map_err(|io| {
                    AppError::storage(format!("cannot move corrupted roster aside: {io}"))
                        .with_source(io)
                })?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Re-read the file, picking up writes made by other processes
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file cannot be read
    pub async fn reload(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let members = Self::load(&self.path).await?;
        *self.snapshot.write().await = Arc::new(members);
        Ok(())
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every member in roster order
    pub async fn all_members(&self) -> Vec<RosterMember> {
        self.snapshot.read().await.as_ref().clone()
    }

    /// Member with `id`
    pub async fn get_member(&self, id: MemberId) -> Option<RosterMember> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|member| member.id == id)
            .cloned()
    }

    /// Member registered with Google subject `sub`
    pub async fn get_by_google_sub(&self, sub: &str) -> Option<RosterMember> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|member| member.google_sub == sub)
            .cloned()
    }

    /// Register a new member and persist the roster
    ///
    /// The id is one more than the largest existing id, the palette slot follows
    /// from the id, and the role defaults to a name derived from the Google email.
    ///
    /// # Errors
    ///
    /// Returns an already-exists error when `google_sub` is registered, or a
    /// storage error when the roster cannot be written
    pub async fn add_member(&self, new: NewMember) -> AppResult<RosterMember> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.snapshot.read().await.as_ref().clone();

        if let Some(existing) = members.iter().find(|m| m.google_sub == new.google_sub) {
            return Err(AppError::already_exists(format!(
                "Member with Google account already exists (id={})",
                existing.id
            )));
        }

        let id = members.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let palette = palette_for(id);
        let role = new
            .role
            .filter(|role| !role.trim().is_empty())
            .unwrap_or_else(|| default_role(&new.google_email));

        let member = RosterMember {
            id,
            provider: new.provider,
            google_sub: new.google_sub,
            google_email: new.google_email,
            garmin_email: new.garmin_email,
            name: new.name,
            picture: new.picture,
            role,
            emoji: palette.emoji.to_owned(),
            color: palette.color.to_owned(),
            bg: palette.bg.to_owned(),
            device: DEFAULT_DEVICE.to_owned(),
            types: Vec::new(),
            joined_at: Some(Utc::now()),
        };

        members.push(member.clone());
        self.persist(members).await?;
        info!(member_id = id, provider = %member.provider, "member added");
        Ok(member)
    }

    /// Apply `patch` to member `id`, returning the updated record
    ///
    /// # Errors
    ///
    /// Returns a storage error when the roster cannot be written
    pub async fn update_member(
        &self,
        id: MemberId,
        patch: MemberPatch,
    ) -> AppResult<Option<RosterMember>> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.snapshot.read().await.as_ref().clone();

        let Some(member) = members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        patch.apply(member);
        let updated = member.clone();

        self.persist(members).await?;
        Ok(Some(updated))
    }

    /// Remove member `id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns a storage error when the roster cannot be written
    pub async fn remove_member(&self, id: MemberId) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.snapshot.read().await.as_ref().clone();

        let before = members.len();
        members.retain(|m| m.id != id);
        if members.len() == before {
            return Ok(false);
        }

        self.persist(members).await?;
        info!(member_id = id, "member removed");
        Ok(true)
    }

    async fn persist(&self, members: Vec<RosterMember>) -> AppResult<()> {
        write_json_atomic(&self.path, &members).await?;
        *self.snapshot.write().await = Arc::new(members);
        Ok(())
    }
}
