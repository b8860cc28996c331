// ABOUTME: Roster commands for squad-cli: list, add, update and remove members
// ABOUTME: Writes go through the roster store so ids and palette slots stay consistent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Context, Result};
use squad_core::models::{MemberId, ProviderKind};
use squad_stats::context::SquadContext;
use squad_stats::roster::{MemberPatch, NewMember};

use super::print_json;

/// Arguments for `roster add`
pub struct AddArgs {
    pub google_sub: String,
    pub google_email: String,
    pub name: String,
    pub picture: String,
    pub garmin_email: String,
    pub role: Option<String>,
    pub provider: ProviderKind,
}

pub async fn list(context: &SquadContext) -> Result<()> {
    print_json(&context.roster.all_members().await)
}

pub async fn add(context: &SquadContext, args: AddArgs) -> Result<()> {
    let member = context
        .roster
        .add_member(NewMember {
            google_sub: args.google_sub,
            google_email: args.google_email,
            name: args.name,
            picture: args.picture,
            garmin_email: args.garmin_email,
            role: args.role,
            provider: args.provider,
        })
        .await?;
    print_json(&member)
}

pub async fn update(context: &SquadContext, id: MemberId, patch: &str) -> Result<()> {
    let patch: MemberPatch =
        serde_json::from_str(patch).context("--patch must be a JSON object of member fields")?;
    let Some(member) = context.roster.update_member(id, patch).await? else {
        bail!("member {id} not found");
    };
    print_json(&member)
}

pub async fn remove(context: &SquadContext, id: MemberId) -> Result<()> {
    if !context.roster.remove_member(id).await? {
        bail!("member {id} not found");
    }
    let removed_session = context.sessions.remove(id, ProviderKind::Garmin).await?
        | context.sessions.remove(id, ProviderKind::Strava).await?;
    print_json(&serde_json::json!({ "removed": id, "sessionRemoved": removed_session }))
}
