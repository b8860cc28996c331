// ABOUTME: MFA maintenance command for squad-cli
// ABOUTME: Removes pending logins whose handoff window has elapsed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use squad_stats::context::SquadContext;

use super::print_json;

pub async fn purge(context: &SquadContext) -> Result<()> {
    let purged = context.mfa.purge_expired().await?;
    print_json(&serde_json::json!({ "purged": purged }))
}
