// ABOUTME: Stats commands for squad-cli: team payloads, single-member payloads, link status
// ABOUTME: Output is the same JSON the dashboard consumes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use squad_core::models::MemberId;
use squad_stats::aggregation::ReportWindow;
use squad_stats::context::SquadContext;
use tracing::info;

use super::print_json;

/// Print one payload per roster member
pub async fn team(context: &SquadContext, window: ReportWindow) -> Result<()> {
    info!(window = %window, "aggregating team stats");
    let payloads = context.aggregator.team_stats(window).await;
    print_json(&payloads)
}

/// Print the payload for member `id`
pub async fn member(context: &SquadContext, id: MemberId, window: ReportWindow) -> Result<()> {
    let payload = context.aggregator.member_stats(id, window).await?;
    print_json(&payload)
}

/// Print whether each member has a stored provider session
pub async fn status(context: &SquadContext) -> Result<()> {
    let statuses = context.aggregator.auth_status().await;
    print_json(&statuses)
}
