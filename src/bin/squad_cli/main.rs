// ABOUTME: squad-cli - command-line front end for the Squad Stats aggregation service
// ABOUTME: Prints team and member payloads, link status and roster records as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Stats for every member over the last week
//! squad-cli team --range 1w
//!
//! # One member over an explicit range
//! squad-cli member 3 --start 2025-05-01 --end 2025-05-31
//!
//! # Which members have linked their provider
//! squad-cli status
//!
//! # Roster management
//! squad-cli roster list
//! squad-cli roster add --google-sub 1234 --google-email jane.doe@example.com --name "Jane Doe"
//! squad-cli roster update 3 --patch '{"role": "Captain"}'
//! squad-cli roster remove 3
//!
//! # Drop expired MFA handoff records
//! squad-cli mfa purge
//! ```

mod commands;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use squad_core::models::{MemberId, ProviderKind};
use squad_stats::aggregation::ReportWindow;
use squad_stats::config::SquadConfig;
use squad_stats::context::SquadContext;
use squad_stats::logging::LoggingConfig;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "squad-cli",
    about = "Squad Stats command-line tool",
    long_about = "Aggregate fitness statistics for the squad and manage the member roster."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory override (defaults to SQUAD_HOME or ~/.squad_stats)
    #[arg(long, global = true)]
    home: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Reporting window selection shared by the stats commands
#[derive(Args, Clone, Debug)]
struct WindowArgs {
    /// Preset range: today, 1w or 4w
    #[arg(long, conflicts_with_all = ["start", "end"])]
    range: Option<String>,

    /// First day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
}

impl WindowArgs {
    fn resolve(&self, default: ReportWindow) -> Result<ReportWindow> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            return ReportWindow::explicit(start, end).context("invalid explicit range");
        }
        Ok(self
            .range
            .as_deref()
            .map_or(default, ReportWindow::from_preset))
    }
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Stats for every roster member, in roster order
    Team {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Stats for one member
    Member {
        /// Roster id
        id: MemberId,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Provider link status for every member
    Status,

    /// Roster management commands
    Roster {
        #[command(subcommand)]
        action: RosterCommand,
    },

    /// MFA handoff maintenance
    Mfa {
        #[command(subcommand)]
        action: MfaCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum RosterCommand {
    /// List every member
    List,

    /// Register a new member
    Add {
        /// Google account subject id
        #[arg(long)]
        google_sub: String,

        /// Google account email
        #[arg(long)]
        google_email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Profile picture URL
        #[arg(long, default_value = "")]
        picture: String,

        /// Garmin Connect login email
        #[arg(long, default_value = "")]
        garmin_email: String,

        /// Team role (defaults to a name derived from the Google email)
        #[arg(long)]
        role: Option<String>,

        /// Provider: garmin or strava
        #[arg(long, default_value = "garmin")]
        provider: ProviderKind,
    },

    /// Update fields of a member from a JSON object
    Update {
        /// Roster id
        id: MemberId,

        /// JSON object with the fields to change
        #[arg(long)]
        patch: String,
    },

    /// Remove a member
    Remove {
        /// Roster id
        id: MemberId,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum MfaCommand {
    /// Delete expired pending logins
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::for_cli(cli.verbose)
        .init()
        .context("failed to initialize logging")?;

    let mut config = SquadConfig::from_env().context("failed to load configuration")?;
    if let Some(home) = cli.home {
        config.home = home.into();
    }
    debug!(home = %config.home.display(), "using data directory");

    let context = SquadContext::from_config(config)
        .await
        .context("failed to initialize squad context")?;
    let default_window = context.config.default_range;

    match cli.command {
        Command::Team { window } => {
            commands::stats::team(&context, window.resolve(default_window)?).await?;
        }
        Command::Member { id, window } => {
            commands::stats::member(&context, id, window.resolve(default_window)?).await?;
        }
        Command::Status => commands::stats::status(&context).await?,
        Command::Roster { action } => match action {
            RosterCommand::List => commands::roster::list(&context).await?,
            RosterCommand::Add {
                google_sub,
                google_email,
                name,
                picture,
                garmin_email,
                role,
                provider,
            } => {
                commands::roster::add(
                    &context,
                    commands::roster::AddArgs {
                        google_sub,
                        google_email,
                        name,
                        picture,
                        garmin_email,
                        role,
                        provider,
                    },
                )
                .await?;
            }
            RosterCommand::Update { id, patch } => {
                commands::roster::update(&context, id, &patch).await?;
            }
            RosterCommand::Remove { id } => commands::roster::remove(&context, id).await?,
        },
        Command::Mfa { action } => match action {
            MfaCommand::Purge => commands::mfa::purge(&context).await?,
        },
    }

    Ok(())
}
