// ABOUTME: Command modules for squad-cli
// ABOUTME: Stats reporting, roster management and MFA maintenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod mfa;
pub mod roster;
pub mod stats;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
