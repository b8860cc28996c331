// ABOUTME: Persistent session state: provider sessions on disk and pending MFA logins
// ABOUTME: Both stores are safe to share across tasks and write atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// File-backed provider session store
pub mod file_store;
/// Single-use MFA handoff store
pub mod mfa;

pub use file_store::FileSessionStore;
pub use mfa::{FileMfaStore, InMemoryMfaStore, MfaStore, PendingLogin};
