// ABOUTME: Integration tests for the in-memory and file-backed MFA handoff stores
// ABOUTME: Single-use tokens, expiry, purging and handoff between independent store instances
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use squad_core::models::ProviderKind;
use squad_stats::session::{FileMfaStore, InMemoryMfaStore, MfaStore, PendingLogin};
use tempfile::TempDir;

const TEN_MINUTES: Duration = Duration::from_secs(600);

fn pending(member_id: u32) -> PendingLogin {
    PendingLogin {
        member_id,
        provider: ProviderKind::Garmin,
        email: "athlete@example.com".to_owned(),
        state: json!({ "ticket": "ST-1234", "csrf": "abc" }),
    }
}

async fn assert_single_use(store: &dyn MfaStore) {
    let token = store.put(pending(3)).await.unwrap();

    let login = store.take(&token).await.unwrap().unwrap();
    assert_eq!(login, pending(3));
    assert!(store.take(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_token_is_single_use() {
    assert_single_use(&InMemoryMfaStore::new(TEN_MINUTES)).await;
}

#[tokio::test]
async fn test_file_token_is_single_use() {
    let dir = TempDir::new().unwrap();
    assert_single_use(&FileMfaStore::new(dir.path(), TEN_MINUTES)).await;
}

#[tokio::test]
async fn test_unknown_token_is_none() {
    let dir = TempDir::new().unwrap();
    let file = FileMfaStore::new(dir.path(), TEN_MINUTES);
    let memory = InMemoryMfaStore::new(TEN_MINUTES);

    assert!(file.take("nothing-here").await.unwrap().is_none());
    assert!(memory.take("nothing-here").await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_logins_are_not_returned() {
    let dir = TempDir::new().unwrap();
    let file = FileMfaStore::new(dir.path(), Duration::ZERO);
    let memory = InMemoryMfaStore::new(Duration::ZERO);

    let file_token = file.put(pending(1)).await.unwrap();
    let memory_token = memory.put(pending(1)).await.unwrap();

    assert!(file.take(&file_token).await.unwrap().is_none());
    assert!(memory.take(&memory_token).await.unwrap().is_none());
    assert!(memory.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_purge_removes_only_expired_records() {
    let dir = TempDir::new().unwrap();
    let expired = FileMfaStore::new(dir.path(), Duration::ZERO);
    let live = FileMfaStore::new(dir.path(), TEN_MINUTES);

    expired.put(pending(1)).await.unwrap();
    expired.put(pending(2)).await.unwrap();
    let kept = live.put(pending(3)).await.unwrap();
    fs::write(dir.path().join("garbage.json"), b"{ nope").unwrap();

    assert_eq!(live.purge_expired().await.unwrap(), 3);
    assert_eq!(live.take(&kept).await.unwrap().unwrap().member_id, 3);
}

#[tokio::test]
async fn test_memory_purge_counts_removed_entries() {
    let store = InMemoryMfaStore::new(Duration::ZERO);
    store.put(pending(1)).await.unwrap();
    store.put(pending(2)).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.purge_expired().await.unwrap(), 2);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_purge_on_missing_directory_is_zero() {
    let dir = TempDir::new().unwrap();
    let store = FileMfaStore::new(dir.path().join("absent"), TEN_MINUTES);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_handoff_crosses_store_instances() {
    let dir = TempDir::new().unwrap();
    let login_process = FileMfaStore::new(dir.path(), TEN_MINUTES);
    let verify_process = FileMfaStore::new(dir.path(), TEN_MINUTES);

    let token = login_process.put(pending(7)).await.unwrap();
    let login = verify_process.take(&token).await.unwrap().unwrap();

    assert_eq!(login.member_id, 7);
    assert_eq!(login.state["ticket"], "ST-1234");
    assert!(login_process.take(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_takes_yield_one_winner() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileMfaStore::new(dir.path(), TEN_MINUTES));
    let token = store.put(pending(5)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let store = Arc::clone(&store);
        let token = token.clone();
        handles.push(tokio::spawn(async move { store.take(&token).await.unwrap() }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_path_like_token_never_touches_other_files() {
    let dir = TempDir::new().unwrap();
    let mfa_dir = dir.path().join("mfa");
    let store = FileMfaStore::new(&mfa_dir, TEN_MINUTES);
    store.put(pending(1)).await.unwrap();
    fs::write(dir.path().join("members.json"), b"[]").unwrap();

    assert!(store.take("../members").await.unwrap().is_none());
    assert!(dir.path().join("members.json").exists());
}
