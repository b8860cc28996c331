// ABOUTME: Shared fixtures for provider adapter integration tests
// ABOUTME: Spawns local axum servers standing in for provider APIs and seeds session stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
#![allow(missing_docs)]

use axum::http::HeaderMap;
use axum::Router;
use chrono::{Duration, Utc};
use squad_core::models::{MemberId, ProviderKind, ProviderSession};
use squad_providers::{InMemorySessionStore, ProviderConfig, RetryConfig, SessionStore};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Provider configuration pointing both the API and the token endpoint at `base`
pub fn local_config(kind: ProviderKind, base: &str) -> ProviderConfig {
    ProviderConfig {
        kind,
        api_base_url: format!("{base}/api"),
        token_url: format!("{base}/oauth/token"),
        client_id: "test-client".to_owned(),
        client_secret: "test-secret".to_owned(),
    }
}

/// Session valid for another hour
pub fn valid_session(token: &str) -> ProviderSession {
    ProviderSession {
        access_token: token.to_owned(),
        refresh_token: Some("refresh-1".to_owned()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        height_m: Some(1.80),
    }
}

/// Session whose access token expired a minute ago
pub fn expired_session(token: &str) -> ProviderSession {
    ProviderSession {
        expires_at: Some(Utc::now() - Duration::minutes(1)),
        ..valid_session(token)
    }
}

/// Store holding `session` for the member
pub async fn store_with(
    member_id: MemberId,
    provider: ProviderKind,
    session: ProviderSession,
) -> Arc<InMemorySessionStore> {
    let store = Arc::new(InMemorySessionStore::new());
    store.save(member_id, provider, &session).await.unwrap();
    store
}

/// Retry policy that gives up quickly
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_backoff_ms: 1,
        ..RetryConfig::default()
    }
}

/// Whether the request carries `Bearer <token>`
pub fn has_bearer(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {token}"))
}
