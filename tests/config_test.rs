// ABOUTME: Integration tests for environment configuration and context wiring
// ABOUTME: Defaults, malformed values, provider overrides and registry construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use squad_core::errors::ErrorCode;
use squad_core::models::ProviderKind;
use squad_providers::{InMemorySessionStore, SessionStore};
use squad_stats::aggregation::ReportWindow;
use squad_stats::config::{ProviderOverrides, SquadConfig};
use squad_stats::context::{build_registry, SquadContext};
use tempfile::TempDir;

const VARS: &[&str] = &[
    "SQUAD_HOME",
    "SQUAD_DEFAULT_RANGE",
    "SQUAD_MONTH_CONCURRENCY",
    "SQUAD_FETCH_TIMEOUT_SECS",
    "SQUAD_MFA_TTL_SECS",
    "SQUAD_HTTP_TIMEOUT_SECS",
    "SQUAD_HTTP_CONNECT_TIMEOUT_SECS",
    "SQUAD_STRAVA_API_BASE_URL",
    "SQUAD_STRAVA_TOKEN_URL",
    "STRAVA_CLIENT_ID",
    "STRAVA_CLIENT_SECRET",
    "SQUAD_GARMIN_API_BASE_URL",
    "SQUAD_GARMIN_TOKEN_URL",
    "GARMIN_CLIENT_ID",
    "GARMIN_CLIENT_SECRET",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_with_explicit_home() {
    clear_env();
    env::set_var("SQUAD_HOME", "/var/lib/squad");

    let config = SquadConfig::from_env().unwrap();

    assert_eq!(config.home.to_str(), Some("/var/lib/squad"));
    assert_eq!(config.default_range, ReportWindow::Days(7));
    assert_eq!(config.month_concurrency, 4);
    assert_eq!(config.fetch_timeout, None);
    assert_eq!(config.mfa_ttl, Duration::from_secs(600));
    assert!(config.providers.is_empty());
    clear_env();
}

#[test]
#[serial]
fn test_values_are_read_from_environment() {
    clear_env();
    env::set_var("SQUAD_HOME", "/tmp/squad-config");
    env::set_var("SQUAD_DEFAULT_RANGE", "4w");
    env::set_var("SQUAD_MONTH_CONCURRENCY", "2");
    env::set_var("SQUAD_FETCH_TIMEOUT_SECS", "15");
    env::set_var("SQUAD_MFA_TTL_SECS", "90");
    env::set_var("SQUAD_HTTP_TIMEOUT_SECS", "45");

    let config = SquadConfig::from_env().unwrap();

    assert_eq!(config.default_range, ReportWindow::Days(28));
    assert_eq!(config.month_concurrency, 2);
    assert_eq!(config.fetch_timeout, Some(Duration::from_secs(15)));
    assert_eq!(config.mfa_ttl, Duration::from_secs(90));
    assert_eq!(config.http.timeout_secs, 45);
    clear_env();
}

#[test]
#[serial]
fn test_malformed_values_are_config_errors() {
    for (var, value) in [
        ("SQUAD_DEFAULT_RANGE", "fortnight"),
        ("SQUAD_MONTH_CONCURRENCY", "0"),
        ("SQUAD_MONTH_CONCURRENCY", "many"),
        ("SQUAD_FETCH_TIMEOUT_SECS", "-3"),
    ] {
        clear_env();
        env::set_var("SQUAD_HOME", "/tmp/squad-config");
        env::set_var(var, value);

        let error = SquadConfig::from_env().unwrap_err();
        assert_eq!(error.code, ErrorCode::ConfigError, "{var}={value}");
        assert!(error.message.contains(var), "{}", error.message);
    }
    clear_env();
}

#[test]
#[serial]
fn test_provider_overrides_are_collected_per_provider() {
    clear_env();
    env::set_var("SQUAD_HOME", "/tmp/squad-config");
    env::set_var("SQUAD_STRAVA_API_BASE_URL", "http://127.0.0.1:8089/api/v3");
    env::set_var("STRAVA_CLIENT_ID", "12345");

    let config = SquadConfig::from_env().unwrap();

    assert_eq!(
        config.provider_overrides(ProviderKind::Strava),
        Some(&ProviderOverrides {
            api_base_url: Some("http://127.0.0.1:8089/api/v3".to_owned()),
            client_id: Some("12345".to_owned()),
            ..ProviderOverrides::default()
        })
    );
    assert!(config.provider_overrides(ProviderKind::Garmin).is_none());
    clear_env();
}

#[test]
fn test_registry_applies_overrides_over_defaults() {
    let mut config = SquadConfig::with_home("/tmp/unused");
    config.providers.insert(
        ProviderKind::Strava,
        ProviderOverrides {
            api_base_url: Some("http://127.0.0.1:8089/api/v3".to_owned()),
            ..ProviderOverrides::default()
        },
    );
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let registry = build_registry(&config, sessions);

    let strava = registry.config(ProviderKind::Strava).unwrap();
    assert_eq!(strava.api_base_url, "http://127.0.0.1:8089/api/v3");
    assert!(!strava.token_url.is_empty());
    assert!(registry.config(ProviderKind::Garmin).is_some());
}

#[tokio::test]
async fn test_context_starts_from_an_empty_home() {
    let home = TempDir::new().unwrap();
    let context = SquadContext::from_config(SquadConfig::with_home(home.path()))
        .await
        .unwrap();

    assert!(context.roster.all_members().await.is_empty());
    assert!(context.aggregator.team_stats(ReportWindow::Days(1)).await.is_empty());
    assert!(context.mfa.take("missing").await.unwrap().is_none());
    assert_eq!(context.config.roster_path(), home.path().join("members.json"));
}
