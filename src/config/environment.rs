// ABOUTME: Environment-based configuration for the aggregation service and CLI
// ABOUTME: Storage home, default reporting range, concurrency, timeouts and provider overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use squad_core::constants::rollups::DEFAULT_MONTH_CONCURRENCY;
use squad_core::errors::{AppError, AppResult};
use squad_core::models::ProviderKind;
use squad_providers::{HttpClientConfig, ProviderConfig};
use tracing::debug;

use crate::aggregation::ReportWindow;

/// Directory name used under the user's home when `SQUAD_HOME` is unset
pub const DEFAULT_HOME_DIR: &str = ".squad_stats";

/// Roster document file name inside the home directory
pub const ROSTER_FILE: &str = "members.json";

/// Directory holding pending MFA handoff records
pub const MFA_DIR: &str = "mfa_pending";

/// Default lifetime of a pending MFA login, in seconds
pub const DEFAULT_MFA_TTL_SECS: u64 = 600;

/// Endpoint and credential overrides for one provider
///
/// Unset fields keep the registry's built-in values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOverrides {
    /// Replacement API base URL
    pub api_base_url: Option<String>,
    /// Replacement OAuth token endpoint
    pub token_url: Option<String>,
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
}

impl ProviderOverrides {
    /// Read `SQUAD_<P>_API_BASE_URL`, `SQUAD_<P>_TOKEN_URL`, `<P>_CLIENT_ID` and `<P>_CLIENT_SECRET`
    #[must_use]
    pub fn from_env(provider: ProviderKind) -> Self {
        let prefix = provider.as_str().to_uppercase();
        Self {
            api_base_url: non_empty_var(&format!("SQUAD_{prefix}_API_BASE_URL")),
            token_url: non_empty_var(&format!("SQUAD_{prefix}_TOKEN_URL")),
            client_id: non_empty_var(&format!("{prefix}_CLIENT_ID")),
            client_secret: non_empty_var(&format!("{prefix}_CLIENT_SECRET")),
        }
    }

    /// Whether any field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.api_base_url.is_none()
            && self.token_url.is_none()
            && self.client_id.is_none()
            && self.client_secret.is_none()
    }

    /// Layer these overrides on top of `base`
    #[must_use]
    pub fn apply(&self, base: &ProviderConfig) -> ProviderConfig {
        let mut config = base.clone();
        if let Some(url) = &self.api_base_url {
            url.clone_into(&mut config.api_base_url);
        }
        if let Some(url) = &self.token_url {
            url.clone_into(&mut config.token_url);
        }
        if let Some(id) = &self.client_id {
            id.clone_into(&mut config.client_id);
        }
        if let Some(secret) = &self.client_secret {
            secret.clone_into(&mut config.client_secret);
        }
        config
    }
}

/// Service configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct SquadConfig {
    /// Root directory for the roster, sessions and MFA records
    pub home: PathBuf,
    /// Reporting window used when a caller does not pick one
    pub default_range: ReportWindow,
    /// Width of the per-member month fetch pool
    pub month_concurrency: usize,
    /// Deadline applied to every adapter call, when set
    pub fetch_timeout: Option<Duration>,
    /// Lifetime of a pending MFA login
    pub mfa_ttl: Duration,
    /// Timeouts for the shared provider HTTP client
    pub http: HttpClientConfig,
    /// Per-provider endpoint and credential overrides
    pub providers: HashMap<ProviderKind, ProviderOverrides>,
}

impl SquadConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error when a variable is present but malformed, or when
    /// no home directory can be determined
    pub fn from_env() -> AppResult<Self> {
        let home = match non_empty_var("SQUAD_HOME") {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .map(|dir| dir.join(DEFAULT_HOME_DIR))
                .ok_or_else(|| {
                    AppError::config("SQUAD_HOME is unset and no home directory is available")
                })?,
        };

        let default_range = match non_empty_var("SQUAD_DEFAULT_RANGE") {
            Some(preset) => ReportWindow::parse_preset(&preset).ok_or_else(|| {
                AppError::config(format!(
                    "SQUAD_DEFAULT_RANGE must be one of today, 1w, 4w (got '{preset}')"
                ))
            })?,
            None => ReportWindow::default(),
        };

        let month_concurrency: usize =
            env_parse("SQUAD_MONTH_CONCURRENCY")?.unwrap_or(DEFAULT_MONTH_CONCURRENCY);
        if month_concurrency == 0 {
            return Err(AppError::config("SQUAD_MONTH_CONCURRENCY must be at least 1"));
        }

        let fetch_timeout = env_parse::<u64>("SQUAD_FETCH_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let mfa_ttl = Duration::from_secs(
            env_parse("SQUAD_MFA_TTL_SECS")?.unwrap_or(DEFAULT_MFA_TTL_SECS),
        );

        let defaults = HttpClientConfig::default();
        let http = HttpClientConfig {
            timeout_secs: env_parse("SQUAD_HTTP_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            connect_timeout_secs: env_parse("SQUAD_HTTP_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.connect_timeout_secs),
        };

        let providers = ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, ProviderOverrides::from_env(kind)))
            .filter(|(_, overrides)| !overrides.is_empty())
            .collect();

        let config = Self {
            home,
            default_range,
            month_concurrency,
            fetch_timeout,
            mfa_ttl,
            http,
            providers,
        };
        debug!(home = %config.home.display(), "configuration loaded");
        Ok(config)
    }

    /// Configuration rooted at `home` with every other setting at its default
    #[must_use]
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
            default_range: ReportWindow::default(),
            month_concurrency: DEFAULT_MONTH_CONCURRENCY,
            fetch_timeout: None,
            mfa_ttl: Duration::from_secs(DEFAULT_MFA_TTL_SECS),
            http: HttpClientConfig::default(),
            providers: HashMap::new(),
        }
    }

    /// Path of the roster document
    #[must_use]
    pub fn roster_path(&self) -> PathBuf {
        self.home.join(ROSTER_FILE)
    }

    /// Directory for pending MFA handoff records
    #[must_use]
    pub fn mfa_dir(&self) -> PathBuf {
        self.home.join(MFA_DIR)
    }

    /// Overrides configured for `provider`, if any
    #[must_use]
    pub fn provider_overrides(&self, provider: ProviderKind) -> Option<&ProviderOverrides> {
        self.providers.get(&provider)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse an optional numeric variable; a present but malformed value is an error
fn env_parse<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    non_empty_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AppError::config(format!("invalid value for {key} ('{raw}'): {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ProviderConfig {
        ProviderConfig {
            kind: ProviderKind::Strava,
            api_base_url: "https://www.strava.com/api/v3".into(),
            token_url: "https://www.strava.com/oauth/token".into(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }

    #[test]
    fn test_overrides_only_replace_set_fields() {
        let overrides = ProviderOverrides {
            api_base_url: Some("http://127.0.0.1:9000/api".into()),
            client_id: Some("abc".into()),
            ..ProviderOverrides::default()
        };
        let applied = overrides.apply(&base());
        assert_eq!(applied.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(applied.token_url, "https://www.strava.com/oauth/token");
        assert_eq!(applied.client_id, "abc");
        assert!(!overrides.is_empty());
        assert!(ProviderOverrides::default().is_empty());
    }

    #[test]
    fn test_with_home_paths() {
        let config = SquadConfig::with_home("/tmp/squad");
        assert_eq!(config.roster_path(), PathBuf::from("/tmp/squad/members.json"));
        assert_eq!(config.mfa_dir(), PathBuf::from("/tmp/squad/mfa_pending"));
        assert_eq!(config.month_concurrency, 4);
    }
}
