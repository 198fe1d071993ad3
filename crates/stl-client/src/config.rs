// ST&L Logistics
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Configuration management for the logistics client
//!
//! Values come from built-in defaults, an optional TOML file and `STL_*`
//! environment variables, in that order of increasing precedence.

use crate::access::{FallbackPolicy, RouteKey};
use crate::error::ClientResult;
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Which backend answers API calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The real HTTP API
    #[default]
    Http,

    /// In-process fixtures for local development
    Fixture,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Http => f.write_str("http"),
            DataSource::Fixture => f.write_str("fixture"),
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(DataSource::Http),
            "fixture" | "mock" => Ok(DataSource::Fixture),
            other => Err(format!("unknown data source '{}'", other)),
        }
    }
}

/// API endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the logistics API
    pub base_url: String,

    /// Token endpoint (credentials in, token pair out)
    pub token_path: String,

    /// Current-user endpoint
    pub profile_path: String,

    /// Account creation endpoint
    pub register_path: String,

    /// Per-request timeout in seconds, `None` waits forever
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            token_path: "/api/token/".to_string(),
            profile_path: "/api/users/me/".to_string(),
            register_path: "/api/users/".to_string(),
            request_timeout_secs: Some(30),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

/// Where authenticated-but-unauthorized navigations land
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessConfig {
    pub fallback_route: RouteKey,
    pub role_fallbacks: HashMap<Role, RouteKey>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            fallback_route: RouteKey::ShipmentsList,
            role_fallbacks: HashMap::new(),
        }
    }
}

impl AccessConfig {
    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.role_fallbacks
            .iter()
            .fold(FallbackPolicy::new(self.fallback_route), |policy, (role, route)| policy.with_role_fallback(*role, *route))
    }
}

/// Fixture backend settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FixtureConfig {
    /// Only this password is accepted when set
    pub password: Option<String>,
}

/// Configuration for the logistics client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory holding persisted tokens
    pub data_dir: PathBuf,

    pub data_source: DataSource,
    pub api: ApiConfig,
    pub access: AccessConfig,
    pub fixture: FixtureConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("stl"),
            data_source: DataSource::default(),
            api: ApiConfig::default(),
            access: AccessConfig::default(),
            fixture: FixtureConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `STL_*` environment variables on top of this configuration
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `STL_*` overrides from `lookup`. Unparsable values keep the current setting.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("STL_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(path) = lookup("STL_TOKEN_PATH") {
            self.api.token_path = path;
        }
        if let Some(path) = lookup("STL_PROFILE_PATH") {
            self.api.profile_path = path;
        }
        if let Some(path) = lookup("STL_REGISTER_PATH") {
            self.api.register_path = path;
        }
        if let Some(secs) = lookup("STL_REQUEST_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => self.api.request_timeout_secs = None,
                Ok(secs) => self.api.request_timeout_secs = Some(secs),
                Err(e) => warn!(value = %secs, error = %e, "Ignoring invalid STL_REQUEST_TIMEOUT_SECS"),
            }
        }
        if let Some(source) = lookup("STL_DATA_SOURCE") {
            match source.parse() {
                Ok(source) => self.data_source = source,
                Err(e) => warn!(error = %e, "Ignoring invalid STL_DATA_SOURCE"),
            }
        }
        if let Some(route) = lookup("STL_FALLBACK_ROUTE") {
            match route.trim().parse() {
                Ok(route) => self.access.fallback_route = route,
                Err(e) => warn!(error = %e, "Ignoring invalid STL_FALLBACK_ROUTE"),
            }
        }
        if let Some(password) = lookup("STL_FIXTURE_PASSWORD") {
            self.fixture.password = Some(password);
        }
        if let Some(dir) = lookup("STL_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ClientResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the effective configuration for a CLI invocation
    pub fn resolve(cli_config: Option<PathBuf>, cli_data_dir: Option<PathBuf>) -> ClientResult<Self> {
        let config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Ok(env_config) = env::var("STL_CONFIG") {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        let mut config = config.with_env_overrides();

        // CLI data_dir overrides environment settings
        if let Some(data_dir) = cli_data_dir {
            config.data_dir = data_dir;
        }

        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }
}
