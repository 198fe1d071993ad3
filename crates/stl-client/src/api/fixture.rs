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

//! In-process fixture backend for local development
//!
//! Any non-empty username signs in. The profile is derived from the username
//! unless one was seeded or registered: `admin` in the name gives ADMIN,
//! `agent` gives AGENT, `driver` gives DRIVER, anything else CLIENT.

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{ClientProfile, LoginRequest, ProfileResponse, RegistrationRequest, Role, TokenPair};
use crate::session::TokenStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const ACCESS_PREFIX: &str = "fixture.";
const REFRESH_PREFIX: &str = "fixture-refresh.";

/// Fixture-backed API client
pub struct FixtureApiClient {
    store: Arc<dyn TokenStore>,
    password: Option<String>,
    profiles: RwLock<HashMap<String, ProfileResponse>>,
    next_id: AtomicU64,
}

impl FixtureApiClient {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            password: None,
            profiles: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Only accept this password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Serve this profile instead of an inferred one
    pub fn with_profile(self, profile: ProfileResponse) -> Self {
        self.profiles.write().insert(profile.username.clone(), profile);
        self
    }

    /// Role inferred from a username
    pub fn infer_role(username: &str) -> Role {
        let lower = username.to_ascii_lowercase();
        if lower.contains("admin") {
            Role::Admin
        } else if lower.contains("agent") {
            Role::Agent
        } else if lower.contains("driver") {
            Role::Driver
        } else {
            Role::Client
        }
    }

    fn inferred_profile(username: &str) -> ProfileResponse {
        let role = Self::infer_role(username);
        ProfileResponse {
            username: username.to_string(),
            email: Some(format!("{}@fixture.local", username)),
            role: Some(role.as_str().to_string()),
            client_profile: (role == Role::Client).then(|| ClientProfile {
                company_name: Some("Fixture Freight".to_string()),
                ..ClientProfile::default()
            }),
            ..ProfileResponse::default()
        }
    }
}

#[async_trait]
impl ApiClient for FixtureApiClient {
    async fn obtain_tokens(&self, request: &LoginRequest) -> ClientResult<TokenPair> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ClientError::InvalidCredentials {
                message: "Username is required".to_string(),
            });
        }

        if let Some(expected) = &self.password {
            if expected != &request.password {
                return Err(ClientError::InvalidCredentials {
                    message: "No active account found with the given credentials".to_string(),
                });
            }
        }

        debug!(username = %username, "Issuing fixture tokens");
        Ok(TokenPair {
            access_token: format!("{}{}", ACCESS_PREFIX, username),
            refresh_token: Some(format!("{}{}", REFRESH_PREFIX, username)),
        })
    }

    async fn current_user(&self) -> ClientResult<ProfileResponse> {
        let token = self.store.access_token()?.ok_or_else(|| ClientError::SessionExpired {
            message: "No access token stored".to_string(),
        })?;

        let username = token.strip_prefix(ACCESS_PREFIX).filter(|name| !name.is_empty()).ok_or_else(|| ClientError::SessionExpired {
            message: "Token was not issued by the fixture backend".to_string(),
        })?;

        let seeded = self.profiles.read().get(username).cloned();
        Ok(seeded.unwrap_or_else(|| Self::inferred_profile(username)))
    }

    async fn register(&self, request: &RegistrationRequest) -> ClientResult<ProfileResponse> {
        let mut profiles = self.profiles.write();
        if profiles.contains_key(&request.username) {
            return Err(ClientError::Api {
                status: 400,
                message: "A user with that username already exists.".to_string(),
            });
        }

        let profile = ProfileResponse {
            id: Some(self.next_id.fetch_add(1, Ordering::Relaxed)),
            username: request.username.clone(),
            email: Some(request.email.clone()),
            role: Some(request.role.as_str().to_string()),
            client_profile: Some(request.client_profile.clone()),
            ..ProfileResponse::default()
        };
        profiles.insert(profile.username.clone(), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    #[test]
    fn test_role_inference() {
        assert_eq!(FixtureApiClient::infer_role("agent_joe"), Role::Agent);
        assert_eq!(FixtureApiClient::infer_role("SysAdmin"), Role::Admin);
        assert_eq!(FixtureApiClient::infer_role("driver7"), Role::Driver);
        assert_eq!(FixtureApiClient::infer_role("acme"), Role::Client);
    }

    #[tokio::test]
    async fn test_tokens_identify_the_user() {
        let store = Arc::new(MemoryTokenStore::new());
        let api = FixtureApiClient::new(store.clone());

        let tokens = api.obtain_tokens(&LoginRequest::new("driver7", "x")).await.unwrap();
        store.save_tokens(&tokens).unwrap();

        let profile = api.current_user().await.unwrap();
        assert_eq!(profile.username, "driver7");
        assert_eq!(profile.role.as_deref(), Some("DRIVER"));
    }

    #[tokio::test]
    async fn test_password_enforced_when_configured() {
        let api = FixtureApiClient::new(Arc::new(MemoryTokenStore::new())).with_password("letmein");
        assert!(matches!(api.obtain_tokens(&LoginRequest::new("admin", "nope")).await, Err(ClientError::InvalidCredentials { .. })));
        assert!(api.obtain_tokens(&LoginRequest::new("admin", "letmein")).await.is_ok());
        assert!(matches!(api.obtain_tokens(&LoginRequest::new("  ", "letmein")).await, Err(ClientError::InvalidCredentials { .. })));
    }

    #[tokio::test]
    async fn test_foreign_token_is_expired_session() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save(crate::session::ACCESS_TOKEN_KEY, "eyJhbGciOi").unwrap();
        let api = FixtureApiClient::new(store);
        assert!(matches!(api.current_user().await, Err(ClientError::SessionExpired { .. })));
    }

    #[tokio::test]
    async fn test_registered_profile_wins_over_inference() {
        let store = Arc::new(MemoryTokenStore::new());
        let api = FixtureApiClient::new(store.clone());

        let request = RegistrationRequest::client("admin_of_acme", "ops@acme.test", "pw", Some("Acme".to_string()));
        api.register(&request).await.unwrap();
        assert!(api.register(&request).await.is_err());

        store.save_tokens(&api.obtain_tokens(&LoginRequest::new("admin_of_acme", "pw")).await.unwrap()).unwrap();
        let profile = api.current_user().await.unwrap();
        assert_eq!(profile.role.as_deref(), Some("CLIENT"));
    }
}
