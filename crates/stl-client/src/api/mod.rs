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

//! API client capability
//!
//! The session manager talks to the logistics API only through [`ApiClient`].
//! Which implementation answers is a configuration choice: the real HTTP API
//! or in-process fixtures for local development.

pub mod fixture;
pub mod http;

pub use fixture::FixtureApiClient;
pub use http::HttpApiClient;

use crate::config::{ClientConfig, DataSource};
use crate::error::ClientResult;
use crate::models::{LoginRequest, ProfileResponse, RegistrationRequest, TokenPair};
use crate::session::TokenStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Operations the client needs from the logistics API.
///
/// Implementations attach the stored bearer token to every request themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Exchange credentials for a token pair
    async fn obtain_tokens(&self, request: &LoginRequest) -> ClientResult<TokenPair>;

    /// Fetch the user the stored access token belongs to
    async fn current_user(&self) -> ClientResult<ProfileResponse>;

    /// Create a client account
    async fn register(&self, request: &RegistrationRequest) -> ClientResult<ProfileResponse>;
}

/// Build the API client selected by `config.data_source`
pub fn connect(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Arc<dyn ApiClient> {
    match config.data_source {
        DataSource::Http => {
            info!(base_url = %config.api.base_url, "Using HTTP API client");
            Arc::new(HttpApiClient::new(config.api.clone(), store))
        }
        DataSource::Fixture => {
            info!("Using fixture API client");
            let client = FixtureApiClient::new(store);
            match &config.fixture.password {
                Some(password) => Arc::new(client.with_password(password.clone())),
                None => Arc::new(client),
            }
        }
    }
}
