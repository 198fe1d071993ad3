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

//! HTTP implementation of the API client

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, ProfileResponse, RegistrationRequest, TokenPair};
use crate::session::TokenStore;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// Client for the logistics REST API
pub struct HttpApiClient {
    client: HttpClient,
    config: ApiConfig,
    store: Arc<dyn TokenStore>,
}

impl HttpApiClient {
    pub fn new(config: ApiConfig, store: Arc<dyn TokenStore>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, config, store }
    }

    fn endpoint(&self, path: &str) -> ClientResult<Uri> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        url.parse::<Uri>().map_err(|e| ClientError::Config {
            message: format!("Invalid API URL '{}': {}", url, e),
        })
    }

    /// Send one request with the stored bearer token attached
    async fn send<T: Serialize + ?Sized>(&self, method: Method, path: &str, payload: Option<&T>) -> ClientResult<(StatusCode, Bytes)> {
        let uri = self.endpoint(path)?;
        let mut builder = Request::builder().method(method.clone()).uri(uri).header(ACCEPT, "application/json");

        if let Some(token) = self.store.access_token()? {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match payload {
            Some(payload) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(serde_json::to_vec(payload)?))
            }
            None => Full::new(Bytes::new()),
        };

        let response = self.client.request(builder.body(body)?).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        debug!(method = %method, path = %path, status = %status, "API request completed");
        Ok((status, bytes))
    }
}

/// Pull a readable message out of an error body (`{"detail": ...}` or plain text)
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
        if value.is_object() {
            return value.to_string();
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() { status.canonical_reason().unwrap_or("Unknown error").to_string() } else { text }
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    ClientError::Api {
        status: status.as_u16(),
        message: error_message(status, body),
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn obtain_tokens(&self, request: &LoginRequest) -> ClientResult<TokenPair> {
        let (status, body) = self.send(Method::POST, &self.config.token_path, Some(request)).await?;

        match status {
            s if s.is_success() => Ok(serde_json::from_slice(&body)?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::InvalidCredentials {
                message: error_message(status, &body),
            }),
            _ => Err(api_error(status, &body)),
        }
    }

    async fn current_user(&self) -> ClientResult<ProfileResponse> {
        let (status, body) = self.send::<()>(Method::GET, &self.config.profile_path, None).await?;

        match status {
            s if s.is_success() => Ok(serde_json::from_slice(&body)?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::SessionExpired {
                message: error_message(status, &body),
            }),
            _ => Err(api_error(status, &body)),
        }
    }

    async fn register(&self, request: &RegistrationRequest) -> ClientResult<ProfileResponse> {
        let (status, body) = self.send(Method::POST, &self.config.register_path, Some(request)).await?;

        if status.is_success() { Ok(serde_json::from_slice(&body)?) } else { Err(api_error(status, &body)) }
    }
}
