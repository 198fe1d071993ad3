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

//! Error handling for the logistics client
//!
//! Every failure is reported at the boundary where it happens. The session
//! manager downgrades most of these to a logged-out session; callers that need
//! to tell a rejected password from an unreachable server match on the variant.

use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Session expired or invalid: {message}")]
    SessionExpired { message: String },

    #[error("Not authenticated: {message}")]
    NotAuthenticated { message: String },

    #[error("Role '{role}' is not allowed to open '{route}'")]
    UnauthorizedForRoute { route: String, role: String },

    #[error("Session is still resolving")]
    SessionResolving,

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Routing error: {message}")]
    Routing { message: String },

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::InvalidCredentials { .. } => "invalid_credentials",
            ClientError::SessionExpired { .. } => "session_expired",
            ClientError::NotAuthenticated { .. } => "not_authenticated",
            ClientError::UnauthorizedForRoute { .. } => "unauthorized_for_route",
            ClientError::SessionResolving => "session_resolving",
            ClientError::Transport { .. } => "transport_failure",
            ClientError::Timeout { .. } => "timeout",
            ClientError::Api { .. } => "api_error",
            ClientError::Storage { .. } => "storage_error",
            ClientError::Config { .. } => "config_error",
            ClientError::Routing { .. } => "routing_error",
            ClientError::SerdeJson(_) => "json_error",
            ClientError::IoError(_) => "io_error",
        }
    }

    /// Whether the server could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. } | ClientError::Timeout { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<hyper::http::Error> for ClientError {
    fn from(err: hyper::http::Error) -> Self {
        ClientError::Transport { message: err.to_string() }
    }
}

impl From<hyper::Error> for ClientError {
    fn from(err: hyper::Error) -> Self {
        ClientError::Transport { message: err.to_string() }
    }
}

impl From<hyper_util::client::legacy::Error> for ClientError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        ClientError::Transport { message: err.to_string() }
    }
}

impl From<matchit::InsertError> for ClientError {
    fn from(err: matchit::InsertError) -> Self {
        ClientError::Routing { message: err.to_string() }
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config { message: err.to_string() }
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config { message: err.to_string() }
    }
}
