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

//! Data models shared by the session manager, the API backends and the access controller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ====== Roles ======

/// Role assigned to an authenticated principal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Agent,
    Driver,
    Client,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Agent, Role::Driver, Role::Client];

    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Agent => "AGENT",
            Role::Driver => "DRIVER",
            Role::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Role values are matched exactly; the server only ever emits upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL.into_iter().find(|role| role.as_str() == s).ok_or_else(|| format!("unrecognized role '{}'", s))
    }
}

// ====== Authentication Models ======

/// Credentials exchanged for a token pair
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest").field("username", &self.username).field("password", &"<redacted>").finish()
    }
}

/// Token pair returned by the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Bearer token attached to every API request
    #[serde(alias = "access", alias = "accessToken")]
    pub access_token: String,

    /// Refresh token, persisted but never used for rotation
    #[serde(alias = "refresh", alias = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

// ====== Profile Models ======

/// Client-specific profile data nested in a user resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientProfile {
    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    /// Decimal balance, kept as the server's string form
    #[serde(default)]
    pub balance: Option<String>,
}

/// Current-user resource as returned by the profile endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    #[serde(default)]
    pub id: Option<u64>,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// Raw role value; anything outside the four known roles is kept as-is
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub client_profile: Option<ClientProfile>,
}

/// Registration payload. Self-service accounts are always clients.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub client_profile: ClientProfile,
}

impl RegistrationRequest {
    /// Create a client registration
    pub fn client(username: impl Into<String>, email: impl Into<String>, password: impl Into<String>, company_name: Option<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: Role::Client,
            client_profile: ClientProfile {
                company_name,
                ..ClientProfile::default()
            },
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("client_profile", &self.client_profile)
            .finish()
    }
}

// ====== Session Models ======

/// The authenticated principal held by a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Option<u64>,
    pub username: String,
    pub email: Option<String>,

    /// Raw role as received; see [`User::role`]
    pub role: Option<String>,

    pub company: Option<String>,
}

impl User {
    /// Create a user with a known role
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
            role: Some(role.as_str().to_string()),
            company: None,
        }
    }

    /// Create a user whose role is missing
    pub fn without_role(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
            role: None,
            company: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Recognized role, or `None` when the role is missing or foreign
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|raw| raw.parse().ok())
    }
}

impl From<ProfileResponse> for User {
    fn from(profile: ProfileResponse) -> Self {
        let company = profile.company.or_else(|| profile.client_profile.and_then(|p| p.company_name)).filter(|c| !c.is_empty());

        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            role: profile.role,
            company,
        }
    }
}
