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

//! Navigable screens and their static permission table

use crate::error::{ClientError, ClientResult};
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Identifier of a navigable screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKey {
    Login,
    Register,
    Dashboard,
    Payments,
    ShipmentsList,
    ShipmentsCreate,
    ShipmentsDetail,
    InvoicesList,
    InvoicesGenerate,
    Incidents,
    IncidentsDetail,
    ClaimsList,
    ClaimsCreate,
    ClaimsDetail,
}

impl RouteKey {
    pub const ALL: [RouteKey; 14] = [
        RouteKey::Login,
        RouteKey::Register,
        RouteKey::Dashboard,
        RouteKey::Payments,
        RouteKey::ShipmentsList,
        RouteKey::ShipmentsCreate,
        RouteKey::ShipmentsDetail,
        RouteKey::InvoicesList,
        RouteKey::InvoicesGenerate,
        RouteKey::Incidents,
        RouteKey::IncidentsDetail,
        RouteKey::ClaimsList,
        RouteKey::ClaimsCreate,
        RouteKey::ClaimsDetail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RouteKey::Login => "login",
            RouteKey::Register => "register",
            RouteKey::Dashboard => "dashboard",
            RouteKey::Payments => "payments",
            RouteKey::ShipmentsList => "shipments-list",
            RouteKey::ShipmentsCreate => "shipments-create",
            RouteKey::ShipmentsDetail => "shipments-detail",
            RouteKey::InvoicesList => "invoices-list",
            RouteKey::InvoicesGenerate => "invoices-generate",
            RouteKey::Incidents => "incidents",
            RouteKey::IncidentsDetail => "incidents-detail",
            RouteKey::ClaimsList => "claims-list",
            RouteKey::ClaimsCreate => "claims-create",
            RouteKey::ClaimsDetail => "claims-detail",
        }
    }

    /// Path pattern in router syntax
    pub fn pattern(&self) -> &'static str {
        match self {
            RouteKey::Login => "/login",
            RouteKey::Register => "/register",
            RouteKey::Dashboard => "/dashboard",
            RouteKey::Payments => "/payments",
            RouteKey::ShipmentsList => "/shipments",
            RouteKey::ShipmentsCreate => "/shipments/create",
            RouteKey::ShipmentsDetail => "/shipments/{id}",
            RouteKey::InvoicesList => "/invoices",
            RouteKey::InvoicesGenerate => "/invoices/generate",
            RouteKey::Incidents => "/incidents",
            RouteKey::IncidentsDetail => "/incidents/{id}",
            RouteKey::ClaimsList => "/claims",
            RouteKey::ClaimsCreate => "/claims/create",
            RouteKey::ClaimsDetail => "/claims/{id}",
        }
    }

    /// Concrete path for this screen. Detail screens need an id.
    pub fn path(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => self.pattern().replace("{id}", id),
            None => self.pattern().replace("/{id}", ""),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RouteKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteKey::ALL.into_iter().find(|route| route.name() == s).ok_or_else(|| format!("unknown route '{}'", s))
    }
}

/// Who may open a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session
    Public,

    /// Any authenticated role
    Authenticated,

    /// Only the listed roles
    Roles(Vec<Role>),
}

impl Access {
    /// An empty role list means any authenticated role.
    pub fn roles(roles: &[Role]) -> Self {
        if roles.is_empty() { Access::Authenticated } else { Access::Roles(roles.to_vec()) }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }

    pub fn permits(&self, role: Role) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::Roles(roles) => roles.contains(&role),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("public"),
            Access::Authenticated => f.write_str("any"),
            Access::Roles(roles) => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// Static permission entry for one screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePermission {
    pub route: RouteKey,
    pub access: Access,
}

impl RoutePermission {
    pub fn new(route: RouteKey, access: Access) -> Self {
        Self { route, access }
    }
}

/// Result of matching a path against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The path names a screen
    Route { route: RouteKey, params: HashMap<String, String> },

    /// The path is an alias or unknown and must be re-navigated
    Redirect(RouteKey),
}

/// Immutable route configuration: one permission per screen plus a path router
pub struct RouteTable {
    permissions: Vec<RoutePermission>,
    router: matchit::Router<RouteKey>,
}

impl RouteTable {
    /// Build a table, checking that every screen has exactly one entry
    pub fn new(permissions: Vec<RoutePermission>) -> ClientResult<Self> {
        let mut seen = HashSet::new();
        for permission in &permissions {
            if !seen.insert(permission.route) {
                return Err(ClientError::Config {
                    message: format!("Duplicate permission entry for route '{}'", permission.route),
                });
            }
        }

        if let Some(missing) = RouteKey::ALL.iter().find(|route| !seen.contains(route)) {
            return Err(ClientError::Config {
                message: format!("No permission entry for route '{}'", missing),
            });
        }

        let mut router = matchit::Router::new();
        for permission in &permissions {
            router.insert(permission.route.pattern(), permission.route)?;
        }

        Ok(Self { permissions, router })
    }

    /// Permission table of the logistics web client
    pub fn standard() -> ClientResult<Self> {
        use Role::*;

        Self::new(vec![
            RoutePermission::new(RouteKey::Login, Access::Public),
            RoutePermission::new(RouteKey::Register, Access::Public),
            RoutePermission::new(RouteKey::Dashboard, Access::roles(&[Admin, Agent, Driver, Client])),
            RoutePermission::new(RouteKey::Payments, Access::roles(&[Admin, Agent])),
            RoutePermission::new(RouteKey::ShipmentsList, Access::Authenticated),
            RoutePermission::new(RouteKey::ShipmentsCreate, Access::roles(&[Admin, Agent, Client])),
            RoutePermission::new(RouteKey::ShipmentsDetail, Access::Authenticated),
            RoutePermission::new(RouteKey::InvoicesList, Access::Authenticated),
            RoutePermission::new(RouteKey::InvoicesGenerate, Access::roles(&[Admin, Agent])),
            RoutePermission::new(RouteKey::Incidents, Access::roles(&[Admin, Agent, Driver])),
            RoutePermission::new(RouteKey::IncidentsDetail, Access::roles(&[Admin, Agent])),
            RoutePermission::new(RouteKey::ClaimsList, Access::Authenticated),
            RoutePermission::new(RouteKey::ClaimsCreate, Access::roles(&[Client])),
            RoutePermission::new(RouteKey::ClaimsDetail, Access::Authenticated),
        ])
    }

    pub fn permission(&self, route: RouteKey) -> Option<&RoutePermission> {
        self.permissions.iter().find(|permission| permission.route == route)
    }

    pub fn permissions(&self) -> &[RoutePermission] {
        &self.permissions
    }

    /// Match a browser-style path. `/` goes to login, anything unknown to the dashboard.
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        if trimmed.is_empty() {
            return Resolution::Redirect(RouteKey::Login);
        }

        match self.router.at(trimmed) {
            Ok(matched) => Resolution::Route {
                route: *matched.value,
                params: matched.params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            },
            Err(_) => Resolution::Redirect(RouteKey::Dashboard),
        }
    }
}
