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

//! Role-conditional view dispatch
//!
//! A route normally renders one view. Some routes swap the view by role, e.g.
//! drivers get the incident report form where staff get the incident list.
//! Overrides live in a lookup table so a new role is a new row.

use crate::access::routes::RouteKey;
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a page component
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    Login,
    Register,
    Dashboard,
    Payments,
    ShipmentsList,
    ShipmentCreate,
    ShipmentDetail,
    InvoicesList,
    InvoiceGenerate,
    IncidentsList,
    IncidentCreate,
    IncidentDetail,
    ClaimsList,
    ClaimCreate,
    ClaimDetail,
}

impl ViewId {
    pub fn name(&self) -> &'static str {
        match self {
            ViewId::Login => "login",
            ViewId::Register => "register",
            ViewId::Dashboard => "dashboard",
            ViewId::Payments => "payments",
            ViewId::ShipmentsList => "shipments-list",
            ViewId::ShipmentCreate => "shipment-create",
            ViewId::ShipmentDetail => "shipment-detail",
            ViewId::InvoicesList => "invoices-list",
            ViewId::InvoiceGenerate => "invoice-generate",
            ViewId::IncidentsList => "incidents-list",
            ViewId::IncidentCreate => "incident-create",
            ViewId::IncidentDetail => "incident-detail",
            ViewId::ClaimsList => "claims-list",
            ViewId::ClaimCreate => "claim-create",
            ViewId::ClaimDetail => "claim-detail",
        }
    }

    /// View rendered when no role override applies
    pub fn default_for(route: RouteKey) -> Self {
        match route {
            RouteKey::Login => ViewId::Login,
            RouteKey::Register => ViewId::Register,
            RouteKey::Dashboard => ViewId::Dashboard,
            RouteKey::Payments => ViewId::Payments,
            RouteKey::ShipmentsList => ViewId::ShipmentsList,
            RouteKey::ShipmentsCreate => ViewId::ShipmentCreate,
            RouteKey::ShipmentsDetail => ViewId::ShipmentDetail,
            RouteKey::InvoicesList => ViewId::InvoicesList,
            RouteKey::InvoicesGenerate => ViewId::InvoiceGenerate,
            RouteKey::Incidents => ViewId::IncidentsList,
            RouteKey::IncidentsDetail => ViewId::IncidentDetail,
            RouteKey::ClaimsList => ViewId::ClaimsList,
            RouteKey::ClaimsCreate => ViewId::ClaimCreate,
            RouteKey::ClaimsDetail => ViewId::ClaimDetail,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(route, role) -> view` lookup with per-route defaults
#[derive(Debug, Clone, Default)]
pub struct ViewTable {
    overrides: HashMap<(RouteKey, Role), ViewId>,
}

impl ViewTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch table of the logistics web client
    pub fn standard() -> Self {
        Self::new().with_override(RouteKey::Incidents, Role::Driver, ViewId::IncidentCreate)
    }

    pub fn with_override(mut self, route: RouteKey, role: Role, view: ViewId) -> Self {
        self.overrides.insert((route, role), view);
        self
    }

    /// Only meaningful once the route has been authorized for `role`.
    pub fn view_for(&self, route: RouteKey, role: Role) -> ViewId {
        self.overrides.get(&(route, role)).copied().unwrap_or_else(|| ViewId::default_for(route))
    }
}
