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

//! Route-level access control: route table, authorization, view dispatch and menu

pub mod controller;
pub mod menu;
pub mod routes;
pub mod views;

pub use controller::{AccessController, Decision, FallbackPolicy, Gate, Navigation};
pub use menu::{MenuEntry, MenuGroup, MenuGroupView, MenuItem, filter_menu, standard_menu};
pub use routes::{Access, Resolution, RouteKey, RoutePermission, RouteTable};
pub use views::{ViewId, ViewTable};
