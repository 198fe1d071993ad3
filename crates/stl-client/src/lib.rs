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

//! ST&L Logistics client core
//!
//! Authentication session and route-level access control for the logistics
//! portal. The [`session`] module owns the credential lifecycle against the
//! backend reached through [`api`], and the [`access`] module decides which
//! screens a session may open and which menu entries it sees.

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

pub use error::{ClientError, ClientResult};
