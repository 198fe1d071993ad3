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

//! Navigation menu filtering

use crate::access::routes::RouteKey;
use crate::models::Role;

/// One navigation entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub route: RouteKey,
    pub roles: Vec<Role>,

    /// Per-role display names, e.g. drivers see shipments as their assigned cargo
    pub role_labels: Vec<(Role, String)>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, route: RouteKey, roles: &[Role]) -> Self {
        Self {
            name: name.into(),
            route,
            roles: roles.to_vec(),
            role_labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, role: Role, label: impl Into<String>) -> Self {
        self.role_labels.push((role, label.into()));
        self
    }

    pub fn label_for(&self, role: Role) -> &str {
        self.role_labels.iter().find(|(r, _)| *r == role).map(|(_, label)| label.as_str()).unwrap_or(&self.name)
    }
}

/// A labelled group of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub label: String,
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    pub fn new(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self { label: label.into(), items }
    }
}

/// Entry as shown to a particular role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub route: RouteKey,
    pub path: String,
}

impl MenuEntry {
    /// Highlight rule: the current path starts with the entry's path
    pub fn is_active(&self, current_path: &str) -> bool {
        current_path.starts_with(&self.path)
    }
}

/// Group as shown to a particular role; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroupView {
    pub label: String,
    pub entries: Vec<MenuEntry>,
}

/// The sidebar of the logistics web client
pub fn standard_menu() -> Vec<MenuGroup> {
    use Role::*;

    vec![
        MenuGroup::new(
            "Core Operations",
            vec![
                MenuItem::new("Dashboard", RouteKey::Dashboard, &[Admin, Agent, Driver]),
                MenuItem::new("Shipments", RouteKey::ShipmentsList, &[Admin, Agent, Driver, Client]).with_label(Driver, "Assigned Cargo"),
            ],
        ),
        MenuGroup::new(
            "Financials",
            vec![
                MenuItem::new("Invoices", RouteKey::InvoicesList, &[Admin, Agent, Client]),
                MenuItem::new("Payments", RouteKey::Payments, &[Admin, Agent]),
            ],
        ),
        MenuGroup::new(
            "Support & Safety",
            vec![
                MenuItem::new("Incidents", RouteKey::Incidents, &[Admin, Agent, Driver]),
                MenuItem::new("Claims", RouteKey::ClaimsList, &[Admin, Agent, Client]),
            ],
        ),
    ]
}

/// Keep the items `role` may see, dropping groups left empty.
/// Declaration order is preserved for groups and items. Without a role nothing is visible.
pub fn filter_menu(groups: &[MenuGroup], role: Option<Role>) -> Vec<MenuGroupView> {
    let Some(role) = role else {
        return Vec::new();
    };

    groups
        .iter()
        .filter_map(|group| {
            let entries: Vec<MenuEntry> = group
                .items
                .iter()
                .filter(|item| item.roles.contains(&role))
                .map(|item| MenuEntry {
                    label: item.label_for(role).to_string(),
                    route: item.route,
                    path: item.route.path(None),
                })
                .collect();

            (!entries.is_empty()).then(|| MenuGroupView {
                label: group.label.clone(),
                entries,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(view: &MenuGroupView) -> Vec<&str> {
        view.entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    #[test]
    fn test_client_keeps_partial_financials_group() {
        use Role::*;
        let menu = vec![
            MenuGroup::new(
                "Core",
                vec![
                    MenuItem::new("Dashboard", RouteKey::Dashboard, &Role::ALL),
                    MenuItem::new("Shipments", RouteKey::ShipmentsList, &Role::ALL),
                ],
            ),
            MenuGroup::new(
                "Financials",
                vec![
                    MenuItem::new("Invoices", RouteKey::InvoicesList, &[Admin, Agent, Client]),
                    MenuItem::new("Payments", RouteKey::Payments, &[Admin, Agent]),
                ],
            ),
        ];

        let visible = filter_menu(&menu, Some(Client));
        assert_eq!(visible.len(), 2);
        assert_eq!(labels(&visible[0]), vec!["Dashboard", "Shipments"]);
        assert_eq!(visible[1].label, "Financials");
        assert_eq!(labels(&visible[1]), vec!["Invoices"]);
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let visible = filter_menu(&standard_menu(), Some(Role::Driver));
        let groups: Vec<&str> = visible.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(groups, vec!["Core Operations", "Support & Safety"]);
        assert_eq!(labels(&visible[0]), vec!["Dashboard", "Assigned Cargo"]);
        assert_eq!(labels(&visible[1]), vec!["Incidents"]);
    }

    #[test]
    fn test_admin_sees_everything_in_order() {
        let visible = filter_menu(&standard_menu(), Some(Role::Admin));
        let all: Vec<&str> = visible.iter().flat_map(labels).collect();
        assert_eq!(all, vec!["Dashboard", "Shipments", "Invoices", "Payments", "Incidents", "Claims"]);
    }

    #[test]
    fn test_no_role_no_menu() {
        assert!(filter_menu(&standard_menu(), None).is_empty());
    }

    #[test]
    fn test_active_entry_by_prefix() {
        let visible = filter_menu(&standard_menu(), Some(Role::Client));
        let shipments = &visible[0].entries[0];
        assert_eq!(shipments.path, "/shipments");
        assert!(shipments.is_active("/shipments/42"));
        assert!(!shipments.is_active("/claims"));
    }
}
