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

//! Navigation gate: decides per screen whether to render or where to redirect
//!
//! The controller never performs I/O. It reads a [`Session`] snapshot handed
//! to it by the caller, so it cannot fail on transport errors.

use crate::access::menu::{MenuGroup, MenuGroupView, filter_menu};
use crate::access::routes::{Access, Resolution, RouteKey, RouteTable};
use crate::access::views::{ViewId, ViewTable};
use crate::error::{ClientError, ClientResult};
use crate::models::Role;
use crate::session::{Session, SessionState};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Outcome of authorizing one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    RedirectToLogin,

    /// Authenticated, but not for this screen
    RedirectToFallback(RouteKey),
}

/// A decision, or a request to hold on the loading placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session bootstrap has not finished; re-evaluate once it has
    Loading,
    Decided(Decision),
}

impl Gate {
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Gate::Loading => None,
            Gate::Decided(decision) => Some(*decision),
        }
    }
}

/// Result of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Loading,
    Render { route: RouteKey, view: ViewId, params: HashMap<String, String> },
    Redirect(RouteKey),
}

/// Where an authorized user lands after being denied a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    default: RouteKey,
    per_role: HashMap<Role, RouteKey>,
}

impl FallbackPolicy {
    pub fn new(default: RouteKey) -> Self {
        Self {
            default,
            per_role: HashMap::new(),
        }
    }

    pub fn with_role_fallback(mut self, role: Role, route: RouteKey) -> Self {
        self.per_role.insert(role, route);
        self
    }

    pub fn target_for(&self, role: Option<Role>) -> RouteKey {
        role.and_then(|role| self.per_role.get(&role).copied()).unwrap_or(self.default)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(RouteKey::ShipmentsList)
    }
}

/// Route-level access controller
pub struct AccessController {
    routes: RouteTable,
    views: ViewTable,
    fallback: FallbackPolicy,
}

impl AccessController {
    /// Create a controller. Every fallback target must be open to the roles it serves,
    /// otherwise a denied navigation would bounce between screens.
    pub fn new(routes: RouteTable, views: ViewTable, fallback: FallbackPolicy) -> ClientResult<Self> {
        for role in Role::ALL {
            let target = fallback.target_for(Some(role));
            let permitted = routes.permission(target).map(|p| p.access.permits(role)).unwrap_or(false);
            if !permitted {
                return Err(ClientError::Config {
                    message: format!("Fallback route '{}' is not accessible to role {}", target, role),
                });
            }
        }

        Ok(Self { routes, views, fallback })
    }

    /// Controller with the standard route table, dispatch table and fallback
    pub fn standard() -> ClientResult<Self> {
        Self::new(RouteTable::standard()?, ViewTable::standard(), FallbackPolicy::default())
    }

    pub fn with_fallback(fallback: FallbackPolicy) -> ClientResult<Self> {
        Self::new(RouteTable::standard()?, ViewTable::standard(), fallback)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether `route` may be shown for `session`.
    ///
    /// Public screens render unconditionally. For protected screens the checks
    /// run in a fixed order: a resolving session holds on loading, a missing user
    /// or unrecognized role goes to login, an unrestricted screen renders, a
    /// permitted role renders, and anything else goes to the fallback screen.
    pub fn authorize(&self, route: RouteKey, session: &Session) -> Gate {
        let Some(permission) = self.routes.permission(route) else {
            warn!(route = %route, "No permission entry for route");
            return Gate::Decided(Decision::RedirectToFallback(self.fallback.target_for(None)));
        };

        if permission.access.is_public() {
            return Gate::Decided(Decision::Render);
        }

        let user = match session.state() {
            SessionState::Resolving => return Gate::Loading,
            SessionState::Anonymous => return Gate::Decided(Decision::RedirectToLogin),
            SessionState::Authenticated(user) => user,
        };

        let Some(role) = user.role() else {
            warn!(username = %user.username, role = ?user.role, route = %route, "Access denied: invalid role");
            return Gate::Decided(Decision::RedirectToLogin);
        };

        if matches!(permission.access, Access::Authenticated) || permission.access.permits(role) {
            debug!(username = %user.username, role = %role, route = %route, "Access granted");
            return Gate::Decided(Decision::Render);
        }

        let target = self.fallback.target_for(Some(role));
        debug!(username = %user.username, role = %role, route = %route, fallback = %target, "Access denied for role");
        Gate::Decided(Decision::RedirectToFallback(target))
    }

    /// View for an authorized route; public screens render their default view
    pub fn view_for(&self, route: RouteKey, role: Option<Role>) -> ViewId {
        match role {
            Some(role) => self.views.view_for(route, role),
            None => ViewId::default_for(route),
        }
    }

    /// Resolve a path, authorize it and pick the view in one step
    pub fn navigate(&self, path: &str, session: &Session) -> Navigation {
        let (route, params) = match self.routes.resolve(path) {
            Resolution::Redirect(target) => return Navigation::Redirect(target),
            Resolution::Route { route, params } => (route, params),
        };

        match self.authorize(route, session) {
            Gate::Loading => Navigation::Loading,
            Gate::Decided(Decision::Render) => Navigation::Render {
                route,
                view: self.view_for(route, session.current_user().and_then(|user| user.role())),
                params,
            },
            Gate::Decided(Decision::RedirectToLogin) => Navigation::Redirect(RouteKey::Login),
            Gate::Decided(Decision::RedirectToFallback(target)) => Navigation::Redirect(target),
        }
    }

    /// Strict variant of [`authorize`](Self::authorize) for call sites that want an error
    pub fn ensure(&self, route: RouteKey, session: &Session) -> ClientResult<ViewId> {
        match self.authorize(route, session) {
            Gate::Loading => Err(ClientError::SessionResolving),
            Gate::Decided(Decision::Render) => Ok(self.view_for(route, session.current_user().and_then(|user| user.role()))),
            Gate::Decided(Decision::RedirectToLogin) => Err(ClientError::NotAuthenticated {
                message: format!("Sign in to open '{}'", route),
            }),
            Gate::Decided(Decision::RedirectToFallback(_)) => Err(ClientError::UnauthorizedForRoute {
                route: route.to_string(),
                role: session.current_user().and_then(|user| user.role.clone()).unwrap_or_default(),
            }),
        }
    }

    /// Menu groups visible to the session's user
    pub fn visible_menu(&self, menu: &[MenuGroup], session: &Session) -> Vec<MenuGroupView> {
        filter_menu(menu, session.current_user().and_then(|user| user.role()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TokenPair, User};
    use proptest::prelude::*;

    fn tokens() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
        }
    }

    fn session_with_role(role: Role) -> Session {
        Session::authenticated(tokens(), User::new("tester", role))
    }

    fn controller() -> AccessController {
        AccessController::standard().unwrap()
    }

    #[test]
    fn test_resolving_session_holds_on_loading() {
        let controller = controller();
        assert_eq!(controller.authorize(RouteKey::Dashboard, &Session::resolving()), Gate::Loading);
        assert_eq!(controller.navigate("/claims", &Session::resolving()), Navigation::Loading);
    }

    #[test]
    fn test_public_routes_render_without_session() {
        let controller = controller();
        for session in [Session::resolving(), Session::anonymous()] {
            assert_eq!(controller.authorize(RouteKey::Login, &session), Gate::Decided(Decision::Render));
            assert_eq!(controller.authorize(RouteKey::Register, &session), Gate::Decided(Decision::Render));
        }
    }

    #[test]
    fn test_anonymous_redirects_to_login_on_every_protected_route() {
        let controller = controller();
        let session = Session::anonymous();
        for route in RouteKey::ALL {
            let expected = if matches!(route, RouteKey::Login | RouteKey::Register) { Decision::Render } else { Decision::RedirectToLogin };
            assert_eq!(controller.authorize(route, &session), Gate::Decided(expected), "route {}", route);
        }
    }

    #[test]
    fn test_missing_or_foreign_role_redirects_to_login() {
        let controller = controller();
        let missing = Session::authenticated(tokens(), User::without_role("ghost"));
        let mut foreign_user = User::new("ghost", Role::Admin);
        foreign_user.role = Some("SUPERUSER".to_string());
        let foreign = Session::authenticated(tokens(), foreign_user);

        for route in [RouteKey::ShipmentsList, RouteKey::Payments, RouteKey::Dashboard] {
            assert_eq!(controller.authorize(route, &missing), Gate::Decided(Decision::RedirectToLogin));
            assert_eq!(controller.authorize(route, &foreign), Gate::Decided(Decision::RedirectToLogin));
        }
    }

    #[test]
    fn test_wrong_role_goes_to_fallback_not_login() {
        let controller = controller();
        let session = session_with_role(Role::Client);
        assert_eq!(
            controller.authorize(RouteKey::Payments, &session),
            Gate::Decided(Decision::RedirectToFallback(RouteKey::ShipmentsList))
        );
        assert_eq!(controller.navigate("/payments", &session), Navigation::Redirect(RouteKey::ShipmentsList));
    }

    #[test]
    fn test_per_role_fallback() {
        let fallback = FallbackPolicy::default().with_role_fallback(Role::Driver, RouteKey::Dashboard);
        let controller = AccessController::with_fallback(fallback).unwrap();
        assert_eq!(
            controller.authorize(RouteKey::Payments, &session_with_role(Role::Driver)),
            Gate::Decided(Decision::RedirectToFallback(RouteKey::Dashboard))
        );
        assert_eq!(
            controller.authorize(RouteKey::Payments, &session_with_role(Role::Client)),
            Gate::Decided(Decision::RedirectToFallback(RouteKey::ShipmentsList))
        );
    }

    #[test]
    fn test_fallback_must_be_reachable() {
        let fallback = FallbackPolicy::new(RouteKey::Payments);
        assert!(matches!(AccessController::with_fallback(fallback), Err(ClientError::Config { .. })));

        let fallback = FallbackPolicy::default().with_role_fallback(Role::Client, RouteKey::IncidentsDetail);
        assert!(AccessController::with_fallback(fallback).is_err());
    }

    #[test]
    fn test_navigate_dispatches_driver_incident_form() {
        let controller = controller();
        match controller.navigate("/incidents", &session_with_role(Role::Driver)) {
            Navigation::Render { route, view, .. } => {
                assert_eq!(route, RouteKey::Incidents);
                assert_eq!(view, ViewId::IncidentCreate);
            }
            other => panic!("unexpected navigation: {:?}", other),
        }

        match controller.navigate("/incidents/3", &session_with_role(Role::Agent)) {
            Navigation::Render { view, params, .. } => {
                assert_eq!(view, ViewId::IncidentDetail);
                assert_eq!(params.get("id").map(String::as_str), Some("3"));
            }
            other => panic!("unexpected navigation: {:?}", other),
        }
    }

    #[test]
    fn test_navigate_aliases() {
        let controller = controller();
        let session = session_with_role(Role::Admin);
        assert_eq!(controller.navigate("/", &session), Navigation::Redirect(RouteKey::Login));
        assert_eq!(controller.navigate("/no/such/page", &session), Navigation::Redirect(RouteKey::Dashboard));
    }

    #[test]
    fn test_ensure_maps_decisions_to_errors() {
        let controller = controller();
        assert!(matches!(controller.ensure(RouteKey::Dashboard, &Session::resolving()), Err(ClientError::SessionResolving)));
        assert!(matches!(controller.ensure(RouteKey::Dashboard, &Session::anonymous()), Err(ClientError::NotAuthenticated { .. })));

        match controller.ensure(RouteKey::ClaimsCreate, &session_with_role(Role::Agent)) {
            Err(ClientError::UnauthorizedForRoute { route, role }) => {
                assert_eq!(route, "claims-create");
                assert_eq!(role, "AGENT");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(controller.ensure(RouteKey::ClaimsCreate, &session_with_role(Role::Client)).unwrap(), ViewId::ClaimCreate);
    }

    proptest! {
        #[test]
        fn prop_render_iff_role_allowed(
            route in prop::sample::select(RouteKey::ALL.to_vec()),
            role in prop::sample::select(Role::ALL.to_vec()),
        ) {
            let controller = controller();
            let access = controller.routes().permission(route).unwrap().access.clone();
            let gate = controller.authorize(route, &session_with_role(role));

            let allowed = match &access {
                Access::Public | Access::Authenticated => true,
                Access::Roles(roles) => roles.contains(&role),
            };
            prop_assert_eq!(gate == Gate::Decided(Decision::Render), allowed);
            if !allowed {
                prop_assert_eq!(gate, Gate::Decided(Decision::RedirectToFallback(RouteKey::ShipmentsList)));
            }
        }
    }
}
