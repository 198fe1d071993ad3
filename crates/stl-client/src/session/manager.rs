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

//! Session manager, the only writer of session state
//!
//! Readers get [`Session`] snapshots or a [`SessionView`]. The state lock is a
//! plain synchronous lock and is never held across an await, so `logout` can
//! stay synchronous while profile fetches are in flight.

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, RegistrationRequest, TokenPair, User};
use crate::session::audit::{AuditEvent, AuditEventType, AuditLogger, AuditResult};
use crate::session::store::TokenStore;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Whether bootstrap has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Resolving,
    Resolved,
}

/// Authentication state of the client
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Bootstrap or a profile fetch has not completed yet
    Resolving,

    /// Resolved with a user
    Authenticated(User),

    /// Resolved without a user
    Anonymous,
}

/// Snapshot of the current session.
///
/// A user is only ever present together with a credential token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    tokens: Option<TokenPair>,
    state: SessionState,
}

impl Session {
    pub fn resolving() -> Self {
        Self {
            tokens: None,
            state: SessionState::Resolving,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            tokens: None,
            state: SessionState::Anonymous,
        }
    }

    pub fn authenticated(tokens: TokenPair, user: User) -> Self {
        Self {
            tokens: Some(tokens),
            state: SessionState::Authenticated(user),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn resolution(&self) -> ResolutionState {
        match self.state {
            SessionState::Resolving => ResolutionState::Resolving,
            _ => ResolutionState::Resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution() == ResolutionState::Resolved
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn credential_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|tokens| tokens.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().and_then(|tokens| tokens.refresh_token.as_deref())
    }
}

/// Read-only handle to the live session
#[derive(Clone)]
pub struct SessionView {
    inner: Arc<RwLock<Session>>,
}

impl SessionView {
    pub fn snapshot(&self) -> Session {
        self.inner.read().clone()
    }

    pub fn resolution(&self) -> ResolutionState {
        self.inner.read().resolution()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().current_user().cloned()
    }
}

/// Owner of the session and the credential lifecycle
pub struct SessionManager {
    api: Arc<dyn ApiClient>,
    store: Arc<dyn TokenStore>,
    session: Arc<RwLock<Session>>,
    audit: Arc<AuditLogger>,
    request_timeout: Option<Duration>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn ApiClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            session: Arc::new(RwLock::new(Session::resolving())),
            audit: Arc::new(AuditLogger::new()),
            request_timeout: None,
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Bound every API call; a timed-out call fails like any transport error
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            inner: Arc::clone(&self.session),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    /// Restore the session from persisted credentials.
    ///
    /// Without a stored access token the session resolves anonymous and no
    /// request is made. Otherwise the profile is fetched and the session
    /// resolves either way.
    pub async fn bootstrap(&self) {
        *self.session.write() = Session::resolving();

        let token = self.store.access_token().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read persisted access token");
            None
        });

        if token.is_none() {
            *self.session.write() = Session::anonymous();
            self.audit.log_event(AuditEvent::new(AuditEventType::Bootstrap, None, AuditResult::Success).with_detail("outcome", "anonymous"));
            return;
        }

        let outcome = if self.fetch_profile().await { "restored" } else { "invalidated" };
        let actor = self.snapshot().current_user().map(|user| user.username.clone());
        self.audit.log_event(AuditEvent::new(AuditEventType::Bootstrap, actor, AuditResult::Success).with_detail("outcome", outcome));
    }

    /// Sign in; `true` only when both the token exchange and the profile fetch succeed
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.authenticate(username, password).await.is_ok()
    }

    /// Sign in, reporting why it failed.
    ///
    /// A rejected or unreachable token exchange leaves the session untouched. A
    /// failed profile fetch after a successful exchange invalidates the session.
    pub async fn authenticate(&self, username: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest::new(username, password);

        let tokens = match self.call(self.api.obtain_tokens(&request)).await {
            Ok(tokens) => tokens,
            Err(e) => {
                self.audit.log_failure(AuditEventType::Login, Some(username), &e.to_string());
                return Err(e);
            }
        };

        if let Err(e) = self.store.save_tokens(&tokens) {
            self.audit.log_failure(AuditEventType::Login, Some(username), &e.to_string());
            return Err(e);
        }

        info!(username = %username, "Credentials accepted");
        self.audit.log(AuditEventType::Login, Some(username), AuditResult::Success);

        self.refresh_profile().await
    }

    /// Replace the current user from the profile endpoint.
    ///
    /// Any failure invalidates the session. The session is resolved afterwards
    /// in every case.
    pub async fn fetch_profile(&self) -> bool {
        self.refresh_profile().await.is_ok()
    }

    async fn refresh_profile(&self) -> ClientResult<User> {
        let result = self.call(self.api.current_user()).await;

        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                self.invalidate(&e);
                return Err(e);
            }
        };

        // a logout may have raced the request
        let Some(tokens) = self.persisted_tokens() else {
            let err = ClientError::SessionExpired {
                message: "Credentials were removed while fetching the profile".to_string(),
            };
            self.invalidate(&err);
            return Err(err);
        };

        let user = User::from(profile);
        if user.role().is_none() {
            warn!(username = %user.username, role = ?user.role, "Profile carries no recognized role");
        }

        *self.session.write() = Session::authenticated(tokens, user.clone());
        self.audit.log(AuditEventType::ProfileFetch, Some(&user.username), AuditResult::Success);
        Ok(user)
    }

    /// Clear credentials and the current user. Safe to call repeatedly.
    pub fn logout(&self) {
        let username = self.session.read().current_user().map(|user| user.username.clone());

        if let Err(e) = self.store.clear_tokens() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        *self.session.write() = Session::anonymous();

        self.audit.log(AuditEventType::Logout, username.as_deref(), AuditResult::Success);
    }

    /// Create a client account. The current session is not changed.
    pub async fn register(&self, request: RegistrationRequest) -> ClientResult<User> {
        match self.call(self.api.register(&request)).await {
            Ok(profile) => {
                self.audit.log(AuditEventType::Registration, Some(&request.username), AuditResult::Success);
                Ok(User::from(profile))
            }
            Err(e) => {
                self.audit.log_failure(AuditEventType::Registration, Some(&request.username), &e.to_string());
                Err(e)
            }
        }
    }

    fn persisted_tokens(&self) -> Option<TokenPair> {
        let access_token = self.store.access_token().ok().flatten()?;
        let refresh_token = self.store.refresh_token().ok().flatten();
        Some(TokenPair { access_token, refresh_token })
    }

    fn invalidate(&self, reason: &ClientError) {
        let username = self.session.read().current_user().map(|user| user.username.clone());
        warn!(error = %reason, "Session invalidated");

        if let Err(e) = self.store.clear_tokens() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        *self.session.write() = Session::anonymous();

        self.audit.log_failure(AuditEventType::SessionInvalidated, username.as_deref(), &reason.to_string());
    }

    async fn call<T>(&self, request: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, request).await.map_err(|_| ClientError::Timeout { seconds: timeout.as_secs() })?,
            None => request.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FixtureApiClient, MockApiClient};
    use crate::models::{ProfileResponse, Role};
    use crate::session::store::{FileTokenStore, MemoryTokenStore};
    use async_trait::async_trait;

    fn tokens() -> TokenPair {
        TokenPair {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        }
    }

    fn profile(username: &str, role: &str) -> ProfileResponse {
        ProfileResponse {
            username: username.to_string(),
            role: Some(role.to_string()),
            ..ProfileResponse::default()
        }
    }

    fn manager(api: MockApiClient, store: Arc<MemoryTokenStore>) -> SessionManager {
        SessionManager::new(Arc::new(api), store)
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_makes_no_request() {
        let mut api = MockApiClient::new();
        api.expect_current_user().never();
        let manager = manager(api, Arc::new(MemoryTokenStore::new()));

        assert_eq!(manager.snapshot().resolution(), ResolutionState::Resolving);
        manager.bootstrap().await;

        let session = manager.snapshot();
        assert_eq!(session.resolution(), ResolutionState::Resolved);
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_restores_persisted_session() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save_tokens(&tokens()).unwrap();

        let mut api = MockApiClient::new();
        api.expect_current_user().times(1).returning(|| Ok(profile("agent_joe", "AGENT")));
        let manager = manager(api, store);

        manager.bootstrap().await;
        let session = manager.snapshot();
        assert_eq!(session.current_user().and_then(|user| user.role()), Some(Role::Agent));
        assert_eq!(session.credential_token(), Some("access-1"));
        assert_eq!(session.refresh_token(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_bootstrap_with_failing_profile_clears_everything() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save_tokens(&tokens()).unwrap();

        let mut api = MockApiClient::new();
        api.expect_current_user().times(1).returning(|| {
            Err(ClientError::SessionExpired {
                message: "Given token not valid".to_string(),
            })
        });
        let manager = manager(api, store.clone());

        manager.bootstrap().await;
        let session = manager.snapshot();
        assert!(session.is_resolved());
        assert!(session.current_user().is_none());
        assert!(session.credential_token().is_none());
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
        assert_eq!(manager.audit().events_of_type(AuditEventType::SessionInvalidated).len(), 1);
    }

    #[tokio::test]
    async fn test_login_success() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut api = MockApiClient::new();
        api.expect_obtain_tokens().withf(|req| req.username == "agent_joe" && req.password == "x").times(1).returning(|_| Ok(tokens()));
        api.expect_current_user().times(1).returning(|| Ok(profile("agent_joe", "AGENT")));
        let manager = manager(api, store.clone());
        manager.bootstrap().await;

        assert!(manager.login("agent_joe", "x").await);
        assert_eq!(manager.view().current_user().map(|user| user.username), Some("agent_joe".to_string()));
        assert_eq!(store.access_token().unwrap().as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_untouched() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save_tokens(&tokens()).unwrap();

        let mut api = MockApiClient::new();
        api.expect_current_user().times(1).returning(|| Ok(profile("admin", "ADMIN")));
        api.expect_obtain_tokens().times(1).returning(|_| {
            Err(ClientError::InvalidCredentials {
                message: "No active account".to_string(),
            })
        });
        let manager = manager(api, store.clone());
        manager.bootstrap().await;
        let before = manager.snapshot();

        assert!(!manager.login("someone_else", "wrong").await);
        assert_eq!(manager.snapshot(), before);
        assert_eq!(store.access_token().unwrap().as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinguishable() {
        let mut api = MockApiClient::new();
        api.expect_obtain_tokens().returning(|_| {
            Err(ClientError::Transport {
                message: "connection refused".to_string(),
            })
        });
        let manager = manager(api, Arc::new(MemoryTokenStore::new()));
        manager.bootstrap().await;

        let err = manager.authenticate("agent_joe", "x").await.unwrap_err();
        assert!(err.is_transport());
        assert!(manager.snapshot().current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_with_failing_profile_returns_false() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut api = MockApiClient::new();
        api.expect_obtain_tokens().returning(|_| Ok(tokens()));
        api.expect_current_user().returning(|| {
            Err(ClientError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let manager = manager(api, store.clone());
        manager.bootstrap().await;

        assert!(!manager.login("agent_joe", "x").await);
        assert!(manager.snapshot().is_resolved());
        assert!(manager.snapshot().current_user().is_none());
        assert_eq!(store.access_token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save_tokens(&tokens()).unwrap();
        let mut api = MockApiClient::new();
        api.expect_current_user().returning(|| Ok(profile("driver7", "DRIVER")));
        let manager = manager(api, store.clone());
        manager.bootstrap().await;

        manager.logout();
        let once = manager.snapshot();
        manager.logout();
        let twice = manager.snapshot();

        assert_eq!(once, twice);
        assert_eq!(once, Session::anonymous());
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(manager.audit().events_of_type(AuditEventType::Logout).len(), 2);
    }

    #[tokio::test]
    async fn test_register_does_not_touch_session() {
        let mut api = MockApiClient::new();
        api.expect_register().withf(|req| req.role == Role::Client).returning(|req| Ok(profile(&req.username, "CLIENT")));
        let manager = manager(api, Arc::new(MemoryTokenStore::new()));
        manager.bootstrap().await;

        let user = manager.register(RegistrationRequest::client("acme", "ops@acme.test", "pw", None)).await.unwrap();
        assert_eq!(user.role(), Some(Role::Client));
        assert_eq!(manager.snapshot(), Session::anonymous());
    }

    #[tokio::test]
    async fn test_view_tracks_writes() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut api = MockApiClient::new();
        api.expect_obtain_tokens().returning(|_| Ok(tokens()));
        api.expect_current_user().returning(|| Ok(profile("acme", "CLIENT")));
        let manager = manager(api, store);
        let view = manager.view();

        assert_eq!(view.resolution(), ResolutionState::Resolving);
        manager.bootstrap().await;
        assert!(manager.login("acme", "pw").await);
        assert_eq!(view.current_user().and_then(|user| user.role()), Some(Role::Client));
        manager.logout();
        assert!(view.current_user().is_none());
    }

    #[tokio::test]
    async fn test_second_login_replaces_user_wholesale() {
        let store = Arc::new(MemoryTokenStore::new());
        let api = FixtureApiClient::new(store.clone())
            .with_profile(ProfileResponse {
                id: Some(7),
                username: "agent_joe".to_string(),
                email: Some("joe@stl.test".to_string()),
                role: Some("AGENT".to_string()),
                company: Some("ST&L Brokerage".to_string()),
                ..ProfileResponse::default()
            })
            .with_profile(ProfileResponse {
                username: "acme".to_string(),
                role: Some("CLIENT".to_string()),
                ..ProfileResponse::default()
            });
        let manager = SessionManager::new(Arc::new(api), store.clone());
        manager.bootstrap().await;

        assert!(manager.login("agent_joe", "x").await);
        assert_eq!(manager.snapshot().current_user().and_then(|user| user.company.clone()).as_deref(), Some("ST&L Brokerage"));

        assert!(manager.login("acme", "x").await);
        let session = manager.snapshot();
        let expected = User {
            id: None,
            username: "acme".to_string(),
            email: None,
            role: Some("CLIENT".to_string()),
            company: None,
        };
        assert_eq!(session.current_user(), Some(&expected));
        assert_eq!(session.credential_token(), Some("fixture.acme"));
        assert_eq!(session.refresh_token(), Some("fixture-refresh.acme"));
        assert_eq!(store.access_token().unwrap().as_deref(), Some("fixture.acme"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("fixture-refresh.acme"));
    }

    #[tokio::test]
    async fn test_corrupt_token_file_does_not_block_logout_or_login() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(FileTokenStore::in_dir(dir.path()));
        std::fs::write(store.path(), "{not json").unwrap();
        let manager = SessionManager::new(Arc::new(FixtureApiClient::new(store.clone())), store.clone());

        manager.bootstrap().await;
        assert_eq!(manager.snapshot(), Session::anonymous());

        manager.logout();
        assert!(!store.path().exists());

        let user = manager.authenticate("agent_joe", "x").await.unwrap();
        assert_eq!(user.role(), Some(Role::Agent));
        assert_eq!(store.access_token().unwrap().as_deref(), Some("fixture.agent_joe"));
    }

    struct StalledApi;

    #[async_trait]
    impl ApiClient for StalledApi {
        async fn obtain_tokens(&self, _request: &LoginRequest) -> ClientResult<TokenPair> {
            Ok(tokens())
        }

        async fn current_user(&self) -> ClientResult<ProfileResponse> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(profile("never", "ADMIN"))
        }

        async fn register(&self, _request: &RegistrationRequest) -> ClientResult<ProfileResponse> {
            unreachable!("not used")
        }
    }

    #[tokio::test]
    async fn test_timed_out_profile_fetch_still_resolves() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save_tokens(&tokens()).unwrap();
        let manager = SessionManager::new(Arc::new(StalledApi), store.clone()).with_request_timeout(Some(Duration::from_millis(50)));

        manager.bootstrap().await;
        assert!(manager.snapshot().is_resolved());
        assert!(manager.snapshot().current_user().is_none());
        assert_eq!(store.access_token().unwrap(), None);
    }
}
