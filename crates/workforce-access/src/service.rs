//! Session-scoped permission service.
//!
//! [`PermissionService`] owns the capability state for one signed-in user
//! and answers `has_permission` synchronously from it. State changes are
//! published on a `tokio::sync::watch` channel so views can subscribe and
//! re-derive their gated affordances.
//!
//! # Fail-closed rules
//!
//! `has_permission` returns `false` when there is no session, before the
//! first matrix has loaded, and while the last load ended in error. During a
//! reload the previous matrix keeps answering until the new one arrives.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use workforce_rbac::{Action, Module, PermissionMatrix, Role, Scope};

use crate::error::{AccessError, AccessResult};
use crate::gate::{Capability, CapabilityGate};
use crate::resolver::{LoadReport, MatrixResolver, ResolvedMatrix};
use crate::session::Session;
use crate::source::MatrixRequest;

/// Observable capability state.
///
/// Every change is published as a new value of this struct; receivers get
/// a consistent snapshot and can answer capability checks from it directly.
#[derive(Debug, Clone, Default)]
pub struct AccessState {
    /// Signed-in user, if any
    pub session: Option<Arc<Session>>,
    /// Last successfully loaded matrix
    pub matrix: Option<Arc<PermissionMatrix>>,
    /// A load is in flight
    pub loading: bool,
    /// The last load failed
    pub error: Option<AccessError>,
    /// Report of the load that produced `matrix`
    pub report: Option<LoadReport>,
    /// Bumped whenever `matrix` is replaced or dropped
    pub revision: u64,
    /// Bumped on every session change or teardown; loads started under an
    /// older epoch are discarded
    epoch: u64,
}

impl AccessState {
    /// Role of the current session.
    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    /// Check if capability checks can be answered from this state.
    pub fn is_ready(&self) -> bool {
        self.session.is_some() && self.matrix.is_some() && self.error.is_none()
    }

    /// Fail-closed capability check.
    pub fn allows(&self, module: Module, action: Action, scope: Option<Scope>) -> bool {
        if self.error.is_some() {
            return false;
        }
        match (self.role(), self.matrix.as_deref()) {
            (Some(role), Some(matrix)) => matrix.allows(role, module, action, scope),
            _ => false,
        }
    }

    /// Actions the current role holds in `module`; empty when failing closed.
    pub fn allowed_actions(&self, module: Module) -> Vec<Action> {
        if !self.is_ready() {
            return Vec::new();
        }
        match (self.role(), self.matrix.as_deref()) {
            (Some(role), Some(matrix)) => matrix.actions_for(role, module),
            _ => Vec::new(),
        }
    }

    /// When the current matrix was loaded.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.report.as_ref().map(|r| r.loaded_at)
    }
}

impl CapabilityGate for AccessState {
    fn can(&self, capability: &Capability) -> bool {
        self.allows(capability.module, capability.action, capability.scope)
    }

    fn is_ready(&self) -> bool {
        AccessState::is_ready(self)
    }
}

/// Process-wide capability state for one session, passed to views explicitly.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use workforce_access::{MatrixResolver, PermissionService, Session, StaticMatrixSource};
/// use workforce_rbac::{Action, Module, Scope};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = Arc::new(StaticMatrixSource::from_strings(&["employee:absence:create:own"]));
/// let service = PermissionService::new(MatrixResolver::new(source));
///
/// // Nothing is allowed before a session has loaded its matrix
/// assert!(!service.has_permission(Module::Absence, Action::Create, None));
///
/// let session = Session::new(Uuid::now_v7(), "ana@example.com", Some("employee"));
/// service.set_session(Some(session)).await.unwrap();
///
/// assert!(service.has_permission(Module::Absence, Action::Create, Some(Scope::Own)));
/// assert!(!service.has_permission(Module::Absence, Action::Approve, None));
/// # }
/// ```
pub struct PermissionService {
    /// Fetches and validates the matrix
    resolver: MatrixResolver,
    /// Request rows for all roles rather than the session's role
    fetch_all_roles: bool,
    /// Published state
    state: watch::Sender<AccessState>,
    /// Serializes loads so an older fetch never lands after a newer one
    load_lock: Mutex<()>,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PermissionService")
            .field("resolver", &self.resolver)
            .field("role", &state.role())
            .field("loading", &state.loading)
            .field("revision", &state.revision)
            .finish()
    }
}

impl PermissionService {
    /// Create a service with no session. Every check is denied until
    /// [`PermissionService::set_session`] has loaded a matrix.
    pub fn new(resolver: MatrixResolver) -> Self {
        let (state, _) = watch::channel(AccessState::default());
        Self {
            resolver,
            fetch_all_roles: false,
            state,
            load_lock: Mutex::new(()),
        }
    }

    /// Load rows for every role instead of only the session's role.
    pub fn with_all_roles(mut self, fetch_all_roles: bool) -> Self {
        self.fetch_all_roles = fetch_all_roles;
        self
    }

    /// Build a service backed by the REST source described by `config`.
    #[cfg(feature = "rest")]
    pub fn from_config(config: crate::config::BackendConfig) -> AccessResult<Self> {
        let retry = config.retry_config();
        let all_roles = config.fetch_all_roles;
        let source = crate::source::RestMatrixSource::new(config)?;
        let resolver = MatrixResolver::new(Arc::new(source)).with_retry(retry);
        Ok(Self::new(resolver).with_all_roles(all_roles))
    }

    // ------------------------------------------------------------------
    // Capability checks
    // ------------------------------------------------------------------

    /// Check whether the current role may perform `action` in `module`.
    ///
    /// With `scope`, a grant must carry that scope or `all`. Never errors:
    /// no session, no matrix yet, or an error state all answer `false`.
    pub fn has_permission(&self, module: Module, action: Action, scope: Option<Scope>) -> bool {
        self.state.borrow().allows(module, action, scope)
    }

    /// Check that at least one of `capabilities` is granted.
    pub fn has_any_permission(&self, capabilities: &[Capability]) -> bool {
        self.state.borrow().can_any(capabilities)
    }

    /// Check that all of `capabilities` are granted.
    pub fn has_all_permissions(&self, capabilities: &[Capability]) -> bool {
        self.state.borrow().can_all(capabilities)
    }

    /// Actions the current role holds in `module`.
    pub fn allowed_actions(&self, module: Module) -> Vec<Action> {
        self.state.borrow().allowed_actions(module)
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    /// A load is in flight.
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Error of the last load, if it failed.
    pub fn error(&self) -> Option<AccessError> {
        self.state.borrow().error.clone()
    }

    /// The matrix currently in effect.
    pub fn matrix(&self) -> Option<Arc<PermissionMatrix>> {
        self.state.borrow().matrix.clone()
    }

    /// The current session.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.state.borrow().session.clone()
    }

    /// Role of the current session.
    pub fn role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> AccessState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver is marked changed on every update to loading, matrix,
    /// error or session.
    pub fn subscribe(&self) -> watch::Receiver<AccessState> {
        self.state.subscribe()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Handle an auth state change and load the matrix for the new session.
    ///
    /// When the same user keeps the same role (e.g. a token refresh) the
    /// current matrix stays in effect while it is reloaded. Otherwise the old
    /// matrix is dropped first. `None` signs out without fetching.
    #[instrument(skip(self, session), fields(user_id = ?session.as_ref().map(|s| s.user_id)))]
    pub async fn set_session(&self, session: Option<Session>) -> AccessResult<Option<LoadReport>> {
        let session = session.map(Arc::new);

        self.state.send_modify(|state| {
            let same_identity = match (&state.session, &session) {
                (Some(old), Some(new)) => old.user_id == new.user_id && old.role == new.role,
                _ => false,
            };

            state.epoch += 1;
            state.session = session.clone();
            // The load for the new session starts now, even if it has to
            // wait for an older one to give up the load lock.
            state.loading = session.is_some();
            if !same_identity {
                state.error = None;
                state.report = None;
                if state.matrix.take().is_some() {
                    state.revision += 1;
                }
            }
        });

        match session {
            Some(session) => {
                if !session.role_recognized() {
                    warn!(
                        raw_role = ?session.raw_role,
                        "Unrecognized session role, using {}",
                        session.role
                    );
                }
                self.reload().await.map(Some)
            }
            None => {
                debug!("Session cleared");
                Ok(None)
            }
        }
    }

    /// Re-fetch the matrix for the current session.
    ///
    /// While the fetch runs, `loading` is `true` and the previous matrix
    /// stays in effect. On success the new matrix replaces it exactly; on
    /// failure the error is recorded and every check is denied until a later
    /// load succeeds. The error is also returned to the caller.
    ///
    /// A session change or teardown abandons the fetch immediately and
    /// returns [`AccessError::Superseded`], releasing the load lock for the
    /// next session's load.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> AccessResult<LoadReport> {
        let _guard = self.load_lock.lock().await;

        let (epoch, request) = {
            let state = self.state.borrow();
            let Some(session) = state.session.as_ref() else {
                return Err(AccessError::NoSession);
            };
            (
                state.epoch,
                MatrixRequest::for_session(session, self.fetch_all_roles),
            )
        };

        self.state.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            state.loading = true;
            true
        });

        let Some(result) = self.resolve_unless_superseded(&request, epoch).await else {
            debug!("Abandoning matrix load for a superseded session");
            return Err(AccessError::Superseded);
        };

        let mut applied = false;
        self.state.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            applied = true;
            state.loading = false;
            match &result {
                Ok(resolved) => {
                    state.matrix = Some(Arc::new(resolved.matrix.clone()));
                    state.report = Some(resolved.report.clone());
                    state.error = None;
                    state.revision += 1;
                }
                Err(e) => {
                    state.error = Some(e.clone());
                }
            }
            true
        });

        if !applied {
            debug!("Discarding matrix load for a superseded session");
            return Err(AccessError::Superseded);
        }

        match result {
            Ok(resolved) => {
                info!(
                    accepted = resolved.report.accepted,
                    rejected = resolved.report.rejected.len(),
                    role = ?resolved.report.role,
                    "Permission matrix loaded"
                );
                Ok(resolved.report)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Permission matrix load failed");
                Err(e)
            }
        }
    }

    /// Run the resolver until it finishes or the session epoch moves on.
    async fn resolve_unless_superseded(
        &self,
        request: &MatrixRequest,
        epoch: u64,
    ) -> Option<AccessResult<ResolvedMatrix>> {
        let mut rx = self.state.subscribe();
        let current = rx.borrow_and_update().epoch;
        if current != epoch {
            return None;
        }

        let resolve = self.resolver.resolve(request);
        tokio::pin!(resolve);

        loop {
            tokio::select! {
                result = &mut resolve => return Some(result),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    let current = rx.borrow_and_update().epoch;
                    if current != epoch {
                        return None;
                    }
                }
            }
        }
    }

    /// Discard the session and matrix.
    ///
    /// A load still in flight will not write its result.
    pub fn teardown(&self) {
        self.state.send_modify(|state| {
            let revision = state.revision + u64::from(state.matrix.is_some());
            *state = AccessState {
                revision,
                epoch: state.epoch + 1,
                ..AccessState::default()
            };
        });
        debug!("Permission state torn down");
    }
}

impl CapabilityGate for PermissionService {
    fn can(&self, capability: &Capability) -> bool {
        self.has_permission(capability.module, capability.action, capability.scope)
    }

    fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticMatrixSource;
    use uuid::Uuid;

    fn service(rows: &[&str]) -> (PermissionService, Arc<StaticMatrixSource>) {
        let source = Arc::new(StaticMatrixSource::from_strings(rows));
        (PermissionService::new(MatrixResolver::new(source.clone())), source)
    }

    fn session(role: &str) -> Session {
        Session::new(Uuid::now_v7(), "user@example.com", Some(role))
    }

    #[test]
    fn test_default_state_fails_closed() {
        let state = AccessState::default();
        assert!(!state.is_ready());
        assert!(!state.allows(Module::Payroll, Action::View, None));
        assert!(state.allowed_actions(Module::Payroll).is_empty());
    }

    #[test]
    fn test_error_state_fails_closed_even_with_matrix() {
        let matrix: PermissionMatrix =
            [workforce_rbac::Grant::unscoped(Role::Admin, Module::Payroll, Action::View)]
                .into_iter()
                .collect();
        let mut state = AccessState {
            session: Some(Arc::new(session("admin"))),
            matrix: Some(Arc::new(matrix)),
            ..AccessState::default()
        };
        assert!(state.allows(Module::Payroll, Action::View, None));

        state.error = Some(AccessError::Transport("offline".into()));
        assert!(!state.allows(Module::Payroll, Action::View, None));
        assert!(state.allowed_actions(Module::Payroll).is_empty());
    }

    #[tokio::test]
    async fn test_reload_without_session() {
        let (service, source) = service(&["admin:payroll:view"]);
        assert!(matches!(service.reload().await, Err(AccessError::NoSession)));
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_session_role_decides() {
        let (service, _) = service(&["admin:payroll:view", "employee:absence:create:own"]);

        service.set_session(Some(session("admin"))).await.unwrap();
        assert!(service.has_permission(Module::Payroll, Action::View, None));
        assert!(!service.has_permission(Module::Absence, Action::Create, None));
        assert_eq!(service.role(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_unknown_role_gets_least_privileged_grants() {
        let (service, _) = service(&["admin:payroll:view", "employee:absence:create:own"]);

        service.set_session(Some(session("overlord"))).await.unwrap();
        assert_eq!(service.role(), Some(Role::Employee));
        assert!(!service.has_permission(Module::Payroll, Action::View, None));
        assert!(service.has_permission(Module::Absence, Action::Create, Some(Scope::Own)));
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let (service, source) = service(&["admin:payroll:view"]);
        service.set_session(Some(session("admin"))).await.unwrap();

        let report = service.set_session(None).await.unwrap();
        assert!(report.is_none());
        assert!(service.matrix().is_none());
        assert!(!service.has_permission(Module::Payroll, Action::View, None));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_teardown_bumps_revision() {
        let (service, _) = service(&["admin:payroll:view"]);
        service.set_session(Some(session("admin"))).await.unwrap();
        let before = service.snapshot().revision;

        service.teardown();
        let after = service.snapshot();
        assert_eq!(after.revision, before + 1);
        assert!(after.session.is_none());
        assert!(!after.loading);
        assert!(matches!(service.reload().await, Err(AccessError::NoSession)));
    }

    #[tokio::test]
    async fn test_allowed_actions() {
        let (service, _) = service(&[
            "moderator:absence:view:team",
            "moderator:absence:approve:team",
            "moderator:goals:view",
        ]);
        service.set_session(Some(session("moderator"))).await.unwrap();

        assert_eq!(
            service.allowed_actions(Module::Absence),
            vec![Action::View, Action::Approve]
        );
        assert!(service.allowed_actions(Module::Payroll).is_empty());
    }
}
