//! # Workforce Access
//!
//! This crate provides the session-scoped permission service of the
//! Workforce HR application: it loads the role-permission matrix for the
//! signed-in user and answers capability checks for every view.
//!
//! ## Overview
//!
//! The workforce-access crate handles:
//! - **Sources**: Backend query contract for matrix rows (REST or in-memory)
//! - **Resolver**: Fetch with retry, validation at the response boundary
//! - **Service**: `has_permission`, `reload`, loading/error state, subscriptions
//! - **Gates**: `Capability` values and the `CapabilityGate` trait views depend on
//!
//! ## Architecture
//!
//! ```text
//! Session ──set_session──▶ PermissionService ──reload──▶ MatrixResolver ──▶ MatrixSource
//!                              │                             │
//!                              │ watch::Sender<AccessState>  └─ RawGrant → Grant (validated)
//!                              ▼
//!                   views: has_permission / subscribe
//! ```
//!
//! ## Fail-Closed
//!
//! Every capability check answers `false` when there is no session, before
//! the first matrix load completes, and while the layer is in an error
//! state. Errors are reported through `error()` and the return value of
//! `reload()`; they never surface from `has_permission`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workforce_access::{BackendConfig, PermissionService, Session};
//! use workforce_rbac::{Action, Module, Scope};
//! use uuid::Uuid;
//!
//! async fn on_sign_in(user_id: Uuid, email: &str, role: Option<&str>) -> Arc<PermissionService> {
//!     let service = Arc::new(PermissionService::from_config(BackendConfig::from_env()).unwrap());
//!     if let Err(e) = service.set_session(Some(Session::new(user_id, email, role))).await {
//!         tracing::warn!(error = %e, "permissions unavailable, everything is denied");
//!     }
//!
//!     let can_approve = service.has_permission(Module::Absence, Action::Approve, Some(Scope::Team));
//!     let _ = can_approve;
//!     service
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `rest` (default): `RestMatrixSource` for the hosted database REST API

pub mod config;
pub mod error;
pub mod gate;
pub mod resolver;
pub mod retry;
pub mod service;
pub mod session;
pub mod source;

// Re-export main types
pub use config::{BackendConfig, ConfigError};
pub use error::{AccessError, AccessResult};
pub use gate::{Capability, CapabilityGate};
pub use resolver::{build_matrix, LoadReport, MatrixResolver, ResolvedMatrix};
pub use retry::RetryConfig;
pub use service::{AccessState, PermissionService};
pub use session::Session;
pub use source::{MatrixRequest, MatrixSource, StaticMatrixSource};

#[cfg(feature = "rest")]
pub use source::RestMatrixSource;
