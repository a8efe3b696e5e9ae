//! # Workforce RBAC (Role-Permission Matrix)
//!
//! This crate provides the permission vocabulary of the Workforce HR
//! application and the matrix every capability check is resolved against.
//!
//! ## Overview
//!
//! The workforce-rbac crate handles:
//! - **Roles**: The role tag attached to a session
//! - **Modules**: Functional areas (payroll, absence, recruiting, ...)
//! - **Actions**: Verbs a role may perform within a module
//! - **Scopes**: Restrictions narrowing where an action applies
//! - **Grants**: (role, module, action, scope) matrix entries
//! - **Permission Matrix**: The set of grants loaded for a session
//!
//! ## Architecture
//!
//! ```text
//! Grant = Role + Module + Action + Scope
//!
//! Examples:
//!   "employee:absence:create:own"     - Request own absences
//!   "moderator:absence:approve:team"  - Approve the team's absences
//!   "admin:payroll:export:all"        - Export any payroll run
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use workforce_rbac::{Action, Grant, Module, PermissionMatrix, Role, Scope};
//!
//! let mut matrix = PermissionMatrix::new();
//! matrix.insert(Grant::new(Role::Employee, Module::Absence, Action::Create, Scope::Own));
//! matrix.insert(Grant::unscoped(Role::Admin, Module::Absence, Action::Approve));
//!
//! assert!(matrix.allows(Role::Employee, Module::Absence, Action::Create, Some(Scope::Own)));
//! assert!(matrix.allows(Role::Admin, Module::Absence, Action::Approve, Some(Scope::Team)));
//!
//! // Fail-closed: anything not granted is denied
//! assert!(!matrix.allows(Role::Employee, Module::Absence, Action::Approve, None));
//! ```
//!
//! ## Matching Rules
//!
//! - A grant scoped to `all` satisfies a query for any scope
//! - Several grants for the same (role, module, action) combine as a union
//! - Actions never imply each other
//!
//! ## Integration with workforce-access
//!
//! `workforce-access` loads raw matrix rows from the backend, validates them
//! into [`Grant`]s through [`RawGrant`], and answers capability queries for
//! the session's role.

pub mod actions;
pub mod grants;
pub mod modules;
pub mod roles;
pub mod scope;

// Re-export main types for convenience
pub use actions::Action;
pub use grants::{Grant, InvalidGrant, PermissionMatrix, RawGrant};
pub use modules::{Area, Module};
pub use roles::Role;
pub use scope::Scope;
