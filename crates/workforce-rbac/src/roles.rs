//! Session roles
//!
//! The role attached to an authenticated session. Roles are tags: what a role
//! may do is decided by the role-permission matrix, not by the role itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to a user session.
///
/// Roles are ordered from least to most privileged:
/// Employee < Moderator < Admin < Superadmin. The ordering is informational
/// (e.g. for sorting in an admin screen); permission checks never infer
/// grants from it.
///
/// # Examples
///
/// ```
/// use workforce_rbac::Role;
///
/// assert_eq!(Role::parse("admin"), Some(Role::Admin));
/// assert_eq!(Role::resolve(Some("Superadmin")), Role::Superadmin);
///
/// // Unknown or missing roles degrade to the most restrictive role
/// assert_eq!(Role::resolve(Some("wizard")), Role::Employee);
/// assert_eq!(Role::resolve(None), Role::Employee);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee
    Employee = 0,

    /// Team lead / content moderator
    Moderator = 1,

    /// Tenant administrator
    Admin = 2,

    /// Platform operator
    Superadmin = 3,
}

impl Role {
    /// The most restrictive role.
    pub const LEAST_PRIVILEGED: Role = Role::Employee;

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "employee" | "user" => Some(Self::Employee),
            "moderator" | "manager" => Some(Self::Moderator),
            "admin" | "administrator" => Some(Self::Admin),
            "superadmin" | "super_admin" | "super-admin" => Some(Self::Superadmin),
            _ => None,
        }
    }

    /// Resolve the role attribute read off a session.
    ///
    /// Missing or unrecognized values resolve to [`Role::LEAST_PRIVILEGED`]
    /// instead of failing, so the UI degrades to the narrowest view.
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or(Self::LEAST_PRIVILEGED)
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Get a human-readable display name for the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_rbac::Role;
    ///
    /// assert_eq!(Role::Superadmin.display_name(), "Super Admin");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Moderator => "Moderator",
            Self::Admin => "Admin",
            Self::Superadmin => "Super Admin",
        }
    }

    /// Get all roles, least privileged first.
    pub fn all() -> Vec<Self> {
        vec![Self::Employee, Self::Moderator, Self::Admin, Self::Superadmin]
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::LEAST_PRIVILEGED
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
