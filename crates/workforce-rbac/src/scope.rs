//! # Scopes
//!
//! Restriction qualifiers narrowing where a granted action applies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope of a grant.
///
/// `All` is the wildcard: a grant scoped to `All` satisfies a query for any
/// scope. The other scopes only satisfy a query for themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The caller's own records.
    Own,
    /// Records of the caller's team.
    Team,
    /// Records of the caller's department.
    Department,
    /// Every record in the tenant.
    All,
}

impl Scope {
    /// Get the canonical string representation of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Team => "team",
            Scope::Department => "department",
            Scope::All => "all",
        }
    }

    /// Parse scope from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::Scope;
    ///
    /// assert_eq!(Scope::parse("own-team"), Some(Scope::Team));
    /// assert_eq!(Scope::parse("*"), Some(Scope::All));
    /// assert_eq!(Scope::parse("galaxy"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "own" | "self" | "mine" => Some(Scope::Own),
            "team" | "own_team" | "my_team" => Some(Scope::Team),
            "department" | "dept" => Some(Scope::Department),
            "all" | "*" | "any" | "global" => Some(Scope::All),
            _ => None,
        }
    }

    /// Check if this is the wildcard scope.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Check if a grant carrying this scope satisfies a query for `requested`.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::Scope;
    ///
    /// assert!(Scope::All.covers(Scope::Own));
    /// assert!(Scope::Team.covers(Scope::Team));
    /// assert!(!Scope::Team.covers(Scope::All));
    /// assert!(!Scope::Own.covers(Scope::Team));
    /// ```
    pub fn covers(&self, requested: Scope) -> bool {
        self.is_wildcard() || *self == requested
    }

    /// Get all scopes.
    pub fn all() -> Vec<Self> {
        vec![Scope::Own, Scope::Team, Scope::Department, Scope::All]
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::All
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
