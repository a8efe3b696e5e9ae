//! # Actions
//!
//! Verbs a role may be permitted to perform within a module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that can be granted within a module.
///
/// - **View**: See records of the module (lists, details, dashboards)
/// - **Create**: Add new records (a time entry, an absence request, a vacancy)
/// - **Edit**: Change existing records
/// - **Delete**: Remove records
/// - **Approve**: Approve or reject pending requests (absences, expenses, timesheets)
/// - **Export**: Download module data (payroll runs, reports)
/// - **Manage**: Administer the module's configuration
///
/// Actions are independent of each other during permission lookup: a grant
/// for `Manage` does not grant `View`. The matrix must list every action a
/// role holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View records.
    View,

    /// Create new records.
    Create,

    /// Edit existing records.
    Edit,

    /// Delete records.
    Delete,

    /// Approve or reject pending requests.
    Approve,

    /// Export module data.
    Export,

    /// Administer module configuration.
    Manage,
}

impl Action {
    /// Get the canonical string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Export => "export",
            Action::Manage => "manage",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("READ"), Some(Action::View)); // Alias
    /// assert_eq!(Action::parse("update"), Some(Action::Edit)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "view" | "read" | "get" | "list" => Some(Action::View),
            "create" | "add" | "new" | "insert" => Some(Action::Create),
            "edit" | "update" | "write" | "modify" => Some(Action::Edit),
            "delete" | "remove" => Some(Action::Delete),
            "approve" | "reject" | "review" => Some(Action::Approve),
            "export" | "download" => Some(Action::Export),
            "manage" | "admin" | "administer" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Approve,
            Action::Export,
            Action::Manage,
        ]
    }

    /// Check if this action modifies data.
    ///
    /// Views use this to decide whether an affordance is a mutation
    /// (button, form) or a read (link, tab).
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Edit | Action::Delete | Action::Approve
        )
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::View | Action::Export)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
