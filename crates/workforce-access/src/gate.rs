//! Capability gating for views.
//!
//! Views declare what they need as [`Capability`] values and receive a
//! [`CapabilityGate`] by injection; they never reach for global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use workforce_rbac::{Action, Module, Scope};

/// A capability query: may the current role do `action` in `module`
/// (within `scope`)?
///
/// # Example
///
/// ```
/// use workforce_access::Capability;
/// use workforce_rbac::{Action, Module, Scope};
///
/// const APPROVE_TEAM_ABSENCES: Capability =
///     Capability::scoped(Module::Absence, Action::Approve, Scope::Team);
///
/// assert_eq!(APPROVE_TEAM_ABSENCES.to_string(), "absence:approve:team");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Capability {
    /// Module key.
    pub module: Module,
    /// Requested action.
    pub action: Action,
    /// Requested scope; `None` accepts a grant of any scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

impl Capability {
    /// Capability without a scope requirement.
    pub const fn new(module: Module, action: Action) -> Self {
        Self {
            module,
            action,
            scope: None,
        }
    }

    /// Capability restricted to a scope.
    pub const fn scoped(module: Module, action: Action, scope: Scope) -> Self {
        Self {
            module,
            action,
            scope: Some(scope),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "{}:{}:{}", self.module, self.action, scope),
            None => write!(f, "{}:{}", self.module, self.action),
        }
    }
}

/// Something that can answer capability queries synchronously.
///
/// Implementations must fail closed: whenever the answer is unknown the
/// result is `false`.
pub trait CapabilityGate {
    /// Check a single capability.
    fn can(&self, capability: &Capability) -> bool;

    /// Check that at least one capability is granted (`false` when empty).
    fn can_any(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().any(|c| self.can(c))
    }

    /// Check that every capability is granted.
    ///
    /// An empty list is only satisfied by a gate that is able to answer at
    /// all; see [`CapabilityGate::is_ready`].
    fn can_all(&self, capabilities: &[Capability]) -> bool {
        self.is_ready() && capabilities.iter().all(|c| self.can(c))
    }

    /// Check if the gate has a usable matrix.
    fn is_ready(&self) -> bool;

    /// Keep only the items whose capability is granted.
    ///
    /// Navigation menus use this to hide entries the role cannot open.
    fn visible<'a, T>(&self, items: &'a [(Capability, T)]) -> Vec<&'a T>
    where
        Self: Sized,
    {
        items
            .iter()
            .filter(|(capability, _)| self.can(capability))
            .map(|(_, item)| item)
            .collect()
    }
}
