//! # Grants
//!
//! Role-permission matrix entries and the matrix itself.
//! A grant says that a role may perform an action within a module, within
//! a scope.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::actions::Action;
use crate::modules::Module;
use crate::roles::Role;
use crate::scope::Scope;

/// One entry of the role-permission matrix.
///
/// # Example
///
/// ```
/// use workforce_rbac::{Action, Grant, Module, Role, Scope};
///
/// let grant = Grant::new(Role::Moderator, Module::Absence, Action::Approve, Scope::Team);
/// assert_eq!(grant.to_string(), "moderator:absence:approve:team");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Grant {
    /// Role holding the grant.
    pub role: Role,
    /// Module the grant applies to.
    #[serde(rename = "module_key")]
    pub module: Module,
    /// Permitted action.
    pub action: Action,
    /// Scope restriction; `All` when the backend row carries none.
    #[serde(default)]
    pub scope: Scope,
}

impl Grant {
    /// Create a new grant.
    pub fn new(role: Role, module: Module, action: Action, scope: Scope) -> Self {
        Self {
            role,
            module,
            action,
            scope,
        }
    }

    /// Create a grant with the wildcard scope.
    pub fn unscoped(role: Role, module: Module, action: Action) -> Self {
        Self::new(role, module, action, Scope::All)
    }

    /// Parse from `role:module:action[:scope]`.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_rbac::{Action, Grant, Module, Role, Scope};
    ///
    /// let grant = Grant::from_string("admin:payroll:export").unwrap();
    /// assert_eq!(grant.scope, Scope::All);
    ///
    /// let grant = Grant::from_string("employee:absence:create:own").unwrap();
    /// assert_eq!(grant.module, Module::Absence);
    /// assert_eq!(grant.scope, Scope::Own);
    /// ```
    pub fn from_string(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 3 || parts.len() > 4 {
            return None;
        }

        let role = Role::parse(parts[0])?;
        let module = Module::parse(parts[1])?;
        let action = Action::parse(parts[2])?;
        let scope = match parts.get(3) {
            Some(raw) => Scope::parse(raw)?,
            None => Scope::All,
        };

        Some(Self::new(role, module, action, scope))
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.role.as_str(),
            self.module.as_str(),
            self.action.as_str(),
            self.scope.as_str()
        )
    }
}

/// Why a raw matrix row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGrant {
    /// A required column was null or missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The role is not one this application knows.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The module key is not one this application knows.
    #[error("unknown module key: {0}")]
    UnknownModule(String),

    /// The action is not one this application knows.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The scope is not one this application knows.
    #[error("unknown scope: {0}")]
    UnknownScope(String),
}

/// A matrix row as the backend returns it, before validation.
///
/// Every column is optional text; [`Grant::try_from`] decides whether the row
/// is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawGrant {
    /// Role column.
    #[serde(default)]
    pub role: Option<String>,
    /// Module key column.
    #[serde(default)]
    pub module_key: Option<String>,
    /// Action column.
    #[serde(default)]
    pub action: Option<String>,
    /// Scope column; null means unrestricted.
    #[serde(default)]
    pub scope: Option<String>,
}

impl RawGrant {
    /// Build a raw row from string columns.
    pub fn new(
        role: impl Into<String>,
        module_key: impl Into<String>,
        action: impl Into<String>,
        scope: Option<&str>,
    ) -> Self {
        Self {
            role: Some(role.into()),
            module_key: Some(module_key.into()),
            action: Some(action.into()),
            scope: scope.map(str::to_string),
        }
    }
}

impl TryFrom<RawGrant> for Grant {
    type Error = InvalidGrant;

    /// Validate a raw row.
    ///
    /// Unlike [`Role::resolve`], an unknown role here is an error: a row for
    /// a role we cannot name must not be folded into the least privileged
    /// role's grants.
    fn try_from(raw: RawGrant) -> Result<Self, Self::Error> {
        let role_raw = raw.role.ok_or(InvalidGrant::MissingField("role"))?;
        let module_raw = raw.module_key.ok_or(InvalidGrant::MissingField("module_key"))?;
        let action_raw = raw.action.ok_or(InvalidGrant::MissingField("action"))?;

        let role = Role::parse(&role_raw).ok_or(InvalidGrant::UnknownRole(role_raw))?;
        let module = Module::parse(&module_raw).ok_or(InvalidGrant::UnknownModule(module_raw))?;
        let action = Action::parse(&action_raw).ok_or(InvalidGrant::UnknownAction(action_raw))?;
        let scope = match raw.scope {
            None => Scope::All,
            Some(s) if s.trim().is_empty() => Scope::All,
            Some(s) => Scope::parse(&s).ok_or(InvalidGrant::UnknownScope(s))?,
        };

        Ok(Grant::new(role, module, action, scope))
    }
}

/// The role-permission matrix.
///
/// Grants for the same (role, module, action) combine as a union of their
/// scopes. Anything not in the matrix is denied.
///
/// # Example
///
/// ```
/// use workforce_rbac::{Action, Grant, Module, PermissionMatrix, Role, Scope};
///
/// let matrix: PermissionMatrix = [
///     Grant::new(Role::Moderator, Module::Absence, Action::Approve, Scope::Team),
///     Grant::unscoped(Role::Admin, Module::Absence, Action::Approve),
/// ]
/// .into_iter()
/// .collect();
///
/// assert!(matrix.allows(Role::Moderator, Module::Absence, Action::Approve, Some(Scope::Team)));
/// assert!(!matrix.allows(Role::Moderator, Module::Absence, Action::Approve, Some(Scope::All)));
/// assert!(matrix.allows(Role::Admin, Module::Absence, Action::Approve, Some(Scope::Own)));
/// assert!(!matrix.allows(Role::Employee, Module::Absence, Action::Approve, None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMatrix {
    /// Granted scopes keyed by (role, module, action).
    entries: BTreeMap<(Role, Module, Action), BTreeSet<Scope>>,
}

impl PermissionMatrix {
    /// Create an empty matrix (denies everything).
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add a grant.
    ///
    /// # Returns
    ///
    /// `true` if the grant was not already present
    pub fn insert(&mut self, grant: Grant) -> bool {
        self.entries
            .entry((grant.role, grant.module, grant.action))
            .or_default()
            .insert(grant.scope)
    }

    /// Check whether `role` may perform `action` in `module`.
    ///
    /// Without a scope, any grant for the triple matches. With a scope, a
    /// grant matches if its scope equals the requested one or is `All`.
    pub fn allows(&self, role: Role, module: Module, action: Action, scope: Option<Scope>) -> bool {
        let Some(scopes) = self.entries.get(&(role, module, action)) else {
            return false;
        };

        match scope {
            None => !scopes.is_empty(),
            Some(requested) => scopes.iter().any(|granted| granted.covers(requested)),
        }
    }

    /// Get the scopes granted to `role` for an action in a module.
    pub fn scopes(&self, role: Role, module: Module, action: Action) -> Vec<Scope> {
        self.entries
            .get(&(role, module, action))
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Get the actions `role` holds in `module`, in declaration order.
    pub fn actions_for(&self, role: Role, module: Module) -> Vec<Action> {
        Action::all()
            .into_iter()
            .filter(|action| self.allows(role, module, *action, None))
            .collect()
    }

    /// Get the modules in which `role` holds at least one action.
    pub fn modules_for(&self, role: Role) -> Vec<Module> {
        let modules: BTreeSet<Module> = self
            .entries
            .iter()
            .filter(|((r, _, _), scopes)| *r == role && !scopes.is_empty())
            .map(|((_, module, _), _)| *module)
            .collect();
        modules.into_iter().collect()
    }

    /// Keep only the grants of one role.
    pub fn for_role(&self, role: Role) -> PermissionMatrix {
        self.grants().filter(|g| g.role == role).collect()
    }

    /// Iterate over every grant.
    pub fn grants(&self) -> impl Iterator<Item = Grant> + '_ {
        self.entries.iter().flat_map(|((role, module, action), scopes)| {
            scopes
                .iter()
                .map(move |scope| Grant::new(*role, *module, *action, *scope))
        })
    }

    /// Get the number of grants.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Grant> for PermissionMatrix {
    fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
        let mut matrix = PermissionMatrix::new();
        for grant in iter {
            matrix.insert(grant);
        }
        matrix
    }
}

impl Extend<Grant> for PermissionMatrix {
    fn extend<T: IntoIterator<Item = Grant>>(&mut self, iter: T) {
        for grant in iter {
            self.insert(grant);
        }
    }
}
