//! Authenticated session as seen by the permission layer
//!
//! Sessions are owned by the authentication provider. This layer only reads
//! the user's identity, the role attribute, and the access token used to
//! query the matrix on the user's behalf.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use workforce_rbac::Role;

/// Read-only view of the signed-in user.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use workforce_access::Session;
/// use workforce_rbac::Role;
///
/// let session = Session::new(Uuid::now_v7(), "ana@example.com", Some("admin"));
/// assert_eq!(session.role, Role::Admin);
///
/// // Unknown role attributes degrade to the least privileged role
/// let session = Session::new(Uuid::now_v7(), "bo@example.com", Some("chief_wizard"));
/// assert_eq!(session.role, Role::Employee);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "SessionRecord")]
pub struct Session {
    /// User ID
    pub user_id: Uuid,

    /// User email
    pub email: String,

    /// Role attribute exactly as the auth provider reported it
    pub raw_role: Option<String>,

    /// Resolved role. Re-derived from `raw_role` on deserialize.
    pub role: Role,

    /// Access token forwarded to the backend, if any
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,

    /// When the session was established
    pub started_at: DateTime<Utc>,
}

/// Wire form of a session. Carries no resolved role.
#[derive(Deserialize)]
struct SessionRecord {
    user_id: Uuid,
    email: String,
    #[serde(default)]
    raw_role: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    started_at: DateTime<Utc>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email,
            role: Role::resolve(record.raw_role.as_deref()),
            raw_role: record.raw_role,
            access_token: record.access_token,
            started_at: record.started_at,
        }
    }
}

impl Session {
    /// Create a session, resolving the raw role attribute.
    pub fn new(user_id: Uuid, email: impl Into<String>, raw_role: Option<&str>) -> Self {
        Self {
            user_id,
            email: email.into(),
            raw_role: raw_role.map(str::to_string),
            role: Role::resolve(raw_role),
            access_token: None,
            started_at: Utc::now(),
        }
    }

    /// Attach the user's access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Check if the reported role was recognized.
    ///
    /// `false` means the session was downgraded to the least privileged role.
    pub fn role_recognized(&self) -> bool {
        self.raw_role.as_deref().and_then(Role::parse).is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("raw_role", &self.raw_role)
            .field("role", &self.role)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("started_at", &self.started_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_resolution() {
        let session = Session::new(Uuid::now_v7(), "a@example.com", Some("Moderator"));
        assert_eq!(session.role, Role::Moderator);
        assert!(session.role_recognized());

        let session = Session::new(Uuid::now_v7(), "b@example.com", None);
        assert_eq!(session.role, Role::Employee);
        assert!(!session.role_recognized());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session =
            Session::new(Uuid::now_v7(), "c@example.com", Some("admin")).with_access_token("secret-jwt");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-jwt"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let session =
            Session::new(Uuid::now_v7(), "d@example.com", Some("admin")).with_access_token("secret-jwt");
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-jwt"));
    }

    #[test]
    fn test_deserialize_ignores_serialized_role() {
        let json = serde_json::json!({
            "user_id": Uuid::now_v7(),
            "email": "e@example.com",
            "raw_role": "wizard",
            "role": "superadmin",
            "started_at": Utc::now(),
        });
        let session: Session = serde_json::from_value(json).unwrap();
        assert_eq!(session.role, Role::Employee);
        assert!(!session.role_recognized());
    }

    #[test]
    fn test_serialized_session_reloads_with_same_role() {
        let session = Session::new(Uuid::now_v7(), "f@example.com", Some("moderator"));
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Moderator);
        assert_eq!(back.user_id, session.user_id);
        assert!(back.access_token.is_none());
    }
}
