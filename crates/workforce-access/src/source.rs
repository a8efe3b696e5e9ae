//! Matrix sources.
//!
//! A source answers one query: "list the role-permission rows for this
//! session". Rows come back loosely typed; validation happens in the
//! resolver.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use workforce_rbac::{RawGrant, Role};

use crate::error::{AccessError, AccessResult};
use crate::session::Session;

/// Parameters of a matrix query.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MatrixRequest {
    /// Restrict rows to this role; `None` asks for every role.
    pub role: Option<Role>,

    /// User access token to send instead of the public key.
    pub access_token: Option<String>,
}

impl MatrixRequest {
    /// Build the request for a session.
    pub fn for_session(session: &Session, all_roles: bool) -> Self {
        Self {
            role: if all_roles { None } else { Some(session.role) },
            access_token: session.access_token.clone(),
        }
    }
}

impl std::fmt::Debug for MatrixRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixRequest")
            .field("role", &self.role)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

/// Backend query contract for the role-permission matrix.
#[async_trait]
pub trait MatrixSource: Send + Sync {
    /// Fetch raw matrix rows.
    ///
    /// Implementations must be idempotent; the resolver retries them.
    async fn fetch_rows(&self, request: &MatrixRequest) -> AccessResult<Vec<RawGrant>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// In-memory matrix source.
///
/// Serves a fixed set of rows, or a fixed error. Used by tests, offline
/// demos and hosts that ship the matrix with the build.
#[derive(Debug)]
pub struct StaticMatrixSource {
    /// Rows or the error to return
    response: RwLock<AccessResult<Vec<RawGrant>>>,
    /// Number of fetches served
    fetches: AtomicU32,
}

impl StaticMatrixSource {
    /// Create a source serving `rows`.
    pub fn new(rows: Vec<RawGrant>) -> Self {
        Self {
            response: RwLock::new(Ok(rows)),
            fetches: AtomicU32::new(0),
        }
    }

    /// Create a source from `role:module:action[:scope]` strings.
    ///
    /// ```
    /// use workforce_access::StaticMatrixSource;
    ///
    /// let source = StaticMatrixSource::from_strings(&["admin:payroll:view", "employee:absence:create:own"]);
    /// ```
    pub fn from_strings(rows: &[&str]) -> Self {
        Self::new(rows.iter().map(|s| parse_row(s)).collect())
    }

    /// Replace the rows served by later fetches.
    pub async fn set_rows(&self, rows: Vec<RawGrant>) {
        *self.response.write().await = Ok(rows);
    }

    /// Make later fetches fail with `error`.
    pub async fn fail_with(&self, error: AccessError) {
        *self.response.write().await = Err(error);
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatrixSource for StaticMatrixSource {
    async fn fetch_rows(&self, request: &MatrixRequest) -> AccessResult<Vec<RawGrant>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let rows = self.response.read().await.clone()?;

        // Rows whose role does not parse are kept so the resolver reports them.
        let rows: Vec<RawGrant> = match request.role {
            Some(role) => rows
                .into_iter()
                .filter(|row| match row.role.as_deref().and_then(Role::parse) {
                    Some(parsed) => parsed == role,
                    None => true,
                })
                .collect(),
            None => rows,
        };
        debug!(rows = rows.len(), role = ?request.role, "Serving static matrix rows");
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Split `role:module:action[:scope]` into a raw row without validating it.
fn parse_row(s: &str) -> RawGrant {
    let mut parts = s.splitn(4, ':');
    RawGrant {
        role: parts.next().map(str::to_string),
        module_key: parts.next().map(str::to_string),
        action: parts.next().map(str::to_string),
        scope: parts.next().map(str::to_string),
    }
}

#[cfg(feature = "rest")]
pub use rest::RestMatrixSource;

#[cfg(feature = "rest")]
mod rest {
    //! Matrix source backed by the hosted database's REST interface.

    use super::*;
    use crate::config::BackendConfig;
    use reqwest::Client;
    use tracing::{error, instrument, warn};

    /// Columns requested from the matrix table.
    const SELECT_COLUMNS: &str = "role,module_key,action,scope";

    /// REST client for the role-permission table.
    ///
    /// Issues `GET {base_url}/rest/v1/{table}?select=role,module_key,action,scope`
    /// with an optional `role=eq.{role}` filter.
    #[derive(Clone)]
    pub struct RestMatrixSource {
        /// HTTP client instance.
        client: Client,

        /// Backend configuration.
        config: BackendConfig,
    }

    impl std::fmt::Debug for RestMatrixSource {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RestMatrixSource")
                .field("base_url", &self.config.base_url)
                .field("table", &self.config.table)
                .finish()
        }
    }

    impl RestMatrixSource {
        /// Create a new REST source.
        pub fn new(config: BackendConfig) -> AccessResult<Self> {
            config
                .validate()
                .map_err(|e| AccessError::Config(e.to_string()))?;

            let client = Client::builder()
                .timeout(config.timeout())
                .build()
                .map_err(|e| AccessError::Config(format!("Failed to build HTTP client: {}", e)))?;

            Ok(Self { client, config })
        }

        /// Get the backend configuration.
        pub fn config(&self) -> &BackendConfig {
            &self.config
        }

        /// Handle the response and decode the row array.
        async fn handle_response(&self, response: reqwest::Response) -> AccessResult<Vec<RawGrant>> {
            let status = response.status();

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                if status.is_server_error() {
                    error!("Matrix backend error ({}): {}", status.as_u16(), message);
                } else {
                    warn!("Matrix request rejected ({}): {}", status.as_u16(), message);
                }
                return Err(AccessError::Fetch {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| AccessError::Schema(format!("expected an array of matrix rows: {}", e)))
        }
    }

    #[async_trait]
    impl MatrixSource for RestMatrixSource {
        #[instrument(skip(self), fields(table = %self.config.table))]
        async fn fetch_rows(&self, request: &MatrixRequest) -> AccessResult<Vec<RawGrant>> {
            let url = self.config.url(&format!("/rest/v1/{}", self.config.table));

            let mut query = vec![("select", SELECT_COLUMNS.to_string())];
            if let Some(role) = request.role {
                query.push(("role", format!("eq.{}", role.as_str())));
            }

            let mut http = self
                .client
                .get(&url)
                .query(&query)
                .header("Accept", "application/json");

            if let Some(ref api_key) = self.config.api_key {
                http = http.header("apikey", api_key);
            }
            let bearer = request
                .access_token
                .as_ref()
                .or(self.config.api_key.as_ref());
            if let Some(token) = bearer {
                http = http.header("Authorization", format!("Bearer {}", token));
            }

            debug!("Fetching matrix rows from {}", url);
            let response = http.send().await?;
            self.handle_response(response).await
        }

        fn name(&self) -> &'static str {
            "rest"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_parse_row_keeps_raw_text() {
        let row = parse_row("admin:payroll:view");
        assert_eq!(row, RawGrant::new("admin", "payroll", "view", None));

        let row = parse_row("employee:absence:create:own");
        assert_eq!(row.scope.as_deref(), Some("own"));
    }

    #[test]
    fn test_request_for_session() {
        let session = Session::new(Uuid::now_v7(), "a@example.com", Some("moderator"))
            .with_access_token("jwt");
        let request = MatrixRequest::for_session(&session, false);
        assert_eq!(request.role, Some(Role::Moderator));
        assert_eq!(request.access_token.as_deref(), Some("jwt"));

        let request = MatrixRequest::for_session(&session, true);
        assert_eq!(request.role, None);
        assert!(!format!("{:?}", request).contains("jwt"));
    }

    #[tokio::test]
    async fn test_static_source_filters_by_role() {
        let source = StaticMatrixSource::from_strings(&[
            "admin:payroll:view",
            "Admin:billing:view",
            "employee:absence:create:own",
        ]);

        let admin = MatrixRequest {
            role: Some(Role::Admin),
            access_token: None,
        };
        assert_eq!(source.fetch_rows(&admin).await.unwrap().len(), 2);
        assert_eq!(source.fetch_rows(&MatrixRequest::default()).await.unwrap().len(), 3);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_static_source_keeps_unparseable_roles_for_validation() {
        let source = StaticMatrixSource::from_strings(&[
            "admin:payroll:view",
            "wizard:payroll:view",
            "employee:absence:view",
        ]);
        let admin = MatrixRequest {
            role: Some(Role::Admin),
            access_token: None,
        };
        let rows = source.fetch_rows(&admin).await.unwrap();
        assert_eq!(rows.len(), 2);

        let resolved = crate::resolver::build_matrix(rows, admin.role);
        assert_eq!(resolved.report.accepted, 1);
        assert_eq!(resolved.report.rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_static_source_can_fail_and_recover() {
        let source = StaticMatrixSource::from_strings(&["admin:payroll:view"]);
        source.fail_with(AccessError::Transport("offline".into())).await;
        assert!(source.fetch_rows(&MatrixRequest::default()).await.is_err());

        source.set_rows(vec![]).await;
        assert!(source.fetch_rows(&MatrixRequest::default()).await.unwrap().is_empty());
    }
}
