//! Role/permission resolver.
//!
//! Fetches raw matrix rows from a [`MatrixSource`], validates them at the
//! response boundary and builds the immutable [`PermissionMatrix`] the
//! service answers capability checks from.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use workforce_rbac::{Grant, InvalidGrant, PermissionMatrix, RawGrant, Role};

use crate::error::{AccessError, AccessResult};
use crate::retry::{with_retry_if, RetryConfig};
use crate::source::{MatrixRequest, MatrixSource};

/// Outcome of validating one load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Role the rows were requested for (`None` = all roles)
    pub role: Option<Role>,
    /// Rows received from the source
    pub received: usize,
    /// Distinct grants accepted into the matrix
    pub accepted: usize,
    /// Valid rows that repeated an earlier grant
    pub duplicates: usize,
    /// Rows dropped during validation, with the reason
    pub rejected: Vec<InvalidGrant>,
    /// When the load completed
    pub loaded_at: DateTime<Utc>,
}

impl LoadReport {
    /// Check if every received row was usable.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A validated matrix and its load report.
#[derive(Debug, Clone)]
pub struct ResolvedMatrix {
    /// The validated matrix.
    pub matrix: PermissionMatrix,
    /// What happened during validation.
    pub report: LoadReport,
}

/// Validate raw rows into a matrix.
///
/// Rows that fail validation are left out, so anything they would have
/// granted stays denied.
pub fn build_matrix(rows: Vec<RawGrant>, role: Option<Role>) -> ResolvedMatrix {
    let received = rows.len();
    let mut matrix = PermissionMatrix::new();
    let mut rejected = Vec::new();
    let mut duplicates = 0;

    for row in rows {
        match Grant::try_from(row) {
            Ok(grant) => {
                if !matrix.insert(grant) {
                    duplicates += 1;
                }
            }
            Err(reason) => {
                warn!(%reason, "Rejected matrix row");
                rejected.push(reason);
            }
        }
    }

    let report = LoadReport {
        role,
        received,
        accepted: matrix.len(),
        duplicates,
        rejected,
        loaded_at: Utc::now(),
    };

    ResolvedMatrix { matrix, report }
}

/// Fetches and validates the role-permission matrix.
///
/// The resolver holds no state between loads; every call to
/// [`MatrixResolver::resolve`] is an independent, retryable fetch.
#[derive(Clone)]
pub struct MatrixResolver {
    /// Where rows come from
    source: Arc<dyn MatrixSource>,
    /// Retry policy for transient failures
    retry: RetryConfig,
}

impl std::fmt::Debug for MatrixResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixResolver")
            .field("source", &self.source.name())
            .field("retry", &self.retry)
            .finish()
    }
}

impl MatrixResolver {
    /// Create a resolver with the default retry policy.
    pub fn new(source: Arc<dyn MatrixSource>) -> Self {
        Self {
            source,
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch rows and build the matrix.
    ///
    /// Transport failures, throttling and 5xx responses are retried; other
    /// errors are returned after the first attempt.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn resolve(&self, request: &MatrixRequest) -> AccessResult<ResolvedMatrix> {
        let rows = with_retry_if(
            &self.retry,
            || self.source.fetch_rows(request),
            AccessError::is_retryable,
        )
        .await?;

        debug!(rows = rows.len(), "Fetched matrix rows");
        Ok(build_matrix(rows, request.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticMatrixSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use workforce_rbac::{Action, Module, Scope};

    fn quick_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            exponential_base: 2.0,
        }
    }

    /// Fails with the given error a number of times, then serves one row.
    struct FlakySource {
        failures: AtomicU32,
        error: AccessError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl MatrixSource for FlakySource {
        async fn fetch_rows(&self, _request: &MatrixRequest) -> AccessResult<Vec<RawGrant>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(vec![RawGrant::new("admin", "payroll", "view", None)])
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_build_matrix_reports_rejections_and_duplicates() {
        let resolved = build_matrix(
            vec![
                RawGrant::new("admin", "payroll", "view", None),
                RawGrant::new("admin", "payroll", "view", Some("all")),
                RawGrant::new("admin", "payroll", "teleport", None),
                RawGrant::new("intern", "payroll", "view", None),
                RawGrant::new("employee", "absence", "create", Some("own")),
            ],
            None,
        );

        assert_eq!(resolved.report.received, 5);
        assert_eq!(resolved.report.accepted, 2);
        assert_eq!(resolved.report.duplicates, 1);
        assert_eq!(resolved.report.rejected.len(), 2);
        assert!(!resolved.report.is_clean());
        assert!(resolved
            .matrix
            .allows(Role::Employee, Module::Absence, Action::Create, Some(Scope::Own)));
    }

    #[test]
    fn test_rejected_row_stays_denied() {
        let resolved = build_matrix(vec![RawGrant::new("admin", "payroll", "view", Some("planet"))], None);
        assert!(resolved.matrix.is_empty());
        assert!(!resolved.matrix.allows(Role::Admin, Module::Payroll, Action::View, None));
    }

    #[tokio::test]
    async fn test_resolve_from_static_source() {
        let source = Arc::new(StaticMatrixSource::from_strings(&[
            "admin:payroll:view",
            "employee:absence:create:own",
        ]));
        let resolver = MatrixResolver::new(source.clone());

        let request = MatrixRequest {
            role: Some(Role::Admin),
            access_token: None,
        };
        let resolved = resolver.resolve(&request).await.unwrap();
        assert_eq!(resolved.report.role, Some(Role::Admin));
        assert_eq!(resolved.matrix.len(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_retries_transient_errors() {
        let source = Arc::new(FlakySource {
            failures: AtomicU32::new(2),
            error: AccessError::Fetch {
                status: 503,
                message: "unavailable".into(),
            },
            calls: AtomicU32::new(0),
        });
        let resolver = MatrixResolver::new(source.clone()).with_retry(quick_retry());

        let resolved = resolver.resolve(&MatrixRequest::default()).await.unwrap();
        assert_eq!(resolved.matrix.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_resolve_does_not_retry_schema_errors() {
        let source = Arc::new(FlakySource {
            failures: AtomicU32::new(1),
            error: AccessError::Schema("object instead of array".into()),
            calls: AtomicU32::new(0),
        });
        let resolver = MatrixResolver::new(source.clone()).with_retry(quick_retry());

        let err = resolver.resolve(&MatrixRequest::default()).await.unwrap_err();
        assert!(matches!(err, AccessError::Schema(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
