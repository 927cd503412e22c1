//! Connectivity probe for the hosted backend.
//!
//! The primary check reads one row through the anon-key client and decides
//! the outcome of the request. The secondary check counts rows through the
//! service-role client; its failure only degrades the report.

use crate::config::ProbeConfig;
use crate::error::{AppError, Result};
use crate::supabase::SupabaseClient;
use async_trait::async_trait;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Backend queried by the primary check
#[async_trait]
pub trait PrimaryBackend: Send + Sync {
    /// Read at most `limit` rows from `table`, returning how many came back
    async fn sample_rows(&self, table: &str, limit: usize) -> Result<usize>;
}

/// Data client queried by the secondary check
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count_records(&self, table: &str) -> Result<u64>;
}

#[async_trait]
impl PrimaryBackend for SupabaseClient {
    async fn sample_rows(&self, table: &str, limit: usize) -> Result<usize> {
        Ok(self.select_ids(table, limit).await?.len())
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn count_records(&self, table: &str) -> Result<u64> {
        self.count_exact(table).await
    }
}

/// Rows found by the primary check, or the failure message
pub type PrimaryResult = std::result::Result<usize, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum SecondaryStatus {
    /// No data client configured
    NotTested,
    Ok { user_count: u64, role_count: u64 },
    Degraded(String),
}

impl SecondaryStatus {
    fn describe(&self) -> String {
        match self {
            SecondaryStatus::NotTested => "Not tested".to_string(),
            SecondaryStatus::Ok { user_count, .. } => {
                format!("Working - {} users found", user_count)
            }
            SecondaryStatus::Degraded(message) => format!("Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeReport {
    Success {
        rows_found: usize,
        secondary: SecondaryStatus,
    },
    Failure {
        details: String,
    },
}

pub struct ConnectivityProbe {
    primary: Option<Arc<dyn PrimaryBackend>>,
    records: Option<Arc<dyn RecordStore>>,
    settings: ProbeConfig,
}

impl ConnectivityProbe {
    pub fn new(settings: ProbeConfig) -> Self {
        Self {
            primary: None,
            records: None,
            settings,
        }
    }

    pub fn with_primary(mut self, backend: Arc<dyn PrimaryBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    pub fn with_records(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.records = Some(store);
        self
    }

    /// Run both checks against the live backends. Nothing is cached between runs.
    pub async fn run(&self) -> ProbeReport {
        let rows_found = match self.check_primary().await {
            Ok(rows) => rows,
            Err(details) => {
                tracing::error!("Connection error: {}", details);
                return ProbeReport::Failure { details };
            }
        };

        let secondary = self.check_secondary().await;
        if let SecondaryStatus::Degraded(message) = &secondary {
            tracing::warn!("Data client check failed: {}", message);
        }

        ProbeReport::Success {
            rows_found,
            secondary,
        }
    }

    async fn check_primary(&self) -> PrimaryResult {
        let Some(primary) = &self.primary else {
            return Err(AppError::NotConfigured.to_string());
        };

        primary
            .sample_rows(&self.settings.table, 1)
            .await
            .map_err(|e| format!("Supabase error: {}", e))
    }

    async fn check_secondary(&self) -> SecondaryStatus {
        let Some(store) = &self.records else {
            return SecondaryStatus::NotTested;
        };

        let counts = tokio::try_join!(
            store.count_records(&self.settings.user_table),
            store.count_records(&self.settings.role_table),
        );

        match counts {
            Ok((user_count, role_count)) => SecondaryStatus::Ok {
                user_count,
                role_count,
            },
            Err(e) => SecondaryStatus::Degraded(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct SuccessEnvelope {
    success: bool,
    message: &'static str,
    data: ProbeData,
}

#[derive(Serialize)]
struct ProbeData {
    supabase: PrimaryStatusBody,
    prisma: SecondaryStatusBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryStatusBody {
    status: &'static str,
    users_found: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecondaryStatusBody {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_count: Option<u64>,
}

#[derive(Serialize)]
struct FailureEnvelope {
    success: bool,
    error: &'static str,
    details: String,
}

impl IntoResponse for ProbeReport {
    fn into_response(self) -> Response {
        match self {
            ProbeReport::Success {
                rows_found,
                secondary,
            } => {
                let (user_count, role_count) = match secondary {
                    SecondaryStatus::Ok {
                        user_count,
                        role_count,
                    } => (Some(user_count), Some(role_count)),
                    _ => (None, None),
                };

                let body = SuccessEnvelope {
                    success: true,
                    message: "Supabase connection is working!",
                    data: ProbeData {
                        supabase: PrimaryStatusBody {
                            status: "Connected",
                            users_found: rows_found,
                        },
                        prisma: SecondaryStatusBody {
                            status: secondary.describe(),
                            user_count,
                            role_count,
                        },
                    },
                };

                (StatusCode::OK, Json(body)).into_response()
            }
            ProbeReport::Failure { details } => {
                let body = FailureEnvelope {
                    success: false,
                    error: "Connection failed",
                    details,
                };

                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct FakePrimary {
        pub rows: std::result::Result<usize, String>,
        pub calls: AtomicUsize,
    }

    impl FakePrimary {
        pub fn rows(rows: usize) -> Self {
            Self {
                rows: Ok(rows),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                rows: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PrimaryBackend for FakePrimary {
        async fn sample_rows(&self, _table: &str, limit: usize) -> Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.rows {
                Ok(rows) => Ok((*rows).min(limit)),
                Err(message) => Err(AppError::Backend {
                    status: StatusCode::NOT_FOUND,
                    message: message.clone(),
                }),
            }
        }
    }

    pub(crate) struct FakeStore {
        pub counts: HashMap<String, u64>,
    }

    impl FakeStore {
        pub fn with(counts: &[(&str, u64)]) -> Self {
            Self {
                counts: counts.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn count_records(&self, table: &str) -> Result<u64> {
            self.counts
                .get(table)
                .copied()
                .ok_or_else(|| AppError::Backend {
                    status: StatusCode::NOT_FOUND,
                    message: format!("relation \"public.{}\" does not exist", table),
                })
        }
    }

    pub(crate) fn settings() -> ProbeConfig {
        ProbeConfig {
            table: "User".to_string(),
            user_table: "User".to_string(),
            role_table: "Role".to_string(),
        }
    }

    async fn body_of(report: ProbeReport) -> (StatusCode, serde_json::Value) {
        use http_body_util::BodyExt;

        let response = report.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_primary_success_with_rows() {
        let probe = ConnectivityProbe::new(settings())
            .with_primary(Arc::new(FakePrimary::rows(5)))
            .with_records(Arc::new(FakeStore::with(&[("User", 3), ("Role", 2)])));

        let report = probe.run().await;
        assert_eq!(
            report,
            ProbeReport::Success {
                rows_found: 1,
                secondary: SecondaryStatus::Ok {
                    user_count: 3,
                    role_count: 2
                },
            }
        );

        let (status, body) = body_of(report).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Supabase connection is working!");
        assert_eq!(body["data"]["supabase"]["status"], "Connected");
        assert_eq!(body["data"]["supabase"]["usersFound"], 1);
        assert_eq!(body["data"]["prisma"]["status"], "Working - 3 users found");
        assert_eq!(body["data"]["prisma"]["userCount"], 3);
        assert_eq!(body["data"]["prisma"]["roleCount"], 2);
    }

    #[tokio::test]
    async fn test_primary_success_with_empty_table() {
        let probe = ConnectivityProbe::new(settings())
            .with_primary(Arc::new(FakePrimary::rows(0)))
            .with_records(Arc::new(FakeStore::with(&[("User", 0), ("Role", 0)])));

        let (status, body) = body_of(probe.run().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["supabase"]["usersFound"], 0);
        assert_eq!(body["data"]["prisma"]["status"], "Working - 0 users found");
    }

    #[tokio::test]
    async fn test_primary_failure_is_fatal() {
        let store = Arc::new(FakeStore::with(&[("User", 3), ("Role", 2)]));
        let probe = ConnectivityProbe::new(settings())
            .with_primary(Arc::new(FakePrimary::failing("permission denied for table User")))
            .with_records(store);

        let (status, body) = body_of(probe.run().await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Connection failed");
        assert_eq!(
            body["details"],
            "Supabase error: permission denied for table User"
        );
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_secondary_failure_degrades() {
        // Role table missing
        let probe = ConnectivityProbe::new(settings())
            .with_primary(Arc::new(FakePrimary::rows(1)))
            .with_records(Arc::new(FakeStore::with(&[("User", 3)])));

        let (status, body) = body_of(probe.run().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["data"]["prisma"]["status"],
            "Error: relation \"public.Role\" does not exist"
        );
        assert!(body["data"]["prisma"].get("userCount").is_none());
        assert!(body["data"]["prisma"].get("roleCount").is_none());
    }

    #[tokio::test]
    async fn test_secondary_not_configured() {
        let probe =
            ConnectivityProbe::new(settings()).with_primary(Arc::new(FakePrimary::rows(1)));

        let (status, body) = body_of(probe.run().await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["prisma"]["status"], "Not tested");
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails() {
        let probe = ConnectivityProbe::new(settings());

        let (status, body) = body_of(probe.run().await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["details"],
            "Supabase is not configured: set SUPABASE_URL and SUPABASE_ANON_KEY"
        );
    }

    #[tokio::test]
    async fn test_every_run_hits_the_backend() {
        let primary = Arc::new(FakePrimary::rows(1));
        let probe = ConnectivityProbe::new(settings()).with_primary(primary.clone());

        probe.run().await;
        probe.run().await;
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
    }
}
