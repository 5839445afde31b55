use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api_types::{AuditQuery, AuditTrailResponse, CatalogQuery, LoginRequest, TransitionBody};
use crate::workflow::{AuditEntry, ReportedFacts, TransitionCatalog, TransitionOutcome, WorkOrderState};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUDIT_FETCH_LIMIT: i64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx answer. `detail` is the server's `{detail}` message when one
    /// could be read.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Http { status: StatusCode, detail: Option<String> },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://127.0.0.1:8080`. `/api/v1` is appended.
    pub base_url: String,
    pub timeout_secs: u64,
    /// How many audit entries the coordinator asks for.
    pub audit_fetch_limit: i64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            audit_fetch_limit: DEFAULT_AUDIT_FETCH_LIMIT,
        }
    }
}

/// Calls a workflow authority over the network.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn available_transitions(
        &self,
        work_order_id: i64,
        facts: &ReportedFacts,
    ) -> Result<TransitionCatalog, ClientError>;

    async fn execute_transition(
        &self,
        work_order_id: i64,
        target: WorkOrderState,
        body: &TransitionBody,
    ) -> Result<TransitionOutcome, ClientError>;

    async fn audit_trail(&self, work_order_id: i64, limit: i64) -> Result<Vec<AuditEntry>, ClientError>;
}

#[derive(Deserialize)]
struct DetailBody {
    detail: String,
}

/// [`WorkflowApi`] over reqwest. The cookie store carries the session set
/// by [`HttpWorkflowApi::login`].
#[derive(Debug, Clone)]
pub struct HttpWorkflowApi {
    http: Client,
    api_base: String,
}

impl HttpWorkflowApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            http,
            api_base: format!("{base}/api/v1"),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Turn a non-2xx response into [`ClientError::Http`], keeping `{detail}`.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<DetailBody>()
        .await
        .ok()
        .map(|b| b.detail)
        .filter(|d| !d.trim().is_empty());
    Err(ClientError::Http { status, detail })
}

#[async_trait]
impl WorkflowApi for HttpWorkflowApi {
    async fn available_transitions(
        &self,
        work_order_id: i64,
        facts: &ReportedFacts,
    ) -> Result<TransitionCatalog, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/work-orders/{work_order_id}/available-transitions")))
            .query(&CatalogQuery::from(*facts))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn execute_transition(
        &self,
        work_order_id: i64,
        target: WorkOrderState,
        body: &TransitionBody,
    ) -> Result<TransitionOutcome, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/work-orders/{work_order_id}/transition/{target}")))
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn audit_trail(&self, work_order_id: i64, limit: i64) -> Result<Vec<AuditEntry>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/work-orders/{work_order_id}/audit-trail")))
            .query(&AuditQuery { limit: Some(limit) })
            .send()
            .await?;
        let body: AuditTrailResponse = Self::read_json(response).await?;
        Ok(body.audit_trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_base_url_without_scheme() {
        let err = HttpWorkflowApi::new(&ClientConfig::new("localhost:8080")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let api = HttpWorkflowApi::new(&ClientConfig::new("http://garage.local/")).unwrap();
        assert_eq!(api.url("/me"), "http://garage.local/api/v1/me");
    }

    #[test]
    fn http_error_display_includes_detail() {
        let err = ClientError::Http {
            status: StatusCode::FORBIDDEN,
            detail: Some("Role WORKSHOP is not authorized for this transition".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 403 Forbidden: Role WORKSHOP is not authorized for this transition"
        );
    }
}
