//! HTTP client for the profiling backend
//!
//! Blocking `reqwest` client; calls run on worker threads (see `worker`).
//! Every request reads the bearer token from the shared `TokenStore` at send
//! time and is attempted exactly once.

use crate::config::TokenStore;
use crate::model::connection::{
    Connection, ConnectionRequest, ConnectionUpdate, MessageResponse, TestConnectionResult,
};
use crate::model::profiling::{
    DashboardOverview, DashboardStats, LatestProfilingRun, ProfileResult, TableDetail,
    TableNameItem,
};
use crate::model::table_group::{NewTableGroup, TableGroup, TriggerProfiling};
use reqwest::blocking::Client;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// One entry of a structured validation `detail`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    #[serde(default)]
    pub msg: String,
}

impl FieldError {
    /// `body.project_code` style location
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path(), e.msg))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all
    #[error("Network error: {0}")]
    Transport(String),
    /// Structured per-field `detail`
    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
    /// String `detail` or `message`
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// Non-2xx without a usable body
    #[error("Request failed with status {0}")]
    Status(u16),
    /// 2xx whose body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid base URL: {0}")]
    Url(String),
}

impl ApiError {
    /// The message the backend supplied, if any
    pub fn backend_message(&self) -> Option<String> {
        match self {
            ApiError::Validation(_) | ApiError::Backend { .. } => Some(self.to_string()),
            _ => None,
        }
    }

    /// Backend message when there is one, otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message()
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

/// Classify a non-2xx response body
pub fn error_from_response(status: u16, body: &str) -> ApiError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return ApiError::Status(status);
    };
    match (parsed.detail, parsed.message) {
        (Some(ErrorDetail::Fields(fields)), _) if !fields.is_empty() => {
            ApiError::Validation(fields)
        }
        (Some(ErrorDetail::Message(message)), _) | (_, Some(message)) => {
            ApiError::Backend { status, message }
        }
        _ => ApiError::Status(status),
    }
}

/// Decode a 2xx body; an empty body reads as JSON `null`
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let trimmed = body.trim();
    let source = if trimmed.is_empty() { "null" } else { trimmed };
    serde_json::from_str(source).map_err(|e| ApiError::Decode(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Client
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        tokens: TokenStore,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Url(format!("{}: {}", base_url, e)))?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Join path segments onto the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Url(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");

        let mut request = self.http.request(method, url);
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &text));
        }
        decode_body(&text)
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.send(Method::GET, segments, None)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send(method, segments, Some(value))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connections
    // ─────────────────────────────────────────────────────────────────────────

    pub fn test_connection(
        &self,
        request: &ConnectionRequest,
    ) -> Result<TestConnectionResult, ApiError> {
        self.send_json(Method::POST, &["api", "connections"], request)
    }

    pub fn create_connection(&self, request: &ConnectionRequest) -> Result<Connection, ApiError> {
        self.send_json(Method::POST, &["api", "connections"], request)
    }

    pub fn list_connections(&self) -> Result<Vec<Connection>, ApiError> {
        self.get(&["api", "connections"])
    }

    pub fn get_connection(&self, id: i64) -> Result<Connection, ApiError> {
        self.get(&["api", "connections", &id.to_string()])
    }

    pub fn update_connection(
        &self,
        id: i64,
        update: &ConnectionUpdate,
    ) -> Result<Connection, ApiError> {
        self.send_json(Method::PUT, &["api", "connections", &id.to_string()], update)
    }

    pub fn delete_connection(&self, id: i64) -> Result<MessageResponse, ApiError> {
        let response: Option<MessageResponse> =
            self.send(Method::DELETE, &["api", "connections", &id.to_string()], None)?;
        Ok(response.unwrap_or_default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table Groups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_table_group(
        &self,
        connection_id: i64,
        group: &NewTableGroup,
    ) -> Result<TableGroup, ApiError> {
        self.send_json(
            Method::POST,
            &["api", "connections", &connection_id.to_string(), "table-groups"],
            group,
        )
    }

    pub fn list_table_groups(&self, connection_id: i64) -> Result<Vec<TableGroup>, ApiError> {
        self.get(&["api", "connections", &connection_id.to_string(), "table-groups", ""])
    }

    pub fn get_table_group(&self, connection_id: i64, group_id: &str) -> Result<TableGroup, ApiError> {
        self.get(&["api", "connections", &connection_id.to_string(), "table-groups", group_id])
    }

    pub fn delete_table_group(
        &self,
        connection_id: i64,
        group_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let response: Option<MessageResponse> = self.send(
            Method::DELETE,
            &["api", "connections", &connection_id.to_string(), "table-groups", group_id],
            None,
        )?;
        Ok(response.unwrap_or_default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profiling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn trigger_profiling(&self, request: &TriggerProfiling) -> Result<MessageResponse, ApiError> {
        self.send_json(Method::POST, &["api", "run-profiling"], request)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(&["api", "home"])
    }

    pub fn dashboard_overview(&self) -> Result<DashboardOverview, ApiError> {
        self.get(&["api", "dashboard-overview"])
    }

    pub fn profile_results(
        &self,
        connection_id: i64,
        group_id: &str,
        run_id: &str,
    ) -> Result<Vec<ProfileResult>, ApiError> {
        self.get(&[
            "api",
            "connections",
            &connection_id.to_string(),
            "table-groups",
            group_id,
            "profiling-runs",
            run_id,
            "profile-results",
        ])
    }

    pub fn latest_profiling_run(&self) -> Result<LatestProfilingRun, ApiError> {
        self.get(&["api", "latest-profiling-run"])
    }

    pub fn table_names(&self, run_id: &str) -> Result<Vec<TableNameItem>, ApiError> {
        self.get(&["api", "profiling-runs", run_id, "table-names"])
    }

    pub fn table_detail(&self, run_id: &str, table_name: &str) -> Result<TableDetail, ApiError> {
        self.get(&["api", "profiling-runs", run_id, "tables", table_name, "details"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, None, TokenStore::in_memory(None)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:8000/");
        let url = api.endpoint(&["api", "dashboard-overview"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/dashboard-overview");
    }

    #[test]
    fn test_endpoint_encodes_table_names() {
        let api = client("http://localhost:8000");
        let url = api
            .endpoint(&["api", "profiling-runs", "r1", "tables", "order items/v2", "details"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/profiling-runs/r1/tables/order%20items%2Fv2/details"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_trailing_slash() {
        let api = client("https://dq.example.com/backend");
        let url = api.endpoint(&["api", "connections", "7", "table-groups", ""]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dq.example.com/backend/api/connections/7/table-groups/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new("not a url", None, TokenStore::in_memory(None));
        assert!(matches!(result, Err(ApiError::Url(_))));
    }

    #[test]
    fn test_validation_detail_is_joined() {
        let body = r#"{"detail":[
            {"loc":["body","project_code"],"msg":"field required","type":"missing"},
            {"loc":["body","db_port"],"msg":"value is not a valid integer"}
        ]}"#;
        let err = error_from_response(422, body);
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "body.project_code: field required, body.db_port: value is not a valid integer"
        );
        assert!(err.backend_message().is_some());
    }

    #[test]
    fn test_numeric_loc_parts() {
        let body = r#"{"detail":[{"loc":["body","explicit_table_list",0],"msg":"str type expected"}]}"#;
        assert_eq!(
            error_from_response(422, body).to_string(),
            "body.explicit_table_list.0: str type expected"
        );
    }

    #[test]
    fn test_string_detail_and_message_bodies() {
        let err = error_from_response(404, r#"{"detail":"Connection not found"}"#);
        assert!(matches!(&err, ApiError::Backend { status: 404, .. }));
        assert_eq!(err.to_string(), "Connection not found");

        let auth = error_from_response(401, r#"{"error":"unauthorized","message":"Token expired"}"#);
        assert_eq!(auth.to_string(), "Token expired");
    }

    #[test]
    fn test_unusable_error_bodies_fall_back_to_status() {
        assert!(matches!(error_from_response(502, "<html>bad gateway</html>"), ApiError::Status(502)));
        assert!(matches!(error_from_response(500, r#"{"detail":{"code":1}}"#), ApiError::Status(500)));
        assert!(matches!(error_from_response(500, ""), ApiError::Status(500)));
        assert!(ApiError::Status(500).backend_message().is_none());
        assert_eq!(
            ApiError::Status(500).user_message("Failed to save connection."),
            "Failed to save connection."
        );
    }

    #[test]
    fn test_decode_body() {
        let items: Vec<TableNameItem> = decode_body(r#"[{"tableName":"orders"}]"#).unwrap();
        assert_eq!(items[0].table_name, "orders");

        let empty: Option<MessageResponse> = decode_body("").unwrap();
        assert!(empty.is_none());

        let bad: Result<Vec<TableNameItem>, _> = decode_body(r#"{"oops":true}"#);
        assert!(matches!(bad, Err(ApiError::Decode(_))));
    }
}
