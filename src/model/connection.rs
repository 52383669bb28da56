//! Database connections and their request payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored connection as returned by `GET /api/connections[/{id}]`.
///
/// The list endpoint is tolerated with only a handful of fields present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Connection {
    pub connection_id: i64,
    #[serde(default)]
    pub project_code: String,
    #[serde(default)]
    pub connection_name: String,
    #[serde(default)]
    pub connection_description: Option<String>,
    #[serde(default)]
    pub sql_flavor: String,
    #[serde(default)]
    pub project_host: Option<serde_json::Value>,
    #[serde(default)]
    pub project_port: Option<serde_json::Value>,
    #[serde(default)]
    pub project_user: String,
    #[serde(default)]
    pub project_db: Option<String>,
    #[serde(default)]
    pub max_threads: Option<i64>,
    #[serde(default)]
    pub max_query_chars: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub connect_by_url: Option<bool>,
    #[serde(default)]
    pub connect_by_key: Option<bool>,
    #[serde(default)]
    pub http_path: Option<String>,
}

/// Host/port come back as strings or numbers depending on the store
fn scalar_to_string(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl Connection {
    pub fn host(&self) -> String {
        scalar_to_string(&self.project_host)
    }

    pub fn port(&self) -> String {
        scalar_to_string(&self.project_port)
    }

    pub fn database(&self) -> &str {
        self.project_db.as_deref().unwrap_or("")
    }

    /// Display label for the flavor column
    pub fn flavor_label(&self) -> String {
        SqlFlavor::from_label(&self.sql_flavor)
            .map(|f| f.label().to_string())
            .unwrap_or_else(|| self.sql_flavor.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SQL Flavors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFlavor {
    PostgreSql,
    MySql,
    Sqlite,
    Oracle,
    SqlServer,
    Mssql,
    Snowflake,
    Redshift,
}

impl SqlFlavor {
    pub fn all() -> &'static [SqlFlavor] {
        &[
            SqlFlavor::PostgreSql,
            SqlFlavor::MySql,
            SqlFlavor::Sqlite,
            SqlFlavor::Oracle,
            SqlFlavor::SqlServer,
            SqlFlavor::Mssql,
            SqlFlavor::Snowflake,
            SqlFlavor::Redshift,
        ]
    }

    /// Value sent on the wire
    pub fn label(&self) -> &'static str {
        match self {
            SqlFlavor::PostgreSql => "PostgreSQL",
            SqlFlavor::MySql => "MySQL",
            SqlFlavor::Sqlite => "SQLite",
            SqlFlavor::Oracle => "Oracle",
            SqlFlavor::SqlServer => "SQL Server",
            SqlFlavor::Mssql => "MSSQL",
            SqlFlavor::Snowflake => "Snowflake",
            SqlFlavor::Redshift => "Redshift",
        }
    }

    /// Case-insensitive lookup; the backend stores flavors lowercased
    pub fn from_label(label: &str) -> Option<SqlFlavor> {
        let needle = label.trim();
        Self::all()
            .iter()
            .copied()
            .find(|flavor| flavor.label().eq_ignore_ascii_case(needle))
    }

    pub fn default_port(&self) -> &'static str {
        match self {
            SqlFlavor::PostgreSql | SqlFlavor::Redshift => "5432",
            SqlFlavor::MySql => "3306",
            SqlFlavor::Sqlite => "0",
            SqlFlavor::Oracle => "1521",
            SqlFlavor::SqlServer | SqlFlavor::Mssql => "1433",
            SqlFlavor::Snowflake => "443",
        }
    }
}

impl fmt::Display for SqlFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payloads
// ═══════════════════════════════════════════════════════════════════════════════

/// Action tag carried by connection form submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionAction {
    Test,
    Create,
    Update,
    Delete,
}

impl ConnectionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionAction::Test => "test",
            ConnectionAction::Create => "create",
            ConnectionAction::Update => "update",
            ConnectionAction::Delete => "delete",
        }
    }
}

/// Body of `POST /api/connections` for `test` and `create`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRequest {
    pub action: ConnectionAction,
    pub sql_flavor: String,
    pub db_hostname: String,
    pub db_port: u16,
    pub user_id: String,
    pub password: String,
    pub project_db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_query_chars: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_by_url: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_by_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_path: Option<String>,
}

/// Body of `PUT /api/connections/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionUpdate {
    pub action: ConnectionAction,
    pub project_code: String,
    pub connection_name: String,
    pub connection_description: Option<String>,
    pub sql_flavor: String,
    pub project_host: String,
    pub project_port: String,
    pub project_user: String,
    pub password: String,
    pub project_db: Option<String>,
}

/// Response of a `test` action
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestConnectionResult {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Generic `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_from_sparse_list_entry() {
        let conn: Connection = serde_json::from_value(json!({
            "connection_id": 7,
            "connection_name": "Prod",
            "sql_flavor": "PostgreSQL",
            "project_db": "sales"
        }))
        .unwrap();
        assert_eq!(conn.connection_id, 7);
        assert_eq!(conn.flavor_label(), "PostgreSQL");
        assert_eq!(conn.database(), "sales");
        assert_eq!(conn.host(), "");
    }

    #[test]
    fn test_port_may_be_number_or_string() {
        let numeric: Connection =
            serde_json::from_value(json!({"connection_id": 1, "project_port": 5432})).unwrap();
        let text: Connection =
            serde_json::from_value(json!({"connection_id": 2, "project_port": "5433"})).unwrap();
        assert_eq!(numeric.port(), "5432");
        assert_eq!(text.port(), "5433");
    }

    #[test]
    fn test_flavor_lookup_is_case_insensitive() {
        assert_eq!(SqlFlavor::from_label("postgresql"), Some(SqlFlavor::PostgreSql));
        assert_eq!(SqlFlavor::from_label("sql server"), Some(SqlFlavor::SqlServer));
        assert_eq!(SqlFlavor::from_label("db2"), None);

        let stored: Connection =
            serde_json::from_value(json!({"connection_id": 3, "sql_flavor": "mysql"})).unwrap();
        assert_eq!(stored.flavor_label(), "MySQL");
    }

    #[test]
    fn test_request_serializes_action_tag() {
        let request = ConnectionRequest {
            action: ConnectionAction::Test,
            sql_flavor: "PostgreSQL".to_string(),
            db_hostname: "db.local".to_string(),
            db_port: 5432,
            user_id: "app".to_string(),
            password: "secret".to_string(),
            project_db: "sales".to_string(),
            project_code: None,
            connection_name: None,
            connection_description: None,
            max_query_chars: None,
            url: None,
            connect_by_url: None,
            connect_by_key: None,
            http_path: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["action"], "test");
        assert_eq!(value["db_port"], 5432);
        assert!(value.get("connection_name").is_none());
    }
}
