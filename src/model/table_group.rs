//! Table groups: named profiling scopes under a connection

use serde::{Deserialize, Serialize};

pub const DEFAULT_ID_COLUMN_MASK: &str = "%id";
pub const DEFAULT_SK_COLUMN_MASK: &str = "%_sk";
pub const DEFAULT_SAMPLE_PERCENT: i64 = 30;
pub const DEFAULT_SAMPLE_MIN_COUNT: i64 = 100_000;
pub const DEFAULT_PAIR_RULE_PCT: f64 = 95.0;

/// Stored table group (`TableGroupOut`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableGroup {
    /// UUID, kept as text
    pub id: String,
    #[serde(default)]
    pub project_code: String,
    pub connection_id: i64,
    pub table_groups_name: String,
    #[serde(default)]
    pub table_group_schema: Option<String>,
    #[serde(default)]
    pub explicit_table_list: Option<Vec<String>>,
    #[serde(default)]
    pub profiling_include_mask: Option<String>,
    #[serde(default)]
    pub profiling_exclude_mask: Option<String>,
    #[serde(default)]
    pub profile_id_column_mask: Option<String>,
    #[serde(default)]
    pub profile_sk_column_mask: Option<String>,
    #[serde(default)]
    pub profile_use_sampling: Option<serde_json::Value>,
    #[serde(default)]
    pub profile_sample_percent: Option<i64>,
    #[serde(default)]
    pub profile_sample_min_count: Option<i64>,
    #[serde(default)]
    pub min_profiling_age_days: Option<i64>,
    #[serde(default)]
    pub profile_flag_cdes: Option<bool>,
    #[serde(default)]
    pub profile_pair_rule_pct: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_complete_profile_run_id: Option<String>,
    #[serde(default)]
    pub dq_score_profiling: Option<f64>,
    #[serde(default)]
    pub dq_score_testing: Option<f64>,
}

impl TableGroup {
    /// Scope summary: explicit tables, or include/exclude masks
    pub fn scope(&self) -> String {
        if let Some(tables) = self.explicit_table_list.as_ref().filter(|t| !t.is_empty()) {
            return tables.join(", ");
        }
        let include = self.profiling_include_mask.as_deref().unwrap_or("%");
        match self.profiling_exclude_mask.as_deref() {
            Some(exclude) if !exclude.is_empty() => format!("{} (excl. {})", include, exclude),
            _ => include.to_string(),
        }
    }

    pub fn uses_sampling(&self) -> bool {
        match &self.profile_use_sampling {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("y"),
            _ => false,
        }
    }
}

/// Body of `POST /api/connections/{id}/table-groups`.
///
/// Optional fields are filled with their defaults before sending; metadata
/// fields the form does not collect are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTableGroup {
    pub table_groups_name: String,
    pub table_group_schema: Option<String>,
    pub explicit_table_list: Option<Vec<String>>,
    pub profiling_include_mask: Option<String>,
    pub profiling_exclude_mask: Option<String>,
    pub profile_id_column_mask: String,
    pub profile_sk_column_mask: String,
    pub profile_use_sampling: String,
    pub profile_sample_percent: i64,
    pub profile_sample_min_count: i64,
    pub min_profiling_age_days: i64,
    pub profile_flag_cdes: bool,
    pub profile_do_pair_rules: String,
    pub profile_pair_rule_pct: f64,
    pub description: Option<String>,
    pub data_source: Option<String>,
    pub source_system: Option<String>,
    pub source_process: Option<String>,
    pub data_location: Option<String>,
    pub business_domain: Option<String>,
    pub stakeholder_group: Option<String>,
    pub transform_level: Option<String>,
    pub data_product: Option<String>,
}

impl NewTableGroup {
    /// A group with only a name; every other field takes its default
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            table_groups_name: name.into(),
            table_group_schema: None,
            explicit_table_list: None,
            profiling_include_mask: None,
            profiling_exclude_mask: None,
            profile_id_column_mask: DEFAULT_ID_COLUMN_MASK.to_string(),
            profile_sk_column_mask: DEFAULT_SK_COLUMN_MASK.to_string(),
            profile_use_sampling: "N".to_string(),
            profile_sample_percent: DEFAULT_SAMPLE_PERCENT,
            profile_sample_min_count: DEFAULT_SAMPLE_MIN_COUNT,
            min_profiling_age_days: 0,
            profile_flag_cdes: true,
            profile_do_pair_rules: "N".to_string(),
            profile_pair_rule_pct: DEFAULT_PAIR_RULE_PCT,
            description: None,
            data_source: None,
            source_system: None,
            source_process: None,
            data_location: None,
            business_domain: None,
            stakeholder_group: None,
            transform_level: None,
            data_product: None,
        }
    }
}

/// Split a comma-separated table list, dropping blanks
pub fn parse_table_list(raw: &str) -> Option<Vec<String>> {
    let tables: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tables.is_empty() {
        None
    } else {
        Some(tables)
    }
}

/// Body of `POST /api/run-profiling`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerProfiling {
    pub connection_id: i64,
    pub table_group_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_group_carries_defaults() {
        let value = serde_json::to_value(NewTableGroup::named("finance")).unwrap();
        assert_eq!(value["table_groups_name"], "finance");
        assert_eq!(value["profile_id_column_mask"], "%id");
        assert_eq!(value["profile_sk_column_mask"], "%_sk");
        assert_eq!(value["profile_use_sampling"], "N");
        assert_eq!(value["profile_sample_percent"], 30);
        assert_eq!(value["profile_sample_min_count"], 100000);
        assert_eq!(value["min_profiling_age_days"], 0);
        assert_eq!(value["profile_flag_cdes"], true);
        assert_eq!(value["profile_do_pair_rules"], "N");
        assert_eq!(value["profile_pair_rule_pct"], 95.0);
        assert!(value["data_product"].is_null());
    }

    #[test]
    fn test_parse_table_list() {
        assert_eq!(
            parse_table_list(" orders, ,customers ,"),
            Some(vec!["orders".to_string(), "customers".to_string()])
        );
        assert_eq!(parse_table_list("  "), None);
    }

    #[test]
    fn test_scope_prefers_explicit_tables() {
        let group: TableGroup = serde_json::from_value(json!({
            "id": "6f1c",
            "connection_id": 7,
            "table_groups_name": "core",
            "explicit_table_list": ["orders", "items"],
            "profiling_include_mask": "sales_%",
            "profile_use_sampling": "Y"
        }))
        .unwrap();
        assert_eq!(group.scope(), "orders, items");
        assert!(group.uses_sampling());

        let masked: TableGroup = serde_json::from_value(json!({
            "id": "7a2d",
            "connection_id": 7,
            "table_groups_name": "staging",
            "profiling_include_mask": "stg_%",
            "profiling_exclude_mask": "stg_tmp%"
        }))
        .unwrap();
        assert_eq!(masked.scope(), "stg_% (excl. stg_tmp%)");
        assert!(!masked.uses_sampling());
    }
}
