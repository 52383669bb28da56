//! Profiling run data as served by the dashboard endpoints
//!
//! Field names follow the wire format (camelCase for the dashboard views,
//! snake_case for the raw run/result records). Everything is read-only on the
//! client side.

use crate::model::timestamp;
use chrono::NaiveDateTime;
use serde::Deserialize;

// ═══════════════════════════════════════════════════════════════════════════════
// Dashboard Overview
// ═══════════════════════════════════════════════════════════════════════════════

/// `GET /api/dashboard-overview`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    #[serde(default)]
    pub summary: RunSummaryStats,
    #[serde(default)]
    pub recent_runs: Vec<RecentRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummaryStats {
    #[serde(default)]
    pub tables: u64,
    #[serde(default)]
    pub columns: u64,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub missing_values: u64,
    /// Fraction in [0, 1]
    pub dq_score: Option<f64>,
    pub profiling_score: Option<f64>,
    pub cde_score: Option<f64>,
    #[serde(default)]
    pub distinct_values: u64,
    /// Already a percentage
    pub distinct_values_percentage: Option<f64>,
    /// Already a percentage
    pub completeness_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRun {
    #[serde(rename = "profiling_id")]
    pub profiling_id: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub profiling_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tables: u64,
}

impl DashboardOverview {
    /// The run with the latest `profilingTime`.
    ///
    /// Runs without a timestamp rank below any timestamped run; ties keep the
    /// order the backend returned.
    pub fn most_recent_run(&self) -> Option<&RecentRun> {
        let mut best: Option<&RecentRun> = None;
        for run in &self.recent_runs {
            match best {
                Some(current) if run.profiling_time <= current.profiling_time => {}
                _ => best = Some(run),
            }
        }
        best
    }

    /// Look a run up by id in the already fetched list
    pub fn run_summary(&self, run_id: &str) -> Option<&RecentRun> {
        self.recent_runs.iter().find(|run| run.profiling_id == run_id)
    }

    pub fn contains_run(&self, run_id: &str) -> bool {
        self.run_summary(run_id).is_some()
    }

    /// Runs ordered newest first for display
    pub fn runs_newest_first(&self) -> Vec<&RecentRun> {
        let mut runs: Vec<&RecentRun> = self.recent_runs.iter().collect();
        runs.sort_by(|a, b| b.profiling_time.cmp(&a.profiling_time));
        runs
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Per-run Tables
// ═══════════════════════════════════════════════════════════════════════════════

/// `GET /api/profiling-runs/{run_id}/table-names`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNameItem {
    pub table_name: String,
}

/// `GET /api/profiling-runs/{run_id}/tables/{table_name}/details`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDetail {
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub profiling_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub column_data_types: Vec<ColumnDataType>,
    #[serde(default)]
    pub data_distribution: Vec<DistributionEntry>,
    #[serde(default, rename = "tableDQScoreHistory")]
    pub dq_score_history: Vec<DqScoreEntry>,
    pub profiling_score: Option<f64>,
    pub distinct_value_percentage: Option<f64>,
    pub completeness_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDataType {
    pub column_name: String,
    #[serde(default)]
    pub column_type: String,
    pub general_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub column: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub distinct_values: u64,
    #[serde(default)]
    pub missing_values: u64,
    #[serde(default)]
    pub empty_values: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DqScoreEntry {
    #[serde(default, rename = "profiling_id")]
    pub profiling_id: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub profiling_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub dq_score: Option<f64>,
}

/// One plotted point of the DQ trend
#[derive(Debug, Clone, PartialEq)]
pub struct DqScorePoint {
    pub time: NaiveDateTime,
    /// 0-100, one decimal
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DqTrend {
    NotEnoughData,
    Series(Vec<DqScorePoint>),
}

/// Minimum number of points for a trend line
pub const MIN_TREND_POINTS: usize = 2;

/// Convert a [0, 1] score to a percentage with one decimal
pub fn score_to_percent(score: f64) -> f64 {
    (score * 100.0 * 10.0).round() / 10.0
}

impl TableDetail {
    /// DQ history as plottable points, sorted oldest first.
    ///
    /// Entries without a score are dropped, and so are entries that have a
    /// score but no `profiling_time`, because they cannot be placed on the
    /// time axis. A history of scored but undated runs therefore yields
    /// `DqTrend::NotEnoughData` and the chart says "not enough data".
    pub fn dq_score_series(&self) -> Vec<DqScorePoint> {
        let mut points: Vec<DqScorePoint> = self
            .dq_score_history
            .iter()
            .filter_map(|entry| {
                let score = entry.dq_score?;
                let time = entry.profiling_time?;
                Some(DqScorePoint {
                    time,
                    percent: score_to_percent(score),
                })
            })
            .collect();
        points.sort_by(|a, b| a.time.cmp(&b.time));
        points
    }

    pub fn dq_trend(&self) -> DqTrend {
        let points = self.dq_score_series();
        if points.len() < MIN_TREND_POINTS {
            DqTrend::NotEnoughData
        } else {
            DqTrend::Series(points)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Home Stats & Raw Run Records
// ═══════════════════════════════════════════════════════════════════════════════

/// `GET /api/home`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub connections: u64,
    #[serde(default)]
    pub table_groups: u64,
    #[serde(default)]
    pub profiling_runs: u64,
    #[serde(default)]
    pub runs: Vec<RunInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunInfo {
    pub connection_id: i64,
    pub profiling_id: String,
    #[serde(default)]
    pub status: String,
    pub table_groups_id: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfilingRun {
    pub id: String,
    #[serde(default)]
    pub project_code: String,
    pub connection_id: i64,
    pub table_groups_id: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub profiling_starttime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub profiling_endtime: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub log_message: Option<String>,
    pub table_ct: Option<i64>,
    pub column_ct: Option<i64>,
    pub anomaly_ct: Option<i64>,
    pub anomaly_table_ct: Option<i64>,
    pub anomaly_column_ct: Option<i64>,
    pub dq_affected_data_points: Option<i64>,
    pub dq_total_data_points: Option<i64>,
    pub dq_score_profiling: Option<f64>,
    pub process_id: Option<i64>,
}

/// `GET /api/latest-profiling-run`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatestProfilingRun {
    pub latest_run: ProfilingRun,
    #[serde(default)]
    pub profile_results: Vec<ProfileResult>,
}

/// Column-level profile result; only the fields shown in the UI are kept
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileResult {
    pub id: String,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub general_type: Option<String>,
    pub record_ct: Option<i64>,
    pub value_ct: Option<i64>,
    pub distinct_value_ct: Option<i64>,
    pub null_value_ct: Option<i64>,
    pub min_text: Option<String>,
    pub max_text: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub avg_value: Option<f64>,
    pub datatype_suggestion: Option<String>,
    pub pii_flag: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Presentation Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Coarse bucket used to colour run statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Completed,
    Failed,
    Other,
}

impl StatusKind {
    pub fn of(status: &str) -> Self {
        let lower = status.trim().to_ascii_lowercase();
        if lower.starts_with("complete") {
            StatusKind::Completed
        } else if lower.starts_with("fail") || lower == "error" {
            StatusKind::Failed
        } else {
            StatusKind::Other
        }
    }
}

/// Compact count: `1.2M`, `3.4K`, plain below a thousand
pub fn format_count(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Optional percentage rendered with one decimal, or `N/A`
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "N/A".to_string(),
    }
}
