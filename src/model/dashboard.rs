//! Run/table selection and the cascading fetches behind the dashboard
//!
//! `Dashboard` is a pure state machine: it never performs I/O. Each operation
//! returns the requests that must be dispatched, and `complete` consumes the
//! matching completions. A completion is applied only if it carries the ticket
//! of the latest request for that slot and its key still matches the current
//! selection; anything else is stale and dropped.
//!
//! Flow: overview arrives → most recent run selected → table names fetched →
//! first table (or the retained one) selected → table detail fetched.

use crate::model::fetch::{Fetch, Pending};
use crate::model::profiling::{DashboardOverview, RecentRun, TableDetail};
use crate::model::selection::SelectionState;
use crate::services::api::ApiError;
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use tracing::{debug, info, warn};

/// Run list panel: the overview fetched on mount and on refresh
#[derive(Debug, Default)]
pub struct RunListState {
    pub overview: Fetch<DashboardOverview>,
    pending: Option<Pending<()>>,
    /// A refresh failed while a previously loaded list stayed on screen
    refresh_error: Option<String>,
}

/// Run detail panel: table names of the selected run and the selected
/// table's detail
#[derive(Debug, Default)]
pub struct RunDetailState {
    pub table_names: Fetch<Vec<String>>,
    pub detail: Fetch<TableDetail>,
    pending_names: Option<Pending<String>>,
    pending_detail: Option<Pending<(String, String)>>,
}

impl RunDetailState {
    fn reset(&mut self) {
        self.table_names = Fetch::Idle;
        self.detail = Fetch::Idle;
        self.pending_names = None;
        self.pending_detail = None;
    }

    fn contains_table(&self, name: &str) -> bool {
        self.table_names
            .loaded()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    selection: SelectionState,
    pub runs: RunListState,
    pub detail: RunDetailState,
}

const OVERVIEW_FAILED: &str = "Could not load dashboard data.";
const TABLES_FAILED: &str = "Could not load tables for this run.";
const DETAIL_FAILED: &str = "Could not load table details.";

/// Panel text for a failed fetch: the backend's own message, or `fallback`
/// for transport, status and decode failures
fn failure_message(error: &ApiError, fallback: &str) -> String {
    warn!(error = %error, "dashboard fetch failed");
    error.user_message(fallback)
}

fn unexpected_reply(reply: &ApiReply, fallback: &str) -> String {
    warn!(reply = ?reply, "unexpected reply for dashboard fetch");
    fallback.to_string()
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Summary fields of the selected run, from the already fetched overview
    pub fn selected_run(&self) -> Option<&RecentRun> {
        let run_id = self.selection.run_id()?;
        self.runs.overview.loaded()?.run_summary(run_id)
    }

    pub fn is_loading(&self) -> bool {
        self.runs.pending.is_some()
            || self.runs.overview.is_loading()
            || self.detail.table_names.is_loading()
            || self.detail.detail.is_loading()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Initial overview fetch
    pub fn mount(&mut self) -> Vec<Outbound> {
        self.request_overview()
    }

    /// Re-fetch the overview. The current run stays selected if it is still
    /// listed once the new overview arrives.
    /// A loaded list stays visible while the refresh is in flight, and also
    /// when it fails (see `take_refresh_error`).
    pub fn refresh(&mut self) -> Vec<Outbound> {
        self.request_overview()
    }

    /// Failure of the last refresh that kept the previous list, reported once
    pub fn take_refresh_error(&mut self) -> Option<String> {
        self.runs.refresh_error.take()
    }

    fn request_overview(&mut self) -> Vec<Outbound> {
        let pending = Pending::new(());
        let ticket = pending.ticket;
        self.runs.pending = Some(pending);
        if self.runs.overview.loaded().is_none() {
            self.runs.overview = Fetch::Loading;
        }
        vec![Outbound::new(ticket, ApiRequest::DashboardOverview)]
    }

    /// Select a run: clears the table, drops anything in flight for the
    /// previous run and fetches the new run's table names.
    pub fn select_run(&mut self, run_id: &str) -> Vec<Outbound> {
        info!(run_id, from = ?self.selection.phase(), "run selected");
        self.selection.select_run(run_id);
        self.detail.reset();

        let pending = Pending::new(run_id.to_string());
        let ticket = pending.ticket;
        self.detail.pending_names = Some(pending);
        self.detail.table_names = Fetch::Loading;
        vec![Outbound::new(
            ticket,
            ApiRequest::TableNames {
                run_id: run_id.to_string(),
            },
        )]
    }

    /// Select a table of the current run. Ignored when no run is selected or
    /// the table is not in the run's loaded table list.
    pub fn select_table(&mut self, table_name: &str) -> Vec<Outbound> {
        if !self.detail.contains_table(table_name) {
            debug!(table_name, "ignoring selection of unlisted table");
            return Vec::new();
        }
        if self.selection.table_name() == Some(table_name)
            && (self.detail.pending_detail.is_some() || self.detail.detail.loaded().is_some())
        {
            return Vec::new();
        }
        self.apply_table(Some(table_name.to_string()))
    }

    /// Write the table selection through the store and issue the detail fetch
    fn apply_table(&mut self, table_name: Option<String>) -> Vec<Outbound> {
        if !self.selection.select_table(table_name) {
            return Vec::new();
        }
        self.detail.pending_detail = None;

        let Some((run_id, table_name)) = self
            .selection
            .pair()
            .map(|(run, table)| (run.to_string(), table.to_string()))
        else {
            self.detail.detail = Fetch::Idle;
            return Vec::new();
        };

        let pending = Pending::new((run_id.clone(), table_name.clone()));
        let ticket = pending.ticket;
        self.detail.pending_detail = Some(pending);
        self.detail.detail = Fetch::Loading;
        vec![Outbound::new(
            ticket,
            ApiRequest::TableDetail { run_id, table_name },
        )]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completions
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a completion and return any follow-up requests
    pub fn complete(&mut self, completion: Completion) -> Vec<Outbound> {
        let Completion {
            ticket,
            kind,
            result,
        } = completion;

        match kind {
            RequestKind::DashboardOverview => {
                if !self.runs.pending.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale overview");
                    return Vec::new();
                }
                self.runs.pending = None;
                self.on_overview(result)
            }
            RequestKind::TableNames => {
                let Some(pending) = self.detail.pending_names.take() else {
                    debug!(%ticket, "discarding unexpected table names");
                    return Vec::new();
                };
                if !pending.answers(ticket) || self.selection.run_id() != Some(pending.key.as_str())
                {
                    debug!(%ticket, run_id = %pending.key, "discarding stale table names");
                    self.detail.pending_names = Some(pending);
                    return Vec::new();
                }
                self.on_table_names(result)
            }
            RequestKind::TableDetail => {
                let Some(pending) = self.detail.pending_detail.take() else {
                    debug!(%ticket, "discarding unexpected table detail");
                    return Vec::new();
                };
                let (run_id, table_name) = (&pending.key.0, &pending.key.1);
                if !pending.answers(ticket)
                    || self.selection.pair() != Some((run_id.as_str(), table_name.as_str()))
                {
                    debug!(%ticket, run_id = %run_id, table_name = %table_name, "discarding stale table detail");
                    self.detail.pending_detail = Some(pending);
                    return Vec::new();
                }
                self.on_table_detail(result);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn on_overview(&mut self, result: Result<ApiReply, ApiError>) -> Vec<Outbound> {
        let overview = match result {
            Ok(ApiReply::DashboardOverview(overview)) => overview,
            Ok(other) => {
                self.fail_overview(unexpected_reply(&other, OVERVIEW_FAILED));
                return Vec::new();
            }
            Err(e) => {
                self.fail_overview(failure_message(&e, OVERVIEW_FAILED));
                return Vec::new();
            }
        };
        self.runs.refresh_error = None;

        let keep_current = self
            .selection
            .run_id()
            .is_some_and(|run_id| overview.contains_run(run_id));
        let next_run = if keep_current {
            None
        } else {
            overview.most_recent_run().map(|run| run.profiling_id.clone())
        };
        self.runs.overview = Fetch::Loaded(overview);

        match next_run {
            Some(run_id) => self.select_run(&run_id),
            None if keep_current => Vec::new(),
            None => {
                // No runs left: nothing may stay selected or on screen
                if self.selection.run_id().is_some() {
                    info!("run list is empty, clearing selection");
                }
                self.selection.clear();
                self.detail.reset();
                Vec::new()
            }
        }
    }

    /// Keep a previously loaded list and report the failure separately;
    /// with nothing loaded yet the panel shows the error
    fn fail_overview(&mut self, message: String) {
        if self.runs.overview.loaded().is_some() {
            self.runs.refresh_error = Some(message);
        } else {
            self.runs.overview = Fetch::Failed(message);
        }
    }

    fn on_table_names(&mut self, result: Result<ApiReply, ApiError>) -> Vec<Outbound> {
        let names: Vec<String> = match result {
            Ok(ApiReply::TableNames(items)) => items.into_iter().map(|i| i.table_name).collect(),
            Ok(other) => {
                self.fail_table_names(unexpected_reply(&other, TABLES_FAILED));
                return Vec::new();
            }
            Err(e) => {
                self.fail_table_names(failure_message(&e, TABLES_FAILED));
                return Vec::new();
            }
        };

        let Some(first) = names.first().cloned() else {
            self.detail.table_names = Fetch::Loaded(Vec::new());
            self.detail.detail = Fetch::Idle;
            self.apply_table(None);
            return Vec::new();
        };

        let target = match self.selection.table_name() {
            Some(current) if names.iter().any(|n| n == current) => current.to_string(),
            _ => first,
        };
        self.detail.table_names = Fetch::Loaded(names);

        if self.selection.table_name() == Some(target.as_str())
            && (self.detail.pending_detail.is_some() || self.detail.detail.loaded().is_some())
        {
            return Vec::new();
        }
        self.apply_table(Some(target))
    }

    fn fail_table_names(&mut self, message: String) {
        self.detail.table_names = Fetch::Failed(message);
        self.detail.detail = Fetch::Idle;
        self.apply_table(None);
    }

    fn on_table_detail(&mut self, result: Result<ApiReply, ApiError>) {
        self.detail.detail = match result {
            Ok(ApiReply::TableDetail(detail)) => Fetch::Loaded(detail),
            Ok(other) => Fetch::Failed(unexpected_reply(&other, DETAIL_FAILED)),
            Err(e) => Fetch::Failed(failure_message(&e, DETAIL_FAILED)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fetch::Ticket;
    use crate::model::profiling::TableNameItem;
    use crate::model::selection::SelectionPhase;
    use serde_json::json;

    fn overview(runs: serde_json::Value) -> DashboardOverview {
        serde_json::from_value(json!({ "recentRuns": runs })).unwrap()
    }

    fn two_runs() -> DashboardOverview {
        overview(json!([
            {"profiling_id": "r1", "profilingTime": "2024-05-02T10:00:00", "status": "Complete", "tables": 3},
            {"profiling_id": "r2", "profilingTime": "2024-05-01T10:00:00", "status": "Complete", "tables": 1},
        ]))
    }

    fn names(list: &[&str]) -> ApiReply {
        ApiReply::TableNames(
            list.iter()
                .map(|n| TableNameItem {
                    table_name: n.to_string(),
                })
                .collect(),
        )
    }

    fn detail(table: &str) -> ApiReply {
        ApiReply::TableDetail(TableDetail {
            table_name: table.to_string(),
            ..TableDetail::default()
        })
    }

    fn ok(outbound: &Outbound, reply: ApiReply) -> Completion {
        Completion {
            ticket: outbound.ticket,
            kind: outbound.request.kind(),
            result: Ok(reply),
        }
    }

    fn failed(outbound: &Outbound, message: &str) -> Completion {
        Completion {
            ticket: outbound.ticket,
            kind: outbound.request.kind(),
            result: Err(ApiError::Backend {
                status: 500,
                message: message.to_string(),
            }),
        }
    }

    fn single(mut outbound: Vec<Outbound>) -> Outbound {
        assert_eq!(outbound.len(), 1, "expected exactly one request: {:?}", outbound);
        outbound.remove(0)
    }

    /// Mount, deliver the overview and the table names; returns the detail request
    fn settle_on_r1(dashboard: &mut Dashboard, tables: &[&str]) -> Vec<Outbound> {
        let mount = single(dashboard.mount());
        let names_req = single(dashboard.complete(ok(&mount, ApiReply::DashboardOverview(two_runs()))));
        dashboard.complete(ok(&names_req, names(tables)))
    }

    #[test]
    fn test_mount_auto_selects_most_recent_and_fetches_its_tables() {
        let mut dashboard = Dashboard::new();
        let mount = single(dashboard.mount());
        assert_eq!(mount.request, ApiRequest::DashboardOverview);
        assert!(dashboard.runs.overview.is_loading());

        let next = single(dashboard.complete(ok(&mount, ApiReply::DashboardOverview(two_runs()))));
        assert_eq!(
            next.request,
            ApiRequest::TableNames {
                run_id: "r1".to_string()
            }
        );
        assert_eq!(dashboard.selection().run_id(), Some("r1"));
        assert_eq!(dashboard.selection().phase(), SelectionPhase::RunOnly);
        assert_eq!(dashboard.selected_run().map(|r| r.tables), Some(3));
    }

    #[test]
    fn test_empty_overview_selects_nothing() {
        let mut dashboard = Dashboard::new();
        let mount = single(dashboard.mount());
        let follow_up = dashboard.complete(ok(&mount, ApiReply::DashboardOverview(overview(json!([])))));
        assert!(follow_up.is_empty());
        assert_eq!(dashboard.selection().phase(), SelectionPhase::NoRun);
    }

    #[test]
    fn test_table_names_auto_select_first_and_fetch_detail() {
        let mut dashboard = Dashboard::new();
        let detail_req = single(settle_on_r1(&mut dashboard, &["orders", "customers"]));
        assert_eq!(
            detail_req.request,
            ApiRequest::TableDetail {
                run_id: "r1".to_string(),
                table_name: "orders".to_string()
            }
        );
        assert_eq!(dashboard.selection().pair(), Some(("r1", "orders")));

        dashboard.complete(ok(&detail_req, detail("orders")));
        assert_eq!(
            dashboard.detail.detail.loaded().map(|d| d.table_name.as_str()),
            Some("orders")
        );
    }

    #[test]
    fn test_empty_table_list_clears_selection_without_detail_fetch() {
        let mut dashboard = Dashboard::new();
        let follow_up = settle_on_r1(&mut dashboard, &[]);
        assert!(follow_up.is_empty());
        assert_eq!(dashboard.selection().run_id(), Some("r1"));
        assert_eq!(dashboard.selection().table_name(), None);
        assert_eq!(dashboard.detail.table_names, Fetch::Loaded(Vec::new()));
        assert_eq!(dashboard.detail.detail, Fetch::Idle);
    }

    #[test]
    fn test_out_of_order_table_lists_keep_latest_run() {
        let mut dashboard = Dashboard::new();
        let req_a = single(dashboard.select_run("A"));
        let req_b = single(dashboard.select_run("B"));

        // B resolves first, then A's late response arrives
        let detail_req = single(dashboard.complete(ok(&req_b, names(&["b_table"]))));
        let late = dashboard.complete(ok(&req_a, names(&["a_table"])));

        assert!(late.is_empty());
        assert_eq!(dashboard.selection().run_id(), Some("B"));
        assert_eq!(dashboard.selection().table_name(), Some("b_table"));
        assert_eq!(
            dashboard.detail.table_names,
            Fetch::Loaded(vec!["b_table".to_string()])
        );
        assert_eq!(
            detail_req.request,
            ApiRequest::TableDetail {
                run_id: "B".to_string(),
                table_name: "b_table".to_string()
            }
        );
    }

    #[test]
    fn test_late_list_for_superseded_run_is_ignored_before_current_arrives() {
        let mut dashboard = Dashboard::new();
        let req_a = single(dashboard.select_run("A"));
        let req_b = single(dashboard.select_run("B"));

        assert!(dashboard.complete(ok(&req_a, names(&["a_table"]))).is_empty());
        assert!(dashboard.detail.table_names.is_loading());
        assert_eq!(dashboard.selection().table_name(), None);

        single(dashboard.complete(ok(&req_b, names(&["b_table"]))));
        assert_eq!(dashboard.selection().table_name(), Some("b_table"));
    }

    #[test]
    fn test_stale_detail_response_is_discarded() {
        let mut dashboard = Dashboard::new();
        let first = single(settle_on_r1(&mut dashboard, &["orders", "customers"]));
        let second = single(dashboard.select_table("customers"));

        assert!(dashboard.complete(ok(&first, detail("orders"))).is_empty());
        assert!(dashboard.detail.detail.is_loading());

        dashboard.complete(ok(&second, detail("customers")));
        assert_eq!(
            dashboard.detail.detail.loaded().map(|d| d.table_name.as_str()),
            Some("customers")
        );
    }

    #[test]
    fn test_detail_for_previous_run_is_discarded() {
        let mut dashboard = Dashboard::new();
        let detail_req = single(settle_on_r1(&mut dashboard, &["orders"]));
        single(dashboard.select_run("r2"));

        dashboard.complete(ok(&detail_req, detail("orders")));
        assert_eq!(dashboard.detail.detail, Fetch::Idle);
        assert_eq!(dashboard.selection().table_name(), None);
    }

    #[test]
    fn test_table_selection_must_be_listed() {
        let mut dashboard = Dashboard::new();
        assert!(dashboard.select_table("orders").is_empty());
        assert_eq!(dashboard.selection().phase(), SelectionPhase::NoRun);

        settle_on_r1(&mut dashboard, &["orders"]);
        assert!(dashboard.select_table("ghost").is_empty());
        assert_eq!(dashboard.selection().table_name(), Some("orders"));
    }

    #[test]
    fn test_reselecting_loaded_table_does_not_refetch() {
        let mut dashboard = Dashboard::new();
        let req = single(settle_on_r1(&mut dashboard, &["orders"]));
        dashboard.complete(ok(&req, detail("orders")));
        assert!(dashboard.select_table("orders").is_empty());
    }

    #[test]
    fn test_failed_table_list_clears_list_and_selection() {
        let mut dashboard = Dashboard::new();
        let mount = single(dashboard.mount());
        let names_req = single(dashboard.complete(ok(&mount, ApiReply::DashboardOverview(two_runs()))));

        let follow_up = dashboard.complete(failed(&names_req, "run not found"));
        assert!(follow_up.is_empty());
        assert_eq!(dashboard.detail.table_names.error(), Some("run not found"));
        assert_eq!(dashboard.selection().table_name(), None);
        assert_eq!(dashboard.selection().run_id(), Some("r1"));
    }

    #[test]
    fn test_failed_detail_keeps_table_list() {
        let mut dashboard = Dashboard::new();
        let req = single(settle_on_r1(&mut dashboard, &["orders", "customers"]));
        dashboard.complete(failed(&req, "boom"));

        assert_eq!(dashboard.detail.detail.error(), Some("boom"));
        assert_eq!(
            dashboard.detail.table_names,
            Fetch::Loaded(vec!["orders".to_string(), "customers".to_string()])
        );
        assert_eq!(dashboard.selection().table_name(), Some("orders"));
    }

    #[test]
    fn test_failed_refresh_keeps_loaded_list_and_detail() {
        let mut dashboard = Dashboard::new();
        let req = single(settle_on_r1(&mut dashboard, &["orders"]));
        dashboard.complete(ok(&req, detail("orders")));

        let refresh = single(dashboard.refresh());
        assert!(dashboard.runs.overview.loaded().is_some());
        assert!(dashboard.is_loading());

        dashboard.complete(failed(&refresh, "backend down"));
        assert_eq!(dashboard.runs.overview.loaded(), Some(&two_runs()));
        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.take_refresh_error().as_deref(), Some("backend down"));
        assert_eq!(dashboard.take_refresh_error(), None);
        assert!(dashboard.detail.detail.loaded().is_some());
        assert_eq!(dashboard.selection().pair(), Some(("r1", "orders")));
    }

    #[test]
    fn test_failed_mount_shows_error_in_panel() {
        let mut dashboard = Dashboard::new();
        let mount = single(dashboard.mount());
        dashboard.complete(failed(&mount, "backend down"));
        assert_eq!(dashboard.runs.overview.error(), Some("backend down"));
        assert_eq!(dashboard.take_refresh_error(), None);
    }

    #[test]
    fn test_transport_failures_show_generic_text() {
        let mut dashboard = Dashboard::new();
        let mount = single(dashboard.mount());
        dashboard.complete(Completion {
            ticket: mount.ticket,
            kind: RequestKind::DashboardOverview,
            result: Err(ApiError::Transport(
                "error sending request for url (http://127.0.0.1:9/api/dashboard-overview)"
                    .to_string(),
            )),
        });
        assert_eq!(dashboard.runs.overview.error(), Some(OVERVIEW_FAILED));

        let names_req = single(dashboard.select_run("r1"));
        dashboard.complete(Completion {
            ticket: names_req.ticket,
            kind: RequestKind::TableNames,
            result: Err(ApiError::Decode("expected value at line 1 column 1".to_string())),
        });
        assert_eq!(dashboard.detail.table_names.error(), Some(TABLES_FAILED));
    }

    #[test]
    fn test_refresh_to_empty_list_clears_selection_and_detail() {
        let mut dashboard = Dashboard::new();
        let req = single(settle_on_r1(&mut dashboard, &["orders"]));
        dashboard.complete(ok(&req, detail("orders")));

        let refresh = single(dashboard.refresh());
        let follow_up =
            dashboard.complete(ok(&refresh, ApiReply::DashboardOverview(overview(json!([])))));
        assert!(follow_up.is_empty());
        assert_eq!(dashboard.selection().phase(), SelectionPhase::NoRun);
        assert_eq!(dashboard.detail.table_names, Fetch::Idle);
        assert_eq!(dashboard.detail.detail, Fetch::Idle);
        assert!(dashboard.selected_run().is_none());
    }

    #[test]
    fn test_refresh_keeps_listed_run() {
        let mut dashboard = Dashboard::new();
        settle_on_r1(&mut dashboard, &["orders"]);
        single(dashboard.select_run("r2"));

        let refresh = single(dashboard.refresh());
        let follow_up = dashboard.complete(ok(&refresh, ApiReply::DashboardOverview(two_runs())));
        assert!(follow_up.is_empty());
        assert_eq!(dashboard.selection().run_id(), Some("r2"));
    }

    #[test]
    fn test_refresh_reselects_when_run_disappears() {
        let mut dashboard = Dashboard::new();
        single(dashboard.select_run("gone"));

        let refresh = single(dashboard.refresh());
        let follow_up = single(dashboard.complete(ok(&refresh, ApiReply::DashboardOverview(two_runs()))));
        assert_eq!(dashboard.selection().run_id(), Some("r1"));
        assert_eq!(
            follow_up.request,
            ApiRequest::TableNames {
                run_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn test_superseded_overview_is_discarded() {
        let mut dashboard = Dashboard::new();
        let first = single(dashboard.mount());
        let second = single(dashboard.refresh());

        assert!(dashboard
            .complete(ok(&first, ApiReply::DashboardOverview(two_runs())))
            .is_empty());
        assert!(dashboard.runs.overview.is_loading());

        single(dashboard.complete(ok(&second, ApiReply::DashboardOverview(two_runs()))));
        assert!(dashboard.runs.overview.loaded().is_some());
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let mut dashboard = Dashboard::new();
        settle_on_r1(&mut dashboard, &["orders"]);
        let bogus = Completion {
            ticket: Ticket::next(),
            kind: RequestKind::TableDetail,
            result: Ok(detail("intruder")),
        };
        assert!(dashboard.complete(bogus).is_empty());
        assert!(dashboard.detail.detail.is_loading());
    }

    #[test]
    fn test_selection_always_member_of_latest_list() {
        let mut dashboard = Dashboard::new();
        let runs = ["A", "B", "C", "D"];
        let lists: [&[&str]; 4] = [&["a1", "a2"], &["b1"], &[], &["d1", "d2", "d3"]];

        let mut pending = Vec::new();
        for run in runs {
            pending.push(single(dashboard.select_run(run)));
        }
        // Deliver in reverse order; only D's list may stick
        for (req, list) in pending.iter().zip(lists.iter()).rev() {
            dashboard.complete(ok(req, names(list)));
            if let Some(table) = dashboard.selection().table_name() {
                let current = dashboard.detail.table_names.loaded().unwrap();
                assert!(current.iter().any(|n| n == table));
            }
        }
        assert_eq!(dashboard.selection().pair(), Some(("D", "d1")));
    }
}
