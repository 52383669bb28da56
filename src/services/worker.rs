//! Background fetch worker
//!
//! Each outbound request runs on its own thread against a cloned `ApiClient`
//! and reports back through an mpsc channel. The UI thread drains completed
//! calls on `Tick` without ever blocking.

use crate::model::connection::{
    Connection, ConnectionRequest, ConnectionUpdate, MessageResponse, TestConnectionResult,
};
use crate::model::fetch::Ticket;
use crate::model::profiling::{
    DashboardOverview, DashboardStats, LatestProfilingRun, ProfileResult, TableDetail,
    TableNameItem,
};
use crate::model::table_group::{NewTableGroup, TableGroup, TriggerProfiling};
use crate::services::api::{ApiClient, ApiError};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{debug, warn};

/// Every API operation the UI can ask for
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    DashboardOverview,
    TableNames { run_id: String },
    TableDetail { run_id: String, table_name: String },
    ListConnections,
    GetConnection { id: i64 },
    TestConnection(ConnectionRequest),
    CreateConnection(ConnectionRequest),
    UpdateConnection { id: i64, update: ConnectionUpdate },
    DeleteConnection { id: i64 },
    ListTableGroups { connection_id: i64 },
    GetTableGroup { connection_id: i64, group_id: String },
    CreateTableGroup { connection_id: i64, group: NewTableGroup },
    DeleteTableGroup { connection_id: i64, group_id: String },
    TriggerProfiling(TriggerProfiling),
    DashboardStats,
    LatestProfilingRun,
    ProfileResults { connection_id: i64, group_id: String, run_id: String },
}

/// Discriminant of `ApiRequest`, carried with the completion so that failures
/// can be routed to the panel that asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    DashboardOverview,
    TableNames,
    TableDetail,
    ListConnections,
    GetConnection,
    TestConnection,
    CreateConnection,
    UpdateConnection,
    DeleteConnection,
    ListTableGroups,
    GetTableGroup,
    CreateTableGroup,
    DeleteTableGroup,
    TriggerProfiling,
    DashboardStats,
    LatestProfilingRun,
    ProfileResults,
}

/// Decoded success payloads
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    DashboardOverview(DashboardOverview),
    TableNames(Vec<TableNameItem>),
    TableDetail(TableDetail),
    Connections(Vec<Connection>),
    Connection(Connection),
    ConnectionTested(TestConnectionResult),
    Acknowledged(MessageResponse),
    TableGroups(Vec<TableGroup>),
    TableGroup(TableGroup),
    DashboardStats(DashboardStats),
    LatestProfilingRun(LatestProfilingRun),
    ProfileResults(Vec<ProfileResult>),
}

impl ApiRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            ApiRequest::DashboardOverview => RequestKind::DashboardOverview,
            ApiRequest::TableNames { .. } => RequestKind::TableNames,
            ApiRequest::TableDetail { .. } => RequestKind::TableDetail,
            ApiRequest::ListConnections => RequestKind::ListConnections,
            ApiRequest::GetConnection { .. } => RequestKind::GetConnection,
            ApiRequest::TestConnection(_) => RequestKind::TestConnection,
            ApiRequest::CreateConnection(_) => RequestKind::CreateConnection,
            ApiRequest::UpdateConnection { .. } => RequestKind::UpdateConnection,
            ApiRequest::DeleteConnection { .. } => RequestKind::DeleteConnection,
            ApiRequest::ListTableGroups { .. } => RequestKind::ListTableGroups,
            ApiRequest::GetTableGroup { .. } => RequestKind::GetTableGroup,
            ApiRequest::CreateTableGroup { .. } => RequestKind::CreateTableGroup,
            ApiRequest::DeleteTableGroup { .. } => RequestKind::DeleteTableGroup,
            ApiRequest::TriggerProfiling(_) => RequestKind::TriggerProfiling,
            ApiRequest::DashboardStats => RequestKind::DashboardStats,
            ApiRequest::LatestProfilingRun => RequestKind::LatestProfilingRun,
            ApiRequest::ProfileResults { .. } => RequestKind::ProfileResults,
        }
    }

    /// Perform the call. Blocks; only ever run on a worker thread.
    pub fn execute(&self, api: &ApiClient) -> Result<ApiReply, ApiError> {
        let reply = match self {
            ApiRequest::DashboardOverview => ApiReply::DashboardOverview(api.dashboard_overview()?),
            ApiRequest::TableNames { run_id } => ApiReply::TableNames(api.table_names(run_id)?),
            ApiRequest::TableDetail { run_id, table_name } => {
                ApiReply::TableDetail(api.table_detail(run_id, table_name)?)
            }
            ApiRequest::ListConnections => ApiReply::Connections(api.list_connections()?),
            ApiRequest::GetConnection { id } => ApiReply::Connection(api.get_connection(*id)?),
            ApiRequest::TestConnection(request) => {
                ApiReply::ConnectionTested(api.test_connection(request)?)
            }
            ApiRequest::CreateConnection(request) => {
                ApiReply::Connection(api.create_connection(request)?)
            }
            ApiRequest::UpdateConnection { id, update } => {
                ApiReply::Connection(api.update_connection(*id, update)?)
            }
            ApiRequest::DeleteConnection { id } => {
                ApiReply::Acknowledged(api.delete_connection(*id)?)
            }
            ApiRequest::ListTableGroups { connection_id } => {
                ApiReply::TableGroups(api.list_table_groups(*connection_id)?)
            }
            ApiRequest::GetTableGroup {
                connection_id,
                group_id,
            } => ApiReply::TableGroup(api.get_table_group(*connection_id, group_id)?),
            ApiRequest::CreateTableGroup {
                connection_id,
                group,
            } => ApiReply::TableGroup(api.create_table_group(*connection_id, group)?),
            ApiRequest::DeleteTableGroup {
                connection_id,
                group_id,
            } => ApiReply::Acknowledged(api.delete_table_group(*connection_id, group_id)?),
            ApiRequest::TriggerProfiling(request) => {
                ApiReply::Acknowledged(api.trigger_profiling(request)?)
            }
            ApiRequest::DashboardStats => ApiReply::DashboardStats(api.dashboard_stats()?),
            ApiRequest::LatestProfilingRun => {
                ApiReply::LatestProfilingRun(api.latest_profiling_run()?)
            }
            ApiRequest::ProfileResults {
                connection_id,
                group_id,
                run_id,
            } => ApiReply::ProfileResults(api.profile_results(*connection_id, group_id, run_id)?),
        };
        Ok(reply)
    }
}

/// A request ready to be dispatched, tagged with the ticket its owner expects
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub ticket: Ticket,
    pub request: ApiRequest,
}

impl Outbound {
    pub fn new(ticket: Ticket, request: ApiRequest) -> Self {
        Self { ticket, request }
    }
}

/// A finished call as delivered back to the UI thread
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub kind: RequestKind,
    pub result: Result<ApiReply, ApiError>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Worker
// ═══════════════════════════════════════════════════════════════════════════════

pub struct FetchWorker {
    api: ApiClient,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    in_flight: usize,
}

impl FetchWorker {
    pub fn new(api: ApiClient) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Start a request on a background thread
    pub fn dispatch(&mut self, outbound: Outbound) {
        let Outbound { ticket, request } = outbound;
        let kind = request.kind();
        let api = self.api.clone();
        let tx = self.sender.clone();
        debug!(%ticket, ?kind, "dispatching request");

        self.in_flight += 1;
        thread::spawn(move || {
            let result = request.execute(&api);
            let _ = tx.send(Completion {
                ticket,
                kind,
                result,
            });
        });
    }

    /// Drain every completion that has arrived so far
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if let Err(e) = &completion.result {
                        warn!(ticket = %completion.ticket, kind = ?completion.kind, error = %e, "request failed");
                    }
                    completions.push(completion);
                }
                Err(TryRecvError::Empty) => break,
                // We hold a sender ourselves, so this only happens on teardown
                Err(TryRecvError::Disconnected) => break,
            }
        }
        completions
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}
