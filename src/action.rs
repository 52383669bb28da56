//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick: drains finished API calls
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move to next item in the focused list
    NextItem,
    /// Move to previous item in the focused list
    PrevItem,
    /// Jump to first item
    FirstItem,
    /// Jump to last item
    LastItem,
    /// Act on the highlighted item (select run / table)
    ActivateItem,
    /// Focus the next pane
    NextPane,
    /// Focus the previous pane
    PrevPane,
    /// Switch between Dashboard and Data Sources
    NextScreen,

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────────
    /// Re-fetch the dashboard overview
    RefreshDashboard,
    /// Select a profiling run by id
    SelectRun(String),
    /// Select a table of the current run
    SelectTable(String),
    /// Move the focused summary card left
    MoveCardLeft,
    /// Move the focused summary card right
    MoveCardRight,

    // ─────────────────────────────────────────────────────────────────────────
    // Data Sources
    // ─────────────────────────────────────────────────────────────────────────
    /// Re-fetch connections and home stats
    RefreshConnections,
    /// Open a connection's detail and table groups
    OpenConnection(i64),
    /// Load one table group's detail
    OpenTableGroup { connection_id: i64, group_id: String },
    /// A connection was created or updated
    ConnectionSaved { connection_id: i64, name: String },
    /// A table group was created
    TableGroupCreated { connection_id: i64 },
    DeleteConnection(i64),
    DeleteTableGroup { connection_id: i64, group_id: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Forms
    // ─────────────────────────────────────────────────────────────────────────
    /// Submit the connection form as a connection test
    TestConnection,
    /// Submit the connection form for create/update
    SaveConnection,
    /// Submit the table group form
    SaveTableGroup,
    /// Start profiling for the table group in the profiling dialog
    TriggerProfiling,
    /// Store (or clear, when empty) the bearer token
    SaveToken(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    /// Open run history overlay
    OpenHistory,
    OpenTokenDialog,
    OpenNewConnection,
    OpenEditConnection,
    OpenNewTableGroup,
    OpenTriggerProfiling,
    /// Ask before deleting the highlighted connection
    RequestDeleteConnection,
    /// Ask before deleting the highlighted table group
    RequestDeleteTableGroup,
    /// Load profile results for the run highlighted in history
    LoadProfileResults,
    /// Close the current modal
    CloseModal,
    /// Navigate up in modal
    ModalUp,
    /// Navigate down in modal
    ModalDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Switch between light and dark palettes
    ToggleTheme,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::ActivateItem => write!(f, "ActivateItem"),
            Action::NextPane => write!(f, "NextPane"),
            Action::PrevPane => write!(f, "PrevPane"),
            Action::NextScreen => write!(f, "NextScreen"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::RefreshDashboard => write!(f, "RefreshDashboard"),
            Action::SelectRun(id) => write!(f, "SelectRun({})", id),
            Action::SelectTable(name) => write!(f, "SelectTable({})", name),
            Action::MoveCardLeft => write!(f, "MoveCardLeft"),
            Action::MoveCardRight => write!(f, "MoveCardRight"),
            Action::RefreshConnections => write!(f, "RefreshConnections"),
            Action::OpenConnection(id) => write!(f, "OpenConnection({})", id),
            Action::OpenTableGroup {
                connection_id,
                group_id,
            } => write!(f, "OpenTableGroup({}, {})", connection_id, group_id),
            Action::ConnectionSaved {
                connection_id,
                name,
            } => write!(f, "ConnectionSaved({}, {})", connection_id, name),
            Action::TableGroupCreated { connection_id } => {
                write!(f, "TableGroupCreated({})", connection_id)
            }
            Action::DeleteConnection(id) => write!(f, "DeleteConnection({})", id),
            Action::DeleteTableGroup {
                connection_id,
                group_id,
            } => write!(f, "DeleteTableGroup({}, {})", connection_id, group_id),
            Action::TestConnection => write!(f, "TestConnection"),
            Action::SaveConnection => write!(f, "SaveConnection"),
            Action::SaveTableGroup => write!(f, "SaveTableGroup"),
            Action::TriggerProfiling => write!(f, "TriggerProfiling"),
            // Never print the token itself
            Action::SaveToken(_) => write!(f, "SaveToken(..)"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenHistory => write!(f, "OpenHistory"),
            Action::OpenTokenDialog => write!(f, "OpenTokenDialog"),
            Action::OpenNewConnection => write!(f, "OpenNewConnection"),
            Action::OpenEditConnection => write!(f, "OpenEditConnection"),
            Action::OpenNewTableGroup => write!(f, "OpenNewTableGroup"),
            Action::OpenTriggerProfiling => write!(f, "OpenTriggerProfiling"),
            Action::RequestDeleteConnection => write!(f, "RequestDeleteConnection"),
            Action::RequestDeleteTableGroup => write!(f, "RequestDeleteTableGroup"),
            Action::LoadProfileResults => write!(f, "LoadProfileResults"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
            Action::ToggleTheme => write!(f, "ToggleTheme"),
        }
    }
}
