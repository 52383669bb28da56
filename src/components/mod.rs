//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod charts;
pub mod confirm_dialog;
pub mod connection_form;
pub mod data_sources;
pub mod form;
pub mod help_dialog;
pub mod history_dialog;
pub mod layout;
pub mod profiling_dialog;
pub mod run_detail;
pub mod run_list;
pub mod table_group_form;
pub mod text;
pub mod theme;
pub mod token_dialog;

pub use confirm_dialog::ConfirmDialog;
pub use connection_form::ConnectionForm;
pub use data_sources::DataSourcesComponent;
pub use help_dialog::HelpDialog;
pub use history_dialog::HistoryDialog;
pub use layout::{calculate_dashboard_layout, calculate_screen_layout};
pub use profiling_dialog::ProfilingDialog;
pub use run_detail::RunDetailComponent;
pub use run_list::RunListComponent;
pub use table_group_form::TableGroupForm;
pub use theme::Palette;
pub use token_dialog::TokenDialog;
