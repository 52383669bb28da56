//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `Dashboard` - run/table selection and its cascading fetches
//! - API payload types for connections, table groups and profiling
//! - `Fetch`/`Ticket` - per-panel request state
//! - `ModalStack` - Modal overlay management

pub mod connection;
pub mod dashboard;
pub mod fetch;
pub mod modal;
pub mod profiling;
pub mod selection;
pub mod table_group;
pub mod timestamp;
pub mod ui;

pub use dashboard::Dashboard;
pub use fetch::{Fetch, Ticket};
pub use modal::{Modal, ModalStack};
pub use ui::{Pane, Screen};
