//! External service interactions
//!
//! - `api` - blocking HTTP client for the profiling backend
//! - `worker` - runs API calls on background threads and hands back
//!   completions tagged with their request ticket

pub mod api;
pub mod worker;

pub use api::ApiClient;
pub use worker::{Completion, FetchWorker, Outbound};
