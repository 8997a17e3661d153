//! State module for tracking audit progress
//!
//! # Components
//!
//! - `RunState`: lifecycle of one audit run (pending, in progress, done)
//! - `PageOutcome`: how each dequeued URL ended up in the report

mod page_state;
mod run_state;

pub use page_state::PageOutcome;
pub use run_state::RunState;
