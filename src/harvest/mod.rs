//! Query execution: one [`SourceDriver`] per query, fanned out by the
//! [`Orchestrator`]. All HTTP goes through the shared [`crate::fetcher::Fetcher`],
//! so the request bound, proxy rotation and run signal apply everywhere.

mod driver;
mod orchestrator;

pub use driver::{SourceDriver, DEFAULT_MAX_PAGES};
pub use orchestrator::Orchestrator;
