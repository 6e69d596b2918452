//! # Gleaner
//!
//! A concurrent harvester for online business directories.
//!
//! ## Architecture
//!
//! ```text
//! Query → Orchestrator → SourceDriver → Fetcher → Source (parse) → Record → CSV
//! ```
//!
//! Every HTTP request of a batch shares one semaphore, one proxy rotation and
//! one run signal, so the whole batch stays within a fixed request budget and
//! stops cooperatively when the signal is cleared.
//!
//! ## Quick Start
//!
//! ```bash
//! # List the supported directories
//! gleaner sources
//!
//! # Canada only accepts a fixed set of locations
//! gleaner locations canada
//!
//! # Two queries against yellowpages.com, written to datafile.csv
//! gleaner scrape -s usa -k "coffee,bakery" -l "Austin,Dallas"
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Records, previews and queries
//! - [`fetcher`]: Retrying HTTP with proxies, a shared bound and a run signal
//! - [`sources`]: Per-directory request building and page parsing
//! - [`harvest`]: Query execution and fan-out
//! - [`export`]: CSV output
//! - [`progress`]: Progress reporting

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the semaphore,
/// proxy pool, run signal, fetcher and progress counter of one batch.
pub mod app;

/// Command-line interface using clap.
///
/// - `sources` - List the supported directories
/// - `locations <source>` - Show a directory's fixed locations
/// - `scrape -s <source> -k <keywords> -l <locations>` - Harvest to CSV
pub mod cli;

/// Configuration loaded from `~/.config/gleaner/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Record`](domain::Record): One normalized business listing
/// - [`Preview`](domain::Preview): Link to a detail page
/// - [`Query`](domain::Query): Keyword and location pair
pub mod domain;

/// CSV export of harvested records.
pub mod export;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait returning a body or an empty string
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation with retries
/// - [`ProxyPool`](fetcher::ProxyPool): Round-robin proxy rotation
/// - [`RunSignal`](fetcher::RunSignal): Shared cooperative stop flag
pub mod fetcher;

/// Query execution.
///
/// - [`SourceDriver`](harvest::SourceDriver): One query, all pages and details
/// - [`Orchestrator`](harvest::Orchestrator): One task per query, aggregated
pub mod harvest;

/// Progress reporting for confirmed records.
pub mod progress;

/// Supported directory sites.
pub mod sources;
