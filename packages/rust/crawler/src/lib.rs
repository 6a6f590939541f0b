//! Crawl engine, frontier, dual-transport fetcher, and the three
//! validators (seed, link, page).
//!
//! The engine is the only writer of the frontier and the manifest; the
//! fetcher turns network failures into per-URL values; the validators are
//! pure scoring over a config built once per run.

pub mod browser;
pub mod engine;
pub mod fetcher;
pub mod frontier;
pub mod validator;

pub use browser::BrowserPage;
pub use engine::{CrawlEngine, CrawlParams, ProgressReporter, SilentProgress};
pub use fetcher::{FetchError, Fetcher, pick_user_agent};
pub use frontier::Frontier;
pub use validator::{
    DocVersion, InvalidVersion, Validator, Verdict, check_compatibility, extract_version,
};
