//! Shared types, error model, and configuration for DocHarvest.
//!
//! This crate is the foundation depended on by all other DocHarvest crates.
//! It provides:
//! - [`DocHarvestError`] — the unified error type
//! - Domain types ([`PageData`], [`CrawlSummary`], [`CrawlOutcome`])
//! - Rule configuration ([`RuleConfig`], rule-file loading)
//! - URL canonicalisation and file-name derivation

pub mod config;
pub mod error;
pub mod types;
pub mod urls;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    Penalties, RuleConfig, ScoreConfig, Weights, RULES_FILE_NAME, default_rules_json, load_rules,
};
pub use error::{DocHarvestError, Result};
pub use types::{CrawlOutcome, CrawlSummary, PageData, VISITED_CATEGORY};
