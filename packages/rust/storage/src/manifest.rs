//! Per-collection URL manifest (`urls.json`).
//!
//! The manifest maps a category name (e.g. `urls_vistas`) to an ordered,
//! duplicate-free list of URLs. It is what lets a later run skip pages a
//! previous run already handled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// In-memory form of `urls.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    categories: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    /// Parse a manifest from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Record a URL under a category. Exact duplicates are ignored;
    /// insertion order is preserved.
    pub fn record(&mut self, category: &str, url: &str) {
        let urls = self.categories.entry(category.to_string()).or_default();
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    /// URLs recorded under a category, in insertion order.
    pub fn urls(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when no category holds any URL.
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }

    /// Pretty-printed JSON for persistence.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.categories)
    }
}
