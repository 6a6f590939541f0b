//! Core domain types for DocHarvest crawls.

use serde::{Deserialize, Serialize};

/// Manifest category under which every visited URL is recorded.
///
/// The category name is part of the on-disk contract of `urls.json` and is
/// kept verbatim from the original rule files.
pub const VISITED_CATEGORY: &str = "urls_vistas";

// ---------------------------------------------------------------------------
// PageData
// ---------------------------------------------------------------------------

/// Everything extracted from one fetched HTML document.
///
/// Produced by `docharvest-markdown`, consumed by the page scorer and the
/// page writer. Read-only after construction.
#[derive(Debug, Clone)]
pub struct PageData {
    /// Canonical URL the page was fetched at.
    pub url: String,
    /// Main-content Markdown (possibly empty).
    pub markdown: String,
    /// Raw `href` values from the full document, duplicates preserved,
    /// not yet absolutised.
    pub links: Vec<String>,
    /// Page title (possibly empty).
    pub title: String,
}

// ---------------------------------------------------------------------------
// Crawl outcome
// ---------------------------------------------------------------------------

/// Summary of a completed crawl run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// URLs dequeued for processing, in dequeue order.
    pub seen: Vec<String>,
    /// URLs still queued when the run ended.
    pub to_visit: Vec<String>,
    /// URLs that failed link scoring, in rejection order.
    pub rejected: Vec<String>,
}

/// Result of a crawl run: either a summary, or the reason the seed URL
/// was turned away before any crawling happened.
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// The crawl ran; counts and leftovers are in the summary.
    Completed(CrawlSummary),
    /// The seed did not look like documentation; human-readable reason.
    SeedRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_with_contract_field_names() {
        let summary = CrawlSummary {
            seen: vec!["https://docs.example.com/".into()],
            to_visit: vec![],
            rejected: vec!["mailto://someone".into()],
        };

        let json = serde_json::to_string(&summary).expect("serialize");
        assert!(json.contains("\"seen\""));
        assert!(json.contains("\"to_visit\""));
        assert!(json.contains("\"rejected\""));
    }
}
