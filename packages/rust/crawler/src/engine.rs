//! The crawl engine: frontier loop, batch fetching, scoring, persistence.
//!
//! One cooperative loop drives everything. Within a batch, fetches run in
//! parallel; results are processed strictly in the order their URLs were
//! popped, which makes link expansion deterministic for a fixed set of
//! fetch outcomes.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use docharvest_shared::{
    CrawlOutcome, Result, RuleConfig, VISITED_CATEGORY, urls,
};
use docharvest_storage::CollectionStore;

use crate::browser::BrowserPage;
use crate::fetcher::{Fetcher, pick_user_agent};
use crate::frontier::Frontier;
use crate::validator::Validator;

// ---------------------------------------------------------------------------
// Parameters and progress
// ---------------------------------------------------------------------------

/// Everything one crawl run needs to know.
#[derive(Debug, Clone)]
pub struct CrawlParams {
    /// Collection the output lands in (`data/collections/<name>/`).
    pub collection: String,
    /// Seed URL, with or without a scheme.
    pub seed_url: String,
    /// Requested documentation version, e.g. `3.11`.
    pub version: Option<String>,
    /// Score pages and expand links. When false, every fetched page is
    /// saved as-is and nothing new is discovered.
    pub follow_links: bool,
    /// Upper bound on concurrent fetches per batch.
    pub batch_size: usize,
    /// Page budget. `1` is the crawl-everything mode: the saved-page
    /// counter stays frozen and the run only stops when the frontier
    /// drains.
    pub depth_budget: usize,
    /// Launch the headless-browser fallback for this run.
    pub use_browser: bool,
}

impl CrawlParams {
    /// Params with the standard defaults for a collection + seed pair.
    pub fn new(collection: impl Into<String>, seed_url: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            seed_url: seed_url.into(),
            version: None,
            follow_links: true,
            batch_size: 5,
            depth_budget: 1,
            use_browser: true,
        }
    }
}

/// Progress callback for long-running crawls.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called per processed batch slot.
    fn page_fetched(&self, url: &str, current: usize, batch: usize);
    /// Called after a page file is written.
    fn page_saved(&self, file_name: &str, total: usize);
}

/// No-op reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _url: &str, _current: usize, _batch: usize) {}
    fn page_saved(&self, _file_name: &str, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the rule config and the output store for one or more runs.
pub struct CrawlEngine {
    rules: RuleConfig,
    store: CollectionStore,
    /// Test hook: keep plain-HTTP canonical forms so mock servers stay
    /// reachable. Production canonicalisation upgrades http to https.
    keep_http: bool,
}

impl CrawlEngine {
    /// Create an engine over a rule config and a collection store.
    pub fn new(rules: RuleConfig, store: CollectionStore) -> Self {
        Self {
            rules,
            store,
            keep_http: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn keep_plain_http(mut self) -> Self {
        self.keep_http = true;
        self
    }

    fn canon(&self, url: &str) -> Option<String> {
        if self.keep_http {
            urls::canonicalize_keep_scheme(url)
        } else {
            urls::canonicalize(url)
        }
    }

    /// Run one crawl.
    ///
    /// Returns `CrawlOutcome::SeedRejected` with a human-readable reason
    /// when the seed does not look like documentation; otherwise crawls to
    /// the page budget (or exhaustion) and returns the summary.
    #[instrument(skip_all, fields(collection = %params.collection, seed = %params.seed_url))]
    pub async fn run(
        &self,
        params: &CrawlParams,
        progress: &dyn ProgressReporter,
    ) -> Result<CrawlOutcome> {
        let user_agent = pick_user_agent();
        debug!(user_agent, "user agent for this run");

        let seed = urls::ensure_scheme(params.seed_url.trim());
        let Some(seed) = self.canon(&seed) else {
            return Ok(CrawlOutcome::SeedRejected(format!(
                "URL inválida: '{}'",
                params.seed_url
            )));
        };

        let fetcher = Fetcher::new(user_agent)?;
        let validator = Validator::new(&self.rules, params.version.as_deref());

        progress.phase("Validating seed URL");
        let verdict = validator.validate_seed(&seed, &fetcher).await;
        if !verdict.accepted {
            info!(reason = %verdict.reason, "seed rejected");
            return Ok(CrawlOutcome::SeedRejected(format!(
                "URL não parece ser de uma documentação: {}",
                verdict.reason
            )));
        }
        info!(seed = %seed, reason = %verdict.reason, "seed accepted");

        let mut manifest = self.store.load_manifest(&params.collection);
        let persisted: HashSet<String> =
            manifest.urls(VISITED_CATEGORY).iter().cloned().collect();
        if !persisted.is_empty() {
            info!(count = persisted.len(), "previously visited URLs loaded");
        }

        let mut frontier = Frontier::new(seed.clone(), persisted);
        manifest.record(VISITED_CATEGORY, &seed);

        let browser = if params.use_browser {
            progress.phase("Starting browser fallback");
            match BrowserPage::launch().await {
                Ok(browser) => Some(browser),
                Err(e) => {
                    warn!(error = %e, "browser unavailable, continuing with HTTP only");
                    None
                }
            }
        } else {
            None
        };

        progress.phase("Crawling");
        let batch_size = params.batch_size.max(1);
        let mut pages_saved = 0usize;
        let mut written = 0usize;

        while pages_saved < params.depth_budget && !frontier.is_empty() {
            let batch = frontier.next_batch(batch_size);
            if batch.is_empty() {
                debug!("no unseen URLs left in the queue");
                break;
            }

            let results = fetcher.fetch_many(&batch, browser.as_ref()).await;

            for (index, (url, result)) in batch.iter().zip(results).enumerate() {
                if pages_saved >= params.depth_budget {
                    break;
                }
                progress.page_fetched(url, index + 1, batch.len());

                let html = match result {
                    Ok(html) if !html.is_empty() => html,
                    Ok(_) => {
                        warn!(url, "empty response, skipping");
                        continue;
                    }
                    Err(e) => {
                        warn!(url, error = %e, "fetch failed, skipping");
                        continue;
                    }
                };

                let page = docharvest_markdown::extract(&html, url);

                if params.follow_links {
                    let page_verdict = validator.score_page(&page);

                    debug!(url, links = page.links.len(), "expanding outbound links");
                    for href in &page.links {
                        if href.is_empty() {
                            continue;
                        }
                        let Some(absolute) = urls::absolutize(url, href) else {
                            debug!(url, href, "unresolvable href, skipping");
                            continue;
                        };
                        let Some(candidate) = self.canon(&absolute) else {
                            continue;
                        };
                        if frontier.known(&candidate) {
                            continue;
                        }

                        let link_verdict = validator.score_link(url, &candidate);
                        if link_verdict.accepted {
                            debug!(link = %candidate, "link queued");
                            frontier.enqueue(candidate);
                        } else {
                            debug!(link = %candidate, reason = %link_verdict.reason, "link rejected");
                            frontier.reject(candidate);
                        }
                    }

                    if !page_verdict.accepted {
                        info!(url, reason = %page_verdict.reason, "page rejected, not saving");
                        continue;
                    }
                }

                let Some(file_name) = urls::file_name_for(url) else {
                    warn!(url, "cannot derive a file name, skipping save");
                    continue;
                };

                manifest.record(VISITED_CATEGORY, url);
                match self.store.write_page(&params.collection, &file_name, &page.markdown) {
                    Ok(path) => debug!(?path, "page saved"),
                    Err(e) => warn!(url, error = %e, "page write failed, continuing"),
                }

                written += 1;
                if params.depth_budget != 1 {
                    pages_saved += 1;
                }
                progress.page_saved(&file_name, written);
            }
        }

        progress.phase("Saving manifest");
        if let Err(e) = self.store.save_manifest(&params.collection, &manifest) {
            warn!(error = %e, "manifest save failed, crawl results still returned");
        }

        if let Some(browser) = browser {
            browser.close().await;
        }

        let summary = frontier.into_summary();
        info!(
            seen = summary.seen.len(),
            queued = summary.to_visit.len(),
            rejected = summary.rejected.len(),
            written,
            "crawl finished"
        );
        Ok(CrawlOutcome::Completed(summary))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_rules() -> RuleConfig {
        let json = r#"{
            "protocolos_invalidos": ["mailto:", "javascript:"],
            "prefixos_permitidos": ["docs"],
            "extensoes_invalidas": [".pdf", ".zip"],
            "segmentos_de_caminho_invalidos": ["checkout"]
        }"#;
        serde_json::from_str(json).expect("rules")
    }

    fn scratch_store(tag: &str) -> (CollectionStore, PathBuf) {
        let root = std::env::temp_dir().join(format!(
            "docharvest-engine-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        (CollectionStore::new(&root), root)
    }

    fn docs_html(title: &str, body_extra: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head><body><main>\
             <h1>{title}</h1>\
             <p>{}</p>\
             <pre><code>example code block for this page</code></pre>\
             {body_extra}\
             </main></body></html>",
            "Long-form explanation of the topic at hand. ".repeat(10)
        )
    }

    async fn serve(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(url_path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
            .mount(server)
            .await;
    }

    fn engine(store: CollectionStore) -> CrawlEngine {
        CrawlEngine::new(test_rules(), store).keep_plain_http()
    }

    fn params(collection: &str, seed: &str) -> CrawlParams {
        let mut params = CrawlParams::new(collection, seed);
        params.use_browser = false;
        params
    }

    #[tokio::test]
    async fn crawl_to_exhaustion_saves_linked_pages() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/docs/",
            docs_html(
                "Index",
                r#"<a href="/docs/install.html">Install</a>
                   <a href="/docs/usage.html">Usage</a>
                   <a href="mailto:team@example.com">Mail us</a>"#,
            ),
        )
        .await;
        serve(&server, "/docs/install.html", docs_html("Install", "")).await;
        serve(&server, "/docs/usage.html", docs_html("Usage", "")).await;

        let (store, root) = scratch_store("exhaustion");
        let seed = format!("{}/docs/", server.uri());
        // depth_budget 1 freezes the counter: everything reachable is saved.
        let outcome = engine(store.clone())
            .run(&params("py", &seed), &SilentProgress)
            .await
            .expect("run");

        let CrawlOutcome::Completed(summary) = outcome else {
            panic!("expected a completed crawl");
        };

        assert_eq!(summary.seen.len(), 3);
        assert_eq!(summary.seen[0], seed);
        assert!(summary.to_visit.is_empty());
        // The mailto link was scored, rejected, and recorded.
        assert_eq!(summary.rejected.len(), 1);
        assert!(summary.rejected[0].starts_with("mailto:"));

        // Markdown files and the manifest are on disk.
        let dir = store.collection_dir("py");
        assert!(dir.join("urls.json").exists());
        let pages: Vec<_> = std::fs::read_dir(&dir)
            .expect("collection dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .collect();
        assert_eq!(pages.len(), 3);

        let manifest = store.load_manifest("py");
        assert_eq!(manifest.urls(VISITED_CATEGORY).len(), 3);
        assert_eq!(manifest.urls(VISITED_CATEGORY)[0], seed);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn page_budget_stops_the_run() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/docs/",
            docs_html(
                "Index",
                r#"<a href="/docs/a.html">A</a>
                   <a href="/docs/b.html">B</a>
                   <a href="/docs/c.html">C</a>"#,
            ),
        )
        .await;
        for route in ["/docs/a.html", "/docs/b.html", "/docs/c.html"] {
            serve(&server, route, docs_html("Leaf", "")).await;
        }

        let (store, root) = scratch_store("budget");
        let mut p = params("budgeted", &format!("{}/docs/", server.uri()));
        p.depth_budget = 2;
        p.batch_size = 2;

        let outcome = engine(store.clone())
            .run(&p, &SilentProgress)
            .await
            .expect("run");
        let CrawlOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };

        let manifest = store.load_manifest("budgeted");
        assert_eq!(manifest.urls(VISITED_CATEGORY).len(), 2);
        // Unfetched discoveries stay queued for a later run.
        assert!(!summary.to_visit.is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn no_follow_saves_unconditionally_and_rejects_nothing() {
        let server = MockServer::start().await;
        // Deliberately thin page: would fail the page scorer.
        serve(
            &server,
            "/docs/",
            "<html><head><title>Thin</title></head><body><main><p>tiny</p>\
             <a href=\"/docs/other.html\">Other</a></main></body></html>"
                .to_string(),
        )
        .await;

        let (store, root) = scratch_store("nofollow");
        let mut p = params("plain", &format!("{}/docs/", server.uri()));
        p.follow_links = false;

        let outcome = engine(store.clone())
            .run(&p, &SilentProgress)
            .await
            .expect("run");
        let CrawlOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };

        // No discovery happened at all.
        assert_eq!(summary.seen.len(), 1);
        assert!(summary.rejected.is_empty());
        assert!(summary.to_visit.is_empty());
        // And the page was saved despite being thin.
        assert_eq!(store.load_manifest("plain").urls(VISITED_CATEGORY).len(), 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn prior_manifest_urls_are_not_requeued() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/docs/",
            docs_html("Index", r#"<a href="/docs/old.html">Old</a>"#),
        )
        .await;

        let (store, root) = scratch_store("persisted");
        let seed = format!("{}/docs/", server.uri());
        let old = format!("{}/docs/old.html", server.uri());

        let mut manifest = docharvest_storage::Manifest::default();
        manifest.record(VISITED_CATEGORY, &old);
        store.save_manifest("resume", &manifest).expect("seed manifest");

        let outcome = engine(store.clone())
            .run(&params("resume", &seed), &SilentProgress)
            .await
            .expect("run");
        let CrawlOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };

        // The previously recorded URL was neither fetched nor rejected.
        assert_eq!(summary.seen, vec![seed]);
        assert!(summary.rejected.is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn rejected_page_is_not_saved_but_links_are_expanded() {
        let server = MockServer::start().await;
        // Page with plenty of links but storefront content.
        serve(
            &server,
            "/docs/",
            format!(
                "<html><head><title>Promo</title></head><body><main>\
                 <p>compre agora: {}</p>\
                 <a href=\"/docs/real.html\">Real docs</a>\
                 </main></body></html>",
                "oferta imperdível ".repeat(30)
            ),
        )
        .await;
        serve(&server, "/docs/real.html", docs_html("Real", "")).await;

        let (store, root) = scratch_store("rejected-page");
        let seed = format!("{}/docs/", server.uri());
        let outcome = engine(store.clone())
            .run(&params("promo", &seed), &SilentProgress)
            .await
            .expect("run");
        let CrawlOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };

        // Both pages were visited; only the real one was recorded/saved.
        assert_eq!(summary.seen.len(), 2);
        let manifest = store.load_manifest("promo");
        let visited = manifest.urls(VISITED_CATEGORY);
        // Seed is recorded up front by contract, plus the saved page.
        assert!(visited.contains(&seed));
        assert!(visited.iter().any(|u| u.ends_with("/docs/real.html")));

        let dir = store.collection_dir("promo");
        let saved: Vec<_> = std::fs::read_dir(&dir)
            .expect("dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .collect();
        assert_eq!(saved.len(), 1, "only the accepted page is written");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn non_docs_seed_is_rejected_with_reason() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/shop",
            "<html><head><title>Mega Loja</title></head><body>\
             <h1>Ofertas</h1><p>Veja os preços no carrinho de compras.</p>\
             </body></html>"
                .to_string(),
        )
        .await;

        let (store, root) = scratch_store("badseed");
        let outcome = engine(store)
            .run(&params("shop", &format!("{}/shop", server.uri())), &SilentProgress)
            .await
            .expect("run");

        match outcome {
            CrawlOutcome::SeedRejected(reason) => {
                assert!(reason.starts_with("URL não parece ser de uma documentação"));
            }
            CrawlOutcome::Completed(_) => panic!("seed should have been rejected"),
        }

        let _ = std::fs::remove_dir_all(&root);
    }
}
