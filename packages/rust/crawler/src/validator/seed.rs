//! Seed validator: the one-shot "is this documentation at all?" decision.
//!
//! Two fast-path rules run without touching the network (docs-keyword
//! subdomain, docs-keyword path prefix). Only when both miss is the page
//! fetched and probed for documentation signals.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetcher::Fetcher;

use super::{Validator, Verdict};

/// Storefront/community phrases whose absence counts as a docs signal.
const SEED_COMMERCIAL_PHRASES: &[&str] =
    &["carrinho de compras", "fórum", "blog", "loja", "preços"];

/// Signals needed for the content probe to accept.
const PROBE_ACCEPT_POINTS: usize = 2;

impl Validator {
    /// Decide whether `url` points at documentation.
    ///
    /// The network probe uses the run's HTTP fetcher (and thus its
    /// User-Agent); the browser fallback is never involved here.
    pub async fn validate_seed(&self, url: &str, fetcher: &Fetcher) -> Verdict {
        let Ok(parsed) = Url::parse(url) else {
            return Verdict::reject(format!("Erro na validação: URL inválida '{url}'"));
        };
        let host = parsed.host_str().unwrap_or_default();
        let path = parsed.path();

        // Rule 1: first host label is a docs keyword (docs.python.org).
        let first_label = host.split('.').next().unwrap_or_default();
        if self
            .rules()
            .segmentos_de_url_valida
            .iter()
            .any(|keyword| keyword == first_label)
        {
            return Verdict::accept(format!("URL aprovada pelo subdomínio '{first_label}'."));
        }

        // Rule 2: path starts with /<keyword>/.
        if self
            .rules()
            .segmentos_de_url_valida
            .iter()
            .any(|keyword| path.starts_with(&format!("/{keyword}/")))
        {
            return Verdict::accept("URL aprovada pelo prefixo do caminho.");
        }

        // Rule 3: fetch and probe the content.
        let html = match fetcher.fetch_http(url).await {
            Ok(html) => html,
            Err(e) => {
                return Verdict::reject(format!(
                    "Não foi possível buscar a URL inicial para validação: {e}"
                ));
            }
        };

        let points = self.probe_points(&html);
        debug!(url, points, "seed content probe");

        if points >= PROBE_ACCEPT_POINTS {
            Verdict::accept("URL aprovada pela análise de conteúdo")
        } else {
            Verdict::reject("URL rejeitada. Não é uma documentação")
        }
    }

    /// One point per documentation signal found in the page.
    fn probe_points(&self, html: &str) -> usize {
        let doc = Html::parse_document(html);
        let mut points = 0;

        if self.matches_docs_keywords(&first_text(&doc, "title")) {
            points += 1;
        }
        if self.matches_docs_keywords(&first_text(&doc, "h1")) {
            points += 1;
        }
        if has_element(&doc, "pre") {
            points += 1;
        }

        let text = doc.root_element().text().collect::<String>().to_lowercase();
        if !SEED_COMMERCIAL_PHRASES
            .iter()
            .any(|phrase| text.contains(phrase))
        {
            points += 1;
        }

        points
    }
}

fn first_text(doc: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .unwrap_or_default()
}

fn has_element(doc: &Html, selector: &str) -> bool {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(|_| ()))
        .is_some()
}
