//! HTML → [`PageData`] extraction.
//!
//! Three independent things come out of one fetched document:
//! - the main-content Markdown (readability-style container selection,
//!   `htmd` conversion, then a cleanup pipeline),
//! - the page title (`<title>`, falling back to the first `<h1>`),
//! - every raw `<a href>` value from the **full** document, in document
//!   order, duplicates preserved and not yet absolutised — link hygiene is
//!   the validator's job, not ours.
//!
//! Extraction never fails: malformed or empty HTML yields a [`PageData`]
//! with empty Markdown and no links.

mod cleanup;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use docharvest_shared::PageData;

/// Content containers tried in priority order before falling back to
/// `<body>`. Documentation generators almost always wrap the interesting
/// part in one of these.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".document",
    ".content",
];

/// Tags dropped entirely during Markdown conversion.
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "iframe", "noscript", "svg"];

/// Extract title, main-content Markdown, and the raw link list from `html`.
pub fn extract(html: &str, url: &str) -> PageData {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let links = collect_links(&doc);

    let content_html = main_content_html(&doc).unwrap_or_default();
    let markdown = if content_html.is_empty() {
        String::new()
    } else {
        convert_to_markdown(&content_html, url)
    };

    debug!(
        url,
        title = %title,
        markdown_len = markdown.len(),
        links = links.len(),
        "page extracted"
    );

    PageData {
        url: url.to_string(),
        markdown,
        links,
        title,
    }
}

/// Title from `<title>`, falling back to the first `<h1>`.
fn extract_title(doc: &Html) -> String {
    for sel_str in ["title", "h1"] {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                let text = el.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return text;
                }
            }
        }
    }
    String::new()
}

/// Inner HTML of the most specific content container present.
fn main_content_html(doc: &Html) -> Option<String> {
    for sel_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return Some(el.inner_html());
            }
        }
    }

    let body = Selector::parse("body").ok()?;
    doc.select(&body).next().map(|el| el.inner_html())
}

/// Convert content HTML to Markdown and run the cleanup pipeline.
fn convert_to_markdown(content_html: &str, url: &str) -> String {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let raw = match converter.convert(content_html) {
        Ok(md) => md,
        Err(e) => {
            warn!(url, error = %e, "markdown conversion failed, keeping page empty");
            return String::new();
        }
    };

    let base = Url::parse(url).ok();
    cleanup::run_pipeline(&raw, base.as_ref())
}

/// Every `href` attribute on an `<a>` anywhere in the document, verbatim.
fn collect_links(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    doc.select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
    }

    #[test]
    fn extract_simple_page() {
        let html = "<html><head><title>Guide</title></head>\
                    <body><main><h1>Guide</h1><p>Some text.</p></main></body></html>";
        let page = extract(html, "https://docs.example.com/guide");

        assert_eq!(page.title, "Guide");
        assert_eq!(page.url, "https://docs.example.com/guide");
        assert!(page.markdown.contains("Some text."));
        assert!(page.links.is_empty());
    }

    #[test]
    fn extract_empty_document_is_harmless() {
        let page = extract("", "https://docs.example.com/");
        assert!(page.markdown.is_empty());
        assert!(page.links.is_empty());
        assert!(page.title.is_empty());
    }

    #[test]
    fn extract_malformed_html_is_harmless() {
        let page = extract("<div><a href=", "https://docs.example.com/");
        assert!(page.links.is_empty());
    }

    #[test]
    fn title_falls_back_to_h1() {
        let html = "<html><body><h1>Fallback Title</h1><p>text</p></body></html>";
        let page = extract(html, "https://docs.example.com/");
        assert_eq!(page.title, "Fallback Title");
    }

    #[test]
    fn links_are_raw_and_keep_duplicates() {
        let html = r#"<html><body>
            <nav><a href="/guide">Guide</a></nav>
            <main>
                <a href="/guide">Guide</a>
                <a href="../api/os.html">API</a>
                <a href="mailto:team@example.com">Mail</a>
            </main>
        </body></html>"#;
        let page = extract(html, "https://docs.example.com/intro/");

        // Raw hrefs, document order, duplicates intact, nothing absolutised.
        assert_eq!(
            page.links,
            vec!["/guide", "/guide", "../api/os.html", "mailto:team@example.com"]
        );
    }

    #[test]
    fn content_comes_from_main_not_chrome() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a> Carrinho de compras</nav>
            <main><h1>Content</h1><p>Important text.</p></main>
            <footer>Copyright 2020</footer>
        </body></html>"#;
        let page = extract(html, "https://docs.example.com/");

        assert!(page.markdown.contains("Important text."));
        assert!(!page.markdown.contains("Copyright 2020"));
        assert!(!page.markdown.contains("Carrinho"));
    }

    #[test]
    fn body_fallback_when_no_container() {
        let html = "<html><body><h1>Plain</h1><p>Body only.</p></body></html>";
        let page = extract(html, "https://docs.example.com/plain");
        assert!(page.markdown.contains("Body only."));
    }

    #[test]
    fn docs_fixture_produces_structured_markdown() {
        let html = load_fixture("docs_page.html");
        let page = extract(&html, "https://docs.example.com/3/library/os.html");

        assert_eq!(page.title, "os — Operating system interfaces");
        assert!(page.markdown.contains("# os — Operating system interfaces"));
        assert!(page.markdown.contains("```"), "code fences survive");
        assert!(page.markdown.len() > 300);
        // Sidebar links are collected even though their HTML is not converted.
        assert!(page.links.iter().any(|l| l == "/3/library/sys.html"));
    }

    #[test]
    fn error_fixture_has_short_content() {
        let html = load_fixture("error_page.html");
        let page = extract(&html, "https://docs.example.com/missing");

        assert!(page.title.contains("404"));
        assert!(page.markdown.len() < 100);
    }
}
