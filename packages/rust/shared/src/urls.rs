//! URL normalisation helpers shared by the engine and the validators.
//!
//! Canonical form is `scheme://host[:port]/path`: query string and fragment
//! dropped, `http` upgraded to `https`. No trailing-slash normalisation.
//! Non-HTTP schemes keep their scheme so the link scorer can reject them by
//! protocol instead of them silently disappearing.

use url::Url;

/// Ensure a URL has a scheme, defaulting to `https://`.
///
/// A URL that already carries a scheme (http or otherwise) is left alone;
/// the https upgrade happens in [`canonicalize`].
pub fn ensure_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        tracing::debug!(url, "seed URL has no scheme, assuming https");
        format!("https://{url}")
    }
}

/// Resolve `href` against `base`, returning an absolute URL string.
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Reduce a URL to its canonical form for dedup and scoring.
///
/// Returns `None` for strings the `url` crate cannot parse at all.
pub fn canonicalize(url: &str) -> Option<String> {
    canonical_form(url, true)
}

/// Canonical form without the `http`→`https` upgrade.
///
/// The engine uses this in tests that crawl plain-HTTP mock servers; the
/// public behaviour is [`canonicalize`].
pub fn canonicalize_keep_scheme(url: &str) -> Option<String> {
    canonical_form(url, false)
}

fn canonical_form(url: &str, upgrade_http: bool) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let scheme = match parsed.scheme() {
        "http" if upgrade_http => "https",
        other => other,
    };

    let netloc = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        // Schemes like mailto: have no authority; the "path" is the rest.
        (None, _) => String::new(),
    };

    Some(format!("{scheme}://{netloc}{}", parsed.path()))
}

/// Derive the output file name for a page: `host + path` with every
/// character in `/ ? : -` replaced by `_`, suffixed `.md`.
pub fn file_name_for(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let sanitized: String = format!("{host}{}", parsed.path())
        .chars()
        .map(|c| if "/?:-".contains(c) { '_' } else { c })
        .collect();

    Some(format!("{sanitized}.md"))
}
