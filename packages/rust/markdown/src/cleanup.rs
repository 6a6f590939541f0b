//! Post-conversion cleanup passes for Markdown output.
//!
//! Each pass is a `&str -> String` function applied in sequence. The output
//! is what gets written to disk, so the passes stay conservative: nothing
//! here may drop content, only tidy it.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Run the cleanup pipeline on freshly converted Markdown.
pub(crate) fn run_pipeline(md: &str, base_url: Option<&Url>) -> String {
    let mut result = collapse_blank_lines(md);
    result = fix_fence_languages(&result);
    result = resolve_relative_links(&result, base_url);
    trim_trailing(&result)
}

/// Collapse runs of three or more blank lines down to one blank line.
fn collapse_blank_lines(md: &str) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    BLANK_RUN_RE.replace_all(md, "\n\n").to_string()
}

/// Turn class-derived fence infos (`language-rust`, `lang-py`,
/// `highlight-sh`) into plain language hints.
fn fix_fence_languages(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^```(?:language-|lang-|highlight-)([A-Za-z0-9_+-]+)\s*$")
            .expect("valid regex")
    });

    FENCE_RE.replace_all(md, "```$1").to_string()
}

/// Resolve relative `[text](href)` targets against the page URL so saved
/// files keep working links. Absolute URLs, anchors, and images pass
/// through untouched.
fn resolve_relative_links(md: &str, base_url: Option<&Url>) -> String {
    let Some(base) = base_url else {
        return md.to_string();
    };

    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").expect("valid regex"));

    LINK_RE
        .replace_all(md, |caps: &regex::Captures| {
            let whole = caps.get(0).expect("match");
            let text = &caps[1];
            let href = &caps[2];

            let is_image = whole.start() > 0 && md.as_bytes()[whole.start() - 1] == b'!';
            let keep = is_image
                || href.contains("://")
                || href.starts_with('#')
                || href.starts_with("mailto:");

            if keep {
                return whole.as_str().to_string();
            }

            match base.join(href) {
                Ok(resolved) => format!("[{text}]({resolved})"),
                Err(_) => whole.as_str().to_string(),
            }
        })
        .to_string()
}

/// Strip trailing whitespace per line and end the file with one newline.
fn trim_trailing(md: &str) -> String {
    let mut result = md
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    while result.ends_with('\n') {
        result.pop();
    }
    result.push('\n');
    result
}
