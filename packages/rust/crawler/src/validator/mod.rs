//! The three crawl validators: seed, link, and page.
//!
//! All three return a verdict plus a human-readable reason suitable for
//! logs. The reason strings (and the score-breakdown format
//! `Pontuação: {score}/{threshold} (…)`) are part of the external contract
//! and keep the original Portuguese wording.
//!
//! Scoring is pure: a [`Validator`] holds only configuration and
//! regexes compiled once at construction, never per-call state.

mod link;
mod page;
mod seed;
mod version;

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use docharvest_shared::RuleConfig;

pub use version::{DocVersion, InvalidVersion, check_compatibility, extract_version};

// ---------------------------------------------------------------------------
// Verdict and score breakdown
// ---------------------------------------------------------------------------

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the URL/page passed.
    pub accepted: bool,
    /// Human-readable reason or score breakdown.
    pub reason: String,
}

impl Verdict {
    pub(crate) fn accept(reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: reason.into(),
        }
    }

    pub(crate) fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// Running additive score with labelled entries.
///
/// The final verdict is `score >= threshold` unless a short-circuit rule
/// fired earlier in the scorer.
#[derive(Debug, Default)]
pub(crate) struct ScoreBreakdown {
    score: i64,
    entries: Vec<String>,
}

impl ScoreBreakdown {
    /// Add a (possibly zero or negative) contribution with its label.
    pub(crate) fn add(&mut self, delta: i64, label: &str) {
        self.score += delta;
        if delta >= 0 {
            self.entries.push(format!("+{delta} {label}"));
        } else {
            self.entries.push(format!("{delta} {label}"));
        }
    }

    /// Compare against the threshold and render the breakdown string.
    pub(crate) fn into_verdict(self, threshold: i64) -> Verdict {
        let reason = format!(
            "Pontuação: {}/{} ({})",
            self.score,
            threshold,
            self.entries.join(" | ")
        );
        Verdict {
            accepted: self.score >= threshold,
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Holds the scoring rules in resolved form, built once per crawl run.
pub struct Validator {
    rules: RuleConfig,
    /// `prefixos_permitidos` and `caminhos_raiz_permitidos` combined, in
    /// config order — both count as allowed prefixes for link scoring.
    allowed_prefixes: Vec<String>,
    /// Union of all hostnames from `dominios_permitidos`.
    allowed_domains: HashSet<String>,
    /// Requested version exactly as given (for compatibility messages).
    requested_version_raw: Option<String>,
    /// Parsed form; `None` disables the version dimension.
    requested_version: Option<DocVersion>,
    /// Docs-keyword matcher for the seed probe, built from
    /// `segmentos_de_url_valida`. `None` when the keyword set is empty.
    docs_keywords_re: Option<Regex>,
}

impl Validator {
    /// Build a validator from the rule config and an optional requested
    /// version. An unparseable version disables the version dimension
    /// rather than failing the run.
    pub fn new(rules: &RuleConfig, version: Option<&str>) -> Self {
        let allowed_prefixes: Vec<String> = rules
            .prefixos_permitidos
            .iter()
            .chain(rules.caminhos_raiz_permitidos.iter())
            .cloned()
            .collect();

        let allowed_domains: HashSet<String> = rules
            .dominios_permitidos
            .values()
            .flatten()
            .map(|host| host.to_lowercase())
            .collect();

        let (requested_version_raw, requested_version) = match version {
            Some(raw) if !raw.is_empty() => {
                let parsed = match raw.parse::<DocVersion>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        debug!(version = raw, error = %e, "requested version unusable, version dimension disabled");
                        None
                    }
                };
                (Some(raw.to_string()), parsed)
            }
            _ => (None, None),
        };

        let docs_keywords_re = build_keyword_regex(&rules.segmentos_de_url_valida);

        Self {
            rules: rules.clone(),
            allowed_prefixes,
            allowed_domains,
            requested_version_raw,
            requested_version,
            docs_keywords_re,
        }
    }

    pub(crate) fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub(crate) fn matches_docs_keywords(&self, text: &str) -> bool {
        self.docs_keywords_re
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }
}

/// Case-insensitive alternation over the configured keywords.
fn build_keyword_regex(keywords: &[String]) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }

    let pattern = keywords
        .iter()
        .map(|kw| regex::escape(kw))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!("(?i){pattern}")).ok()
}
