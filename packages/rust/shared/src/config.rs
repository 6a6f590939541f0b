//! Rule configuration for the crawler (`config_urls.json`).
//!
//! The key names are the external contract of the rule file and are kept
//! verbatim. Everything is optional; missing keys fall back to the defaults
//! documented on each field. A missing file yields a default config, but a
//! file with broken JSON is surfaced as an error at load time rather than
//! at scoring time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocHarvestError, Result};

/// Default rule-file name, looked up in the working directory.
pub const RULES_FILE_NAME: &str = "config_urls.json";

/// Default link/page score threshold.
const DEFAULT_THRESHOLD: i64 = 50;

// ---------------------------------------------------------------------------
// Rule config (matching config_urls.json schema)
// ---------------------------------------------------------------------------

/// Top-level rule config, deserialized from `config_urls.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Forbidden file extensions (e.g. `.pdf`, `.zip`).
    #[serde(default)]
    pub extensoes_invalidas: Vec<String>,

    /// Forbidden path segments (substring match against the path).
    #[serde(default)]
    pub segmentos_de_caminho_invalidos: Vec<String>,

    /// Forbidden URL prefixes (e.g. `mailto:`, `javascript:`).
    #[serde(default)]
    pub protocolos_invalidos: Vec<String>,

    /// Allowed documentation path prefixes.
    #[serde(default)]
    pub prefixos_permitidos: Vec<String>,

    /// Additional allowed root-level paths.
    #[serde(default)]
    pub caminhos_raiz_permitidos: Vec<String>,

    /// Docs keywords used by the seed validator (subdomain label, path
    /// prefix, and title/h1 probe).
    #[serde(default = "default_docs_keywords")]
    pub segmentos_de_url_valida: Vec<String>,

    /// Map from canonical site to the hostnames allowed for it.
    #[serde(default)]
    pub dominios_permitidos: BTreeMap<String, Vec<String>>,

    /// Thresholds, weights and penalties for the two scorers.
    #[serde(default)]
    pub pontuacao: ScoreConfig,
}

fn default_docs_keywords() -> Vec<String> {
    [
        "documentation",
        "docs",
        "api reference",
        "developer guide",
        "manual",
    ]
    .map(String::from)
    .to_vec()
}

/// `pontuacao` section: thresholds plus per-dimension weights/penalties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Minimum score for a link to be enqueued.
    #[serde(default = "default_threshold")]
    pub threshold_link: i64,

    /// Minimum score for a page to be saved.
    #[serde(default = "default_threshold")]
    pub threshold_pagina: i64,

    /// Per-dimension weights awarded on match.
    #[serde(default)]
    pub pesos: Weights,

    /// Per-dimension penalties applied on violation.
    #[serde(default)]
    pub penalidades: Penalties,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            threshold_link: DEFAULT_THRESHOLD,
            threshold_pagina: DEFAULT_THRESHOLD,
            pesos: Weights::default(),
            penalidades: Penalties::default(),
        }
    }
}

fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD
}

/// `pontuacao.pesos` — weight per scoring dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_w_protocolo")]
    pub protocolo: i64,
    #[serde(default = "default_w_dominio")]
    pub dominio: i64,
    #[serde(default = "default_w_prefixo")]
    pub prefixo: i64,
    #[serde(default = "default_w_extensao")]
    pub extensao: i64,
    #[serde(default = "default_w_segmentos")]
    pub segmentos: i64,
    #[serde(default = "default_w_versao")]
    pub versao: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            protocolo: default_w_protocolo(),
            dominio: default_w_dominio(),
            prefixo: default_w_prefixo(),
            extensao: default_w_extensao(),
            segmentos: default_w_segmentos(),
            versao: default_w_versao(),
        }
    }
}

fn default_w_protocolo() -> i64 {
    10
}
fn default_w_dominio() -> i64 {
    15
}
fn default_w_prefixo() -> i64 {
    15
}
fn default_w_extensao() -> i64 {
    10
}
fn default_w_segmentos() -> i64 {
    20
}
fn default_w_versao() -> i64 {
    15
}

/// `pontuacao.penalidades` — penalty per scoring dimension.
///
/// The prefix and version dimensions abstain instead of penalising, so they
/// have no entry here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalties {
    #[serde(default = "default_p_protocolo")]
    pub protocolo: i64,
    #[serde(default = "default_p_dominio")]
    pub dominio: i64,
    #[serde(default = "default_p_extensao")]
    pub extensao: i64,
    #[serde(default = "default_p_segmentos")]
    pub segmentos: i64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            protocolo: default_p_protocolo(),
            dominio: default_p_dominio(),
            extensao: default_p_extensao(),
            segmentos: default_p_segmentos(),
        }
    }
}

fn default_p_protocolo() -> i64 {
    -60
}
fn default_p_dominio() -> i64 {
    -40
}
fn default_p_extensao() -> i64 {
    -30
}
fn default_p_segmentos() -> i64 {
    -50
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the rule config from a file path.
///
/// A missing file is not an error: the crawler can run on defaults alone.
/// Malformed JSON is an error, surfaced here instead of mid-crawl.
pub fn load_rules(path: &Path) -> Result<RuleConfig> {
    if !path.exists() {
        tracing::debug!(?path, "rule file not found, using defaults");
        return Ok(RuleConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| DocHarvestError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| {
        DocHarvestError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Serialize the default rule config, pretty-printed, for `rules init`.
pub fn default_rules_json() -> Result<String> {
    serde_json::to_string_pretty(&RuleConfig::default())
        .map_err(|e| DocHarvestError::config(e.to_string()))
}
