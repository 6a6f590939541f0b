//! Link scorer: should a discovered URL be enqueued?
//!
//! Six additive dimensions compared against `threshold_link`. A dimension
//! contributes its weight on match, its penalty on violation, or abstains.
//! One short-circuit: a version found in the URL that is incompatible with
//! the requested version rejects the link outright.

use url::Url;

use docharvest_shared::urls;

use super::{ScoreBreakdown, Validator, Verdict, check_compatibility, extract_version};

/// Percentage (0–100) below which fuzzy prefix matches are ignored.
const FUZZY_PREFIX_CUTOFF: i64 = 75;

impl Validator {
    /// Score a candidate link discovered on `base_url`.
    ///
    /// Pure: depends only on the arguments and the validator's config.
    pub fn score_link(&self, base_url: &str, candidate: &str) -> Verdict {
        let full = urls::absolutize(base_url, candidate).unwrap_or_else(|| candidate.to_string());

        let parsed = match Url::parse(&full) {
            Ok(parsed) => parsed,
            Err(e) => return Verdict::reject(format!("Erro na validação: {e}")),
        };

        let base_host = Url::parse(base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        let link_host = parsed.host_str().map(str::to_lowercase).unwrap_or_default();
        let path = if parsed.path().is_empty() {
            "/".to_string()
        } else {
            parsed.path().to_lowercase()
        };

        let weights = &self.rules().pontuacao.pesos;
        let penalties = &self.rules().pontuacao.penalidades;
        let mut score = ScoreBreakdown::default();

        // Protocol
        if self
            .rules()
            .protocolos_invalidos
            .iter()
            .any(|proto| full.starts_with(proto.as_str()))
        {
            score.add(penalties.protocolo, "protocolo inválido");
        } else {
            score.add(weights.protocolo, "protocolo válido");
        }

        // Domain
        if !link_host.is_empty()
            && (link_host == base_host || self.allowed_domains.contains(&link_host))
        {
            score.add(weights.dominio, "domínio válido");
        } else {
            score.add(
                penalties.dominio,
                &format!("domínio inválido ({link_host})"),
            );
        }

        // Prefix (abstains when unknown)
        self.score_prefix(&path, &mut score);

        // File extension
        let trimmed = path.trim_end_matches('/');
        let last_segment = trimmed.rsplit('/').next().unwrap_or_default();
        if last_segment.contains('.') {
            if self
                .rules()
                .extensoes_invalidas
                .iter()
                .any(|ext| trimmed.ends_with(ext.as_str()))
            {
                score.add(penalties.extensao, "extensão binária");
            } else {
                score.add(weights.extensao, "extensão válida");
            }
        } else {
            score.add(weights.extensao, "HTML válido");
        }

        // Forbidden path segments
        if self
            .rules()
            .segmentos_de_caminho_invalidos
            .iter()
            .any(|segment| path.contains(&segment.to_lowercase()))
        {
            score.add(penalties.segmentos, "segmento proibido");
        } else {
            score.add(weights.segmentos, "sem segmentos proibidos");
        }

        // Version (abstains unless a requested version is set and a version
        // shows up in the URL; incompatibility short-circuits)
        if let (Some(requested), Some(_)) =
            (&self.requested_version_raw, &self.requested_version)
        {
            if let Some(found) = extract_version(&full) {
                let (compatible, reason) = check_compatibility(requested, Some(&found));
                if !compatible {
                    return Verdict::reject(reason);
                }
                score.add(weights.versao, "versão compatível");
            }
        }

        score.into_verdict(self.rules().pontuacao.threshold_link)
    }

    /// Root path and allowed-prefix dimension, with a fuzzy fallback for
    /// near-miss prefixes (≥ 75% similarity earns 80% of the weight).
    fn score_prefix(&self, path: &str, score: &mut ScoreBreakdown) {
        let weight = self.rules().pontuacao.pesos.prefixo;

        if path == "/" {
            score.add(weight, "página raiz");
            return;
        }

        let exact = self.allowed_prefixes.iter().any(|prefix| {
            let prefix = prefix.to_lowercase();
            path.starts_with(&format!("/{prefix}/")) || path == format!("/{prefix}")
        });
        if exact {
            score.add(weight, "prefixo válido");
            return;
        }

        let best_ratio = self
            .allowed_prefixes
            .iter()
            .map(|prefix| levenshtein_ratio(path, &format!("/{}/", prefix.to_lowercase())))
            .max()
            .unwrap_or(0);

        if best_ratio >= FUZZY_PREFIX_CUTOFF {
            let points = weight * 80 / 100;
            score.add(points, &format!("prefixo similar ({best_ratio}%)"));
        } else {
            score.add(0, "prefixo desconhecido");
        }
    }
}

/// Levenshtein similarity on a 0–100 scale.
fn levenshtein_ratio(a: &str, b: &str) -> i64 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as i64
}
