//! Page scorer: is a fetched page worth keeping?
//!
//! Two short-circuits (error pages, near-empty content), then additive
//! scoring against `threshold_pagina`. Length is measured in characters.

use std::sync::LazyLock;

use regex::Regex;

use docharvest_shared::PageData;

use super::{ScoreBreakdown, Validator, Verdict};

/// Title fragments that mark an error page.
const ERROR_TITLE_MARKERS: &[&str] = &["404", "not found", "página não encontrada"];

/// Phrases that mark storefront/community chrome rather than documentation.
static COMMERCIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("carrinho de compras|faça seu login|fórum de discussão|compre agora")
        .expect("valid regex")
});

/// Minimum content length to be considered at all.
const MIN_CONTENT_CHARS: usize = 100;

impl Validator {
    /// Score an extracted page. Pure function of the page and the config.
    pub fn score_page(&self, page: &PageData) -> Verdict {
        let title_lower = page.title.to_lowercase();
        if ERROR_TITLE_MARKERS
            .iter()
            .any(|marker| title_lower.contains(marker))
        {
            return Verdict::reject("Página de erro 404");
        }

        let length = page.markdown.chars().count();
        if length < MIN_CONTENT_CHARS {
            return Verdict::reject(format!("Conteúdo insuficiente ({length} chars)"));
        }

        let content_lower = page.markdown.to_lowercase();
        let mut score = ScoreBreakdown::default();

        if COMMERCIAL_RE.is_match(&content_lower) {
            score.add(-30, "contém palavras proibidas");
        }

        let has_structure = page.markdown.contains('#') || page.markdown.contains("```");
        if has_structure {
            score.add(50, "boa estrutura");
        } else {
            score.add(30, "estrutura mínima");
        }

        if length >= 300 {
            score.add(30, "conteúdo grande");
        } else if length >= 150 {
            score.add(15, "conteúdo médio");
        } else {
            score.add(5, "conteúdo pequeno");
        }

        if page.markdown.contains("```") || page.markdown.contains('`') {
            score.add(20, "contém código");
        }

        score.into_verdict(self.rules().pontuacao.threshold_pagina)
    }
}

#[cfg(test)]
mod tests {
    use docharvest_shared::{PageData, RuleConfig};

    use super::super::Validator;

    fn page(title: &str, markdown: String) -> PageData {
        PageData {
            url: "https://docs.example.com/page".into(),
            markdown,
            links: vec![],
            title: title.into(),
        }
    }

    fn validator() -> Validator {
        Validator::new(&RuleConfig::default(), None)
    }

    #[test]
    fn error_title_short_circuits() {
        for title in ["404", "Page Not Found", "Página não encontrada"] {
            let verdict = validator().score_page(&page(title, "x".repeat(500)));
            assert!(!verdict.accepted, "title {title:?} should reject");
            assert_eq!(verdict.reason, "Página de erro 404");
        }
    }

    #[test]
    fn short_content_short_circuits() {
        let verdict = validator().score_page(&page("Guide", "tiny".into()));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Conteúdo insuficiente (4 chars)");
    }

    #[test]
    fn length_exactly_one_hundred_is_rejected() {
        let verdict = validator().score_page(&page("Guide", "a".repeat(100)));
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("insuficiente"));
    }

    #[test]
    fn length_one_over_the_floor_is_scored() {
        let verdict = validator().score_page(&page("Guide", "a".repeat(101)));
        // 101 plain chars: +30 structure mínima, +5 conteúdo pequeno = 35.
        assert!(!verdict.accepted);
        assert!(verdict.reason.starts_with("Pontuação: 35/50"));
    }

    #[test]
    fn rich_docs_page_scores_one_hundred() {
        let markdown = format!(
            "# Interfaces\n\nSome prose about the module.\n\n```python\nimport os\n```\n\n{}",
            "More explanation. ".repeat(70)
        );
        let verdict = validator().score_page(&page("os module", markdown));
        assert!(verdict.accepted);
        // +50 structure, +30 length, +20 code.
        assert!(verdict.reason.starts_with("Pontuação: 100/50"));
    }

    #[test]
    fn commercial_phrases_cost_thirty() {
        let markdown = format!(
            "# Loja\n\nAdicione ao carrinho de compras e compre agora.\n\n{}",
            "conteúdo ".repeat(50)
        );
        let verdict = validator().score_page(&page("Loja", markdown));
        assert!(verdict.reason.contains("-30 contém palavras proibidas"));
    }

    #[test]
    fn score_exactly_at_threshold_is_accepted() {
        // Commercial phrase (-30) + structure (+50) + length >= 300 (+30)
        // and no inline code: exactly 50.
        let markdown = format!(
            "# Guia\n\ncompre agora\n\n{}",
            "texto corrido sem sinais de codigo ".repeat(12)
        );
        assert!(markdown.chars().count() >= 300);
        let verdict = validator().score_page(&page("Guia", markdown));
        assert!(verdict.accepted);
        assert!(verdict.reason.starts_with("Pontuação: 50/50"));
    }

    #[test]
    fn medium_plain_text_is_rejected() {
        // 200 chars, no structure, no code: +30 +15 = 45 < 50.
        let markdown = "plain words ".repeat(17);
        assert!(markdown.chars().count() >= 150 && markdown.chars().count() < 300);
        let verdict = validator().score_page(&page("Notes", markdown));
        assert!(!verdict.accepted);
        assert!(verdict.reason.starts_with("Pontuação: 45/50"));
    }
}
