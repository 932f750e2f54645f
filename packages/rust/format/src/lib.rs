//! Article → HTML / Markdown serialization and download filename derivation.
//!
//! Both serializers emit a fixed section order — title, introduction, error
//! meaning, diagnosis, numbered solution steps, bulleted common failures,
//! product cards — and omit any section whose field is absent or empty.
//! They are pure functions: the same article always yields byte-identical
//! output, so clipboard, download, and publish payloads stay in sync.

use tracing::instrument;

use helpforge_shared::Article;

// Section headings as they appear on the published site.
const HEADING_ERROR_MEANING: &str = "¿Qué significa este error?";
const HEADING_DIAGNOSIS: &str = "Diagnóstico";
const HEADING_SOLUTION: &str = "Solución paso a paso";
const HEADING_COMMON_FAILURES: &str = "Fallos comunes relacionados";
const HEADING_PRODUCTS: &str = "Productos recomendados";
const PRODUCT_LINK_LABEL: &str = "Ver en Amazon";

// ---------------------------------------------------------------------------
// ArticleFormat
// ---------------------------------------------------------------------------

/// Output format for serialization and download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleFormat {
    Html,
    Markdown,
}

impl ArticleFormat {
    /// File extension for this format (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
        }
    }
}

impl std::fmt::Display for ArticleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

// ---------------------------------------------------------------------------
// HTML serializer
// ---------------------------------------------------------------------------

/// Serialize an article to a semantic HTML fragment.
#[instrument(skip(article), fields(title = %article.title))]
pub fn to_html(article: &Article) -> String {
    let content = &article.content;
    let mut html = String::from("<article>\n");
    html.push_str(&format!("  <h1>{}</h1>\n\n", article.title));

    if !content.introduction.is_empty() {
        html.push_str("  <section class=\"introduction\">\n");
        html.push_str(&format!("    <p>{}</p>\n", content.introduction));
        html.push_str("  </section>\n\n");
    }

    if let Some(meaning) = non_empty(content.error_meaning.as_deref()) {
        html.push_str("  <section class=\"error-meaning\">\n");
        html.push_str(&format!("    <h2>{HEADING_ERROR_MEANING}</h2>\n"));
        html.push_str(&format!("    <p>{meaning}</p>\n"));
        html.push_str("  </section>\n\n");
    }

    if let Some(diagnosis) = non_empty(content.diagnosis.as_deref()) {
        html.push_str("  <section class=\"diagnosis\">\n");
        html.push_str(&format!("    <h2>{HEADING_DIAGNOSIS}</h2>\n"));
        html.push_str(&format!("    <p>{diagnosis}</p>\n"));
        html.push_str("  </section>\n\n");
    }

    if !content.solution_steps.is_empty() {
        html.push_str("  <section class=\"solution\">\n");
        html.push_str(&format!("    <h2>{HEADING_SOLUTION}</h2>\n"));
        html.push_str("    <ol>\n");
        for step in &content.solution_steps {
            html.push_str(&format!("      <li>{step}</li>\n"));
        }
        html.push_str("    </ol>\n");
        html.push_str("  </section>\n\n");
    }

    if !content.common_failures.is_empty() {
        html.push_str("  <section class=\"common-failures\">\n");
        html.push_str(&format!("    <h2>{HEADING_COMMON_FAILURES}</h2>\n"));
        html.push_str("    <ul>\n");
        for failure in &content.common_failures {
            html.push_str(&format!("      <li>{failure}</li>\n"));
        }
        html.push_str("    </ul>\n");
        html.push_str("  </section>\n\n");
    }

    if !article.affiliate_links.is_empty() {
        html.push_str("  <section class=\"recommended-products\">\n");
        html.push_str(&format!("    <h2>{HEADING_PRODUCTS}</h2>\n"));
        html.push_str("    <div class=\"products\">\n");
        for product in &article.affiliate_links {
            html.push_str("      <div class=\"product\">\n");
            html.push_str(&format!("        <h3>{}</h3>\n", product.name));
            html.push_str(&format!("        <p>{}</p>\n", product.reason));
            html.push_str(&format!(
                "        <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{PRODUCT_LINK_LABEL}</a>\n",
                product.affiliate_link
            ));
            html.push_str("      </div>\n");
        }
        html.push_str("    </div>\n");
        html.push_str("  </section>\n");
    }

    html.push_str("</article>");
    html
}

// ---------------------------------------------------------------------------
// Markdown serializer
// ---------------------------------------------------------------------------

/// Serialize an article to Markdown with the same section order as [`to_html`].
#[instrument(skip(article), fields(title = %article.title))]
pub fn to_markdown(article: &Article) -> String {
    let content = &article.content;
    let mut md = format!("# {}\n\n", article.title);

    if !content.introduction.is_empty() {
        md.push_str(&format!("{}\n\n", content.introduction));
    }

    if let Some(meaning) = non_empty(content.error_meaning.as_deref()) {
        md.push_str(&format!("## {HEADING_ERROR_MEANING}\n\n{meaning}\n\n"));
    }

    if let Some(diagnosis) = non_empty(content.diagnosis.as_deref()) {
        md.push_str(&format!("## {HEADING_DIAGNOSIS}\n\n{diagnosis}\n\n"));
    }

    if !content.solution_steps.is_empty() {
        md.push_str(&format!("## {HEADING_SOLUTION}\n\n"));
        for (index, step) in content.solution_steps.iter().enumerate() {
            md.push_str(&format!("{}. {step}\n", index + 1));
        }
        md.push('\n');
    }

    if !content.common_failures.is_empty() {
        md.push_str(&format!("## {HEADING_COMMON_FAILURES}\n\n"));
        for failure in &content.common_failures {
            md.push_str(&format!("- {failure}\n"));
        }
        md.push('\n');
    }

    if !article.affiliate_links.is_empty() {
        md.push_str(&format!("## {HEADING_PRODUCTS}\n\n"));
        for product in &article.affiliate_links {
            md.push_str(&format!("### {}\n\n", product.name));
            md.push_str(&format!("{}\n\n", product.reason));
            md.push_str(&format!("[{PRODUCT_LINK_LABEL}]({})\n\n", product.affiliate_link));
        }
    }

    md
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Download filename
// ---------------------------------------------------------------------------

/// Derive a download filename from an article title.
///
/// Lowercases the title, maps every character outside `[a-z0-9]` to `_`,
/// and appends the format's extension. Total over all input strings and
/// idempotent on already-sanitized stems.
pub fn download_filename(title: &str, format: ArticleFormat) -> String {
    let stem: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect();

    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use helpforge_shared::{
        AffiliateLink, Article, ArticleContent, ArticleMetadata, ArticleStatus,
    };

    fn full_article() -> Article {
        Article {
            title: "Error E03 en Echo Dot 4".into(),
            content: ArticleContent {
                introduction: "El error E03 indica un fallo de comunicación.".into(),
                error_meaning: Some("Fallo de comunicación con otros dispositivos.".into()),
                diagnosis: Some("Comprueba la red local.".into()),
                solution_steps: vec!["Reinicia el dispositivo".into(), "Comprueba el WiFi".into()],
                common_failures: vec!["Error E02 - Problemas de conexión WiFi".into()],
            },
            affiliate_links: vec![AffiliateLink {
                name: "Repetidor WiFi".into(),
                kind: "accesorio".into(),
                reason: "Mejora la señal".into(),
                affiliate_link: "https://www.amazon.es/s?k=repetidor&tag=x-21".into(),
            }],
            metadata: ArticleMetadata {
                model: "Echo Dot 4".into(),
                error: "Error E03".into(),
                pdf_chunks: 12,
                text_length: 48210,
                generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap(),
            },
            status: ArticleStatus::Draft,
        }
    }

    fn minimal_article() -> Article {
        let mut article = full_article();
        article.content.error_meaning = None;
        article.content.diagnosis = None;
        article.content.solution_steps.clear();
        article.content.common_failures.clear();
        article.affiliate_links.clear();
        article
    }

    #[test]
    fn html_has_fixed_section_order() {
        let html = to_html(&full_article());
        let h1 = html.find("<h1>").expect("title");
        let meaning = html.find(HEADING_ERROR_MEANING).expect("meaning");
        let diagnosis = html.find(HEADING_DIAGNOSIS).expect("diagnosis");
        let solution = html.find(HEADING_SOLUTION).expect("solution");
        let failures = html.find(HEADING_COMMON_FAILURES).expect("failures");
        let products = html.find(HEADING_PRODUCTS).expect("products");
        assert!(h1 < meaning && meaning < diagnosis && diagnosis < solution);
        assert!(solution < failures && failures < products);
        assert!(html.starts_with("<article>\n"));
        assert!(html.ends_with("</article>"));
    }

    #[test]
    fn html_numbered_steps_and_product_card() {
        let html = to_html(&full_article());
        assert!(html.contains("<ol>\n      <li>Reinicia el dispositivo</li>"));
        assert!(html.contains("<h3>Repetidor WiFi</h3>"));
        assert!(html.contains("rel=\"noopener noreferrer\">Ver en Amazon</a>"));
    }

    #[test]
    fn markdown_uses_ordered_and_unordered_lists() {
        let md = to_markdown(&full_article());
        assert!(md.starts_with("# Error E03 en Echo Dot 4\n\n"));
        assert!(md.contains("1. Reinicia el dispositivo\n2. Comprueba el WiFi\n"));
        assert!(md.contains("- Error E02 - Problemas de conexión WiFi\n"));
        assert!(md.contains("[Ver en Amazon](https://www.amazon.es/s?k=repetidor&tag=x-21)"));
    }

    #[test]
    fn serializers_are_deterministic() {
        let article = full_article();
        assert_eq!(to_html(&article), to_html(&article));
        assert_eq!(to_markdown(&article), to_markdown(&article));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let article = minimal_article();
        let html = to_html(&article);
        let md = to_markdown(&article);

        for heading in [
            HEADING_ERROR_MEANING,
            HEADING_DIAGNOSIS,
            HEADING_SOLUTION,
            HEADING_COMMON_FAILURES,
            HEADING_PRODUCTS,
        ] {
            assert!(!html.contains(heading), "html leaked section: {heading}");
            assert!(!md.contains(heading), "markdown leaked section: {heading}");
        }

        // No stray empty tags either.
        assert!(!html.contains("<ol>"));
        assert!(!html.contains("<ul>"));
        assert!(!html.contains("class=\"products\""));
    }

    #[test]
    fn empty_solution_steps_omit_section_in_both_formats() {
        let mut article = full_article();
        article.content.solution_steps.clear();
        assert!(!to_html(&article).contains(HEADING_SOLUTION));
        assert!(!to_markdown(&article).contains(HEADING_SOLUTION));
    }

    #[test]
    fn filename_sanitizes_title() {
        assert_eq!(
            download_filename("Error E03: ¿Qué hacer?", ArticleFormat::Html),
            "error_e03___qu__hacer_.html"
        );
        assert_eq!(
            download_filename("Echo Dot 4", ArticleFormat::Markdown),
            "echo_dot_4.md"
        );
    }

    #[test]
    fn filename_is_total_and_idempotent() {
        for title in ["", "   ", "¡¡¡", "already_sanitized_99", "Mixed CASE Título"] {
            let once = download_filename(title, ArticleFormat::Markdown);
            let stem = once.strip_suffix(".md").expect("extension");
            let twice = download_filename(stem, ArticleFormat::Markdown);
            assert_eq!(twice, once, "not idempotent for {title:?}");
        }
    }
}
