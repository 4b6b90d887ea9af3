//! Visible-text and link extraction from fetched HTML, using the `scraper` crate.
//!
//! html5ever recovers from any malformed markup, so neither function can fail:
//! garbage in yields best-effort (possibly empty) output.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text content is never visible page text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript"];

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector must parse"));

/// Strip markup, scripts and styles and return the visible text.
///
/// Each non-blank text node becomes one line; whitespace runs inside a node
/// collapse to a single space.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Resolve every `<a href>` on the page against `page_url`.
///
/// Returns absolute http(s) URLs in document order, without fragments and
/// without duplicates. `mailto:`, `javascript:` and unparsable hrefs are dropped.
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links: Vec<Url> = Vec::new();

    for el in document.select(&LINK_SELECTOR) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = page_url.join(href.trim()) else {
            continue;
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }
        url.set_fragment(None);
        if !links.contains(&url) {
            links.push(url);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_scripts_styles_and_noscript() {
        let html = r#"
        <html>
        <head>
            <title>Portal</title>
            <style>body { color: red; }</style>
            <script>var tracking = 1;</script>
        </head>
        <body>
            <noscript>Enable JavaScript</noscript>
            <h1>Ocean   Data</h1>
            <p>Sea surface temperature products.</p>
        </body>
        </html>"#;

        let text = extract_text(html);
        assert_eq!(text, "Portal\nOcean Data\nSea surface temperature products.");
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let text = extract_text("<div><p>Unclosed <b>bold text</div></span>");
        assert!(text.contains("Unclosed"));
        assert!(text.contains("bold text"));
        assert_eq!(extract_text(""), "");
    }

    #[test]
    fn links_are_resolved_and_deduplicated() {
        let base = Url::parse("https://www.mosdac.gov.in/data/").unwrap();
        let html = r##"
        <a href="/about">About</a>
        <a href="catalog#top">Catalog</a>
        <a href="catalog">Catalog again</a>
        <a href="mailto:help@mosdac.gov.in">Mail</a>
        <a href="javascript:void(0)">JS</a>
        <a href="https://isro.gov.in/">ISRO</a>
        "##;

        let links: Vec<String> = extract_links(html, &base)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://www.mosdac.gov.in/about",
                "https://www.mosdac.gov.in/data/catalog",
                "https://isro.gov.in/",
            ]
        );
    }
}
