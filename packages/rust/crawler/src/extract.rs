//! Page text extraction: title, flattened body text, and follow-up links.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static TEXT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li, h2, h3, h4").expect("valid selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Text pulled out of one HTML page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: String,
    pub content: String,
    /// Absolute same-origin links, in document order.
    pub links: Vec<Url>,
}

/// Extract title, content and links from a parsed document fetched from `url`.
pub fn extract_page(doc: &Html, url: &Url) -> ExtractedPage {
    ExtractedPage {
        title: extract_title(doc),
        content: extract_content(doc),
        links: extract_links(doc, url),
    }
}

/// First `<h1>` text, falling back to `<title>`. Empty when neither has text.
pub fn extract_title(doc: &Html) -> String {
    let first_text = |sel: &Selector| {
        doc.select(sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    };

    let h1 = first_text(&*H1_SEL);
    if h1.is_empty() { first_text(&*TITLE_SEL) } else { h1 }
}

/// Text of every paragraph, list item and h2–h4 heading, space-joined.
pub fn extract_content(doc: &Html) -> String {
    let mut content = String::new();
    for el in doc.select(&TEXT_SEL) {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            content.push_str(text);
            content.push(' ');
        }
    }
    collapse_whitespace(&content)
}

/// Root-relative links without fragments, resolved against `base_url`.
pub fn extract_links(doc: &Html, base_url: &Url) -> Vec<Url> {
    doc.select(&LINK_SEL)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.starts_with('/') && !href.contains('#'))
        .filter_map(|href| base_url.join(href).ok())
        .collect()
}

/// Collapse every whitespace run to one space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/guides/intro").unwrap()
    }

    #[test]
    fn title_prefers_h1() {
        let doc = Html::parse_document(
            "<html><head><title>Site | Docs</title></head><body><h1>  Sources </h1></body></html>",
        );
        assert_eq!(extract_title(&doc), "Sources");
    }

    #[test]
    fn title_falls_back_to_title_tag() {
        let doc = Html::parse_document(
            "<html><head><title> Destinations | Docs </title></head><body><h1>   </h1></body></html>",
        );
        assert_eq!(extract_title(&doc), "Destinations | Docs");

        let bare = Html::parse_document("<html><body><p>no headings</p></body></html>");
        assert_eq!(extract_title(&bare), "");
    }

    #[test]
    fn content_takes_text_elements_in_order() {
        let doc = Html::parse_document(
            r#"<html><body>
                <nav><a href="/x">Nav link</a></nav>
                <h2>Setup</h2>
                <p>Log in to your
                   workspace.</p>
                <p>   </p>
                <ul><li>Step one</li><li>Step two</li></ul>
                <h5>ignored heading</h5>
                <div>ignored div text</div>
            </body></html>"#,
        );
        assert_eq!(
            extract_content(&doc),
            "Setup Log in to your workspace. Step one Step two"
        );
    }

    #[test]
    fn links_keep_only_root_relative_without_fragments() {
        let doc = Html::parse_document(
            r##"<html><body>
                <a href="/connections/sources/">Sources</a>
                <a href="/page#section">Anchored</a>
                <a href="#top">Top</a>
                <a href="relative/path">Relative</a>
                <a href="https://external.com/docs">External</a>
                <a>No href</a>
            </body></html>"##,
        );
        let links = extract_links(&doc, &base());
        assert_eq!(
            links,
            vec![Url::parse("https://docs.example.com/connections/sources/").unwrap()]
        );
    }

    #[test]
    fn collapse_whitespace_normalizes_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
    }
}
