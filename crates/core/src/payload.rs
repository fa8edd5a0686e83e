//! Markdown extraction from clipboard payloads.
//!
//! IDEs put rich copies on the clipboard as HTML, with the source Markdown
//! stored on `data-markdown-raw` attributes. When those are present they are
//! the source of truth; otherwise the HTML is converted back to Markdown.

use log::debug;
use regex::Regex;
use scraper::{Html, Selector as CssSelector};
use serde::Serialize;

const RAW_ATTRIBUTE: &str = "data-markdown-raw";

/// Where the extracted Markdown came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Joined from `data-markdown-raw` attributes.
    RawAttribute { sections: usize },
    /// Converted from the HTML markup itself.
    HtmlFallback,
    /// The payload was not HTML and is used as-is.
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub markdown: String,
    pub origin: Origin,
}

/// Whether a clipboard payload should be treated as HTML.
pub fn looks_like_html(payload: &str) -> bool {
    payload.trim_start().starts_with('<')
        || has_clipboard_header(payload)
        || payload.contains(RAW_ATTRIBUTE)
}

/// A Windows `CF_HTML` header: `Version:` followed by a `StartHTML:` line.
fn has_clipboard_header(payload: &str) -> bool {
    let mut lines = payload.trim_start().lines();
    lines.next().is_some_and(|line| line.starts_with("Version:"))
        && lines.take(4).any(|line| line.starts_with("StartHTML:"))
}

/// Get Markdown out of any clipboard payload, HTML or plain text.
pub fn markdown_from_payload(payload: &str) -> Extraction {
    if looks_like_html(payload) {
        extract_markdown(payload)
    } else {
        debug!("payload is plain text ({} bytes)", payload.len());
        Extraction {
            markdown: payload.to_string(),
            origin: Origin::PlainText,
        }
    }
}

/// Extract Markdown from an HTML clipboard payload.
pub fn extract_markdown(payload: &str) -> Extraction {
    let html = clean_html(strip_clipboard_header(payload));
    let sections = raw_markdown_sections(&html);

    if sections.is_empty() {
        debug!("no {RAW_ATTRIBUTE} attributes found, converting HTML to Markdown");
        return Extraction {
            markdown: html2md::parse_html(&html).trim().to_string(),
            origin: Origin::HtmlFallback,
        };
    }

    debug!("found {} {RAW_ATTRIBUTE} sections", sections.len());
    Extraction {
        markdown: sections.join("\n\n"),
        origin: Origin::RawAttribute {
            sections: sections.len(),
        },
    }
}

/// Drop the `Version:`/`StartHTML:` header Windows puts in front of HTML
/// clipboard data.
pub fn strip_clipboard_header(payload: &str) -> &str {
    if !has_clipboard_header(payload) {
        return payload;
    }

    payload
        .to_ascii_lowercase()
        .find("<html")
        .or_else(|| payload.find('<'))
        .map_or(payload, |start| &payload[start..])
}

/// Remove script and style tags from HTML
pub fn clean_html(html: &str) -> String {
    let script_regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("valid regex");
    let html = script_regex.replace_all(html, "");

    let style_regex = Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("valid regex");
    let html = style_regex.replace_all(&html, "");

    html.to_string()
}

fn raw_markdown_sections(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = CssSelector::parse(&format!("[{RAW_ATTRIBUTE}]")) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(RAW_ATTRIBUTE))
        // Attribute values may arrive entity-encoded twice.
        .map(|raw| html_escape::decode_html_entities(raw).trim().to_string())
        .filter(|section| !section.is_empty())
        .collect()
}
