//! Helpers shared by the adapters, the enricher and persistence.
//!
//! - Text normalization for scraped DOM content
//! - Page text with block-level line breaks
//! - Relative link resolution against a chamber's base URL
//! - String truncation for log previews
//! - Output directory validation

use itertools::Itertools;
use scraper::{ElementRef, Node};
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Collapse every run of whitespace (including NBSP) into one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Visible text of an element, one line per text node.
///
/// Text nodes are joined with `'\n'` so that adjacent cells, list items
/// or `<br>`-separated lines never fuse into one token.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().join("\n")
}

/// Elements that start and end a line of rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "li", "main", "nav", "ol", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Text of an element as it reads on the page.
///
/// Text under inline markup is concatenated as-is, so `<b>0744</b> 111 222`
/// reads `0744 111 222` and `<b>ion</b>@senat.ro` reads `ion@senat.ro`.
/// Block-level elements sit on their own lines and `<br>` becomes a space.
pub fn page_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_page_text(element, &mut out);
    out
}

fn push_page_text(element: ElementRef<'_>, out: &mut String) {
    let block = BLOCK_ELEMENTS.contains(&element.value().name());
    if block {
        end_line(out);
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() == "br" => out.push(' '),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_page_text(child, out);
                }
            }
            _ => {}
        }
    }
    if block {
        end_line(out);
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Resolve a link target against `base`.
///
/// Absolute targets are returned unchanged (normalized by `url`). Empty
/// targets and targets `url` cannot parse yield `None`.
pub fn resolve_reference(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes and suffixed with `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
