//! crates/ignite_core/src/export.rs
//!
//! Export surfaces for a sales page: a Word-openable download, the raw HTML
//! for copying, and plain text for pasting into Google Docs.

use crate::document::Document;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// Opens a blank Google Doc; the caller pastes the plain-text export into it.
pub const GOOGLE_DOCS_CREATE_URL: &str = "https://docs.google.com/document/create";

pub const WORD_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// HTML wrapped for Word, served under a `.docx` name. Not an OOXML package.
    Docx,
    Html,
    Text,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Docx),
            "html" => Ok(ExportFormat::Html),
            "text" | "txt" | "google-docs" => Ok(ExportFormat::Text),
            other => Err(format!("Unsupported export format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: String,
}

pub fn export(document: &Document, title: &str, format: ExportFormat) -> ExportFile {
    match format {
        ExportFormat::Docx => word_document(document, title),
        ExportFormat::Html => ExportFile {
            file_name: format!("{}.html", slug(title)),
            mime_type: "text/html; charset=utf-8",
            body: html(document),
        },
        ExportFormat::Text => ExportFile {
            file_name: format!("{}.txt", slug(title)),
            mime_type: "text/plain; charset=utf-8",
            body: plain_text(document),
        },
    }
}

pub fn word_document(document: &Document, title: &str) -> ExportFile {
    let body = format!(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
         xmlns:w='urn:schemas-microsoft-com:office:word' \
         xmlns='http://www.w3.org/TR/REC-html40'>\
         <head><meta charset='utf-8'><title>{}</title></head><body>{}</body></html>",
        escape_html(title),
        document.as_str()
    );
    ExportFile {
        file_name: format!("{}.docx", slug(title)),
        mime_type: WORD_MIME_TYPE,
        body,
    }
}

/// The raw document, markers included.
pub fn html(document: &Document) -> String {
    document.as_str().to_string()
}

/// Tag-free text with paragraph breaks kept and blank runs collapsed.
pub fn plain_text(document: &Document) -> String {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    let [comments, breaks, bullets, tags] = PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?s)<!--.*?-->").expect("static pattern"),
            Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|ul|ol|section|blockquote)\s*>")
                .expect("static pattern"),
            Regex::new(r"(?i)<li[^>]*>").expect("static pattern"),
            Regex::new(r"(?s)<[^>]+>").expect("static pattern"),
        ]
    });

    let text = comments.replace_all(document.as_str(), "\n");
    let text = breaks.replace_all(&text, "\n");
    let text = bullets.replace_all(&text, "- ");
    let text = tags.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut out = String::new();
    let mut blank_run = true;
    for line in text.lines().map(|l| l.split_whitespace().collect::<Vec<_>>().join(" ")) {
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
                blank_run = true;
            }
            continue;
        }
        out.push_str(&line);
        out.push('\n');
        blank_run = false;
    }
    out.trim_end().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}

fn slug(title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "sales-page".to_string()
    } else {
        slug
    }
}
