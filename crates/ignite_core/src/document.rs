//! crates/ignite_core/src/document.rs
//!
//! The marker-delimited sales page document.
//!
//! A document is a single HTML blob holding eight named sections. Each section
//! is wrapped in a pair of comment markers derived from its upper-cased key,
//! e.g. `<!-- HEADLINE_START -->` ... `<!-- HEADLINE_END -->`.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("Section '{0}' has no markers in this document")]
    SectionNotFound(Section),
    #[error("Unknown sales page section: {0}")]
    UnknownSection(String),
    #[error("Content for section '{0}' contains a section marker")]
    MarkerInContent(Section),
}

//=========================================================================================
// Section
//=========================================================================================

/// One of the eight fixed regions of a sales page, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Headline,
    Problem,
    Solution,
    Benefits,
    Testimonials,
    Pricing,
    Guarantee,
    Cta,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Headline,
        Section::Problem,
        Section::Solution,
        Section::Benefits,
        Section::Testimonials,
        Section::Pricing,
        Section::Guarantee,
        Section::Cta,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::Headline => "headline",
            Section::Problem => "problem",
            Section::Solution => "solution",
            Section::Benefits => "benefits",
            Section::Testimonials => "testimonials",
            Section::Pricing => "pricing",
            Section::Guarantee => "guarantee",
            Section::Cta => "cta",
        }
    }

    pub fn start_marker(self) -> &'static str {
        match self {
            Section::Headline => "<!-- HEADLINE_START -->",
            Section::Problem => "<!-- PROBLEM_START -->",
            Section::Solution => "<!-- SOLUTION_START -->",
            Section::Benefits => "<!-- BENEFITS_START -->",
            Section::Testimonials => "<!-- TESTIMONIALS_START -->",
            Section::Pricing => "<!-- PRICING_START -->",
            Section::Guarantee => "<!-- GUARANTEE_START -->",
            Section::Cta => "<!-- CTA_START -->",
        }
    }

    pub fn end_marker(self) -> &'static str {
        match self {
            Section::Headline => "<!-- HEADLINE_END -->",
            Section::Problem => "<!-- PROBLEM_END -->",
            Section::Solution => "<!-- SOLUTION_END -->",
            Section::Benefits => "<!-- BENEFITS_END -->",
            Section::Testimonials => "<!-- TESTIMONIALS_END -->",
            Section::Pricing => "<!-- PRICING_END -->",
            Section::Guarantee => "<!-- GUARANTEE_END -->",
            Section::Cta => "<!-- CTA_END -->",
        }
    }

    /// Human readable title used by exports and advisory messages.
    pub fn title(self) -> &'static str {
        match self {
            Section::Headline => "Headline",
            Section::Problem => "Problem",
            Section::Solution => "Solution",
            Section::Benefits => "Benefits",
            Section::Testimonials => "Testimonials",
            Section::Pricing => "Pricing",
            Section::Guarantee => "Guarantee",
            Section::Cta => "Call to Action",
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            Section::ALL
                .iter()
                .map(|s| {
                    let source = format!(
                        "(?s){}.*?{}",
                        regex::escape(s.start_marker()),
                        regex::escape(s.end_marker())
                    );
                    Regex::new(&source).expect("escaped marker pattern")
                })
                .collect()
        });
        &patterns[self as usize]
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.key() == wanted)
            .ok_or_else(|| DocumentError::UnknownSection(s.to_string()))
    }
}

//=========================================================================================
// Document
//=========================================================================================

/// A full sales page, sections delimited by comment markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Builds a document with every section present and empty.
    pub fn skeleton() -> Self {
        let body = Section::ALL
            .iter()
            .map(|s| format!("{}\n{}", s.start_marker(), s.end_marker()))
            .collect::<Vec<_>>()
            .join("\n\n");
        Self(body)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn has_section(&self, section: Section) -> bool {
        section.pattern().is_match(&self.0)
    }

    /// Returns the trimmed content between the section's markers.
    ///
    /// A missing marker, or an end marker placed before the start marker, reads
    /// as an unwritten section and yields an empty string.
    pub fn section(&self, section: Section) -> String {
        let start = section.start_marker();
        let Some(start_at) = self.0.find(start) else {
            return String::new();
        };
        let body_at = start_at + start.len();
        match self.0[body_at..].find(section.end_marker()) {
            Some(len) => self.0[body_at..body_at + len].trim().to_string(),
            None => String::new(),
        }
    }

    /// All sections in canonical order, empty strings for the unwritten ones.
    pub fn sections(&self) -> Vec<(Section, String)> {
        Section::ALL
            .into_iter()
            .map(|s| (s, self.section(s)))
            .collect()
    }

    /// Returns a copy of the document with the section's content replaced.
    ///
    /// Every occurrence of the marker pair is rewritten. The new content is
    /// inserted literally. When the markers are absent nothing is written and
    /// `SectionNotFound` is returned, leaving `self` as it was. Content carrying
    /// any section marker is refused with `MarkerInContent`, since it would
    /// leave a marker appearing more than once.
    pub fn replace_section(
        &self,
        section: Section,
        content: &str,
    ) -> Result<Document, DocumentError> {
        if Section::ALL
            .iter()
            .any(|s| content.contains(s.start_marker()) || content.contains(s.end_marker()))
        {
            return Err(DocumentError::MarkerInContent(section));
        }
        let pattern = section.pattern();
        if !pattern.is_match(&self.0) {
            return Err(DocumentError::SectionNotFound(section));
        }
        let wrapped = format!(
            "{}\n{}\n{}",
            section.start_marker(),
            content,
            section.end_marker()
        );
        Ok(Document(pattern.replace_all(&self.0, NoExpand(&wrapped)).into_owned()))
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(
            "<html>\n<!-- HEADLINE_START -->\n<h1>Ignite your launch</h1>\n<!-- HEADLINE_END -->\n\
             <!-- PROBLEM_START --><p>Nobody opens your emails.</p><!-- PROBLEM_END -->\n</html>",
        )
    }

    #[test]
    fn extracts_trimmed_section_content() {
        let doc = sample();
        assert_eq!(doc.section(Section::Headline), "<h1>Ignite your launch</h1>");
        assert_eq!(doc.section(Section::Problem), "<p>Nobody opens your emails.</p>");
    }

    #[test]
    fn missing_section_reads_empty() {
        assert_eq!(sample().section(Section::Pricing), "");
    }

    #[test]
    fn start_without_end_reads_empty() {
        let doc = Document::new("<!-- HEADLINE_START --> dangling headline");
        assert_eq!(doc.section(Section::Headline), "");
    }

    #[test]
    fn end_before_start_reads_empty() {
        let doc = Document::new("<!-- CTA_END --> buy <!-- CTA_START -->");
        assert_eq!(doc.section(Section::Cta), "");
    }

    #[test]
    fn replace_then_extract_returns_trimmed_content() {
        let doc = sample();
        let updated = doc
            .replace_section(Section::Headline, "  <h1>New headline</h1>\n")
            .unwrap();
        assert_eq!(updated.section(Section::Headline), "<h1>New headline</h1>");
        assert_eq!(updated.section(Section::Problem), "<p>Nobody opens your emails.</p>");
        assert!(updated.as_str().starts_with("<html>\n"));
        assert!(updated.as_str().ends_with("</html>"));
    }

    #[test]
    fn replace_keeps_dollar_signs_literal() {
        let doc = Document::skeleton();
        let updated = doc.replace_section(Section::Pricing, "Only $97 ($1 trial)").unwrap();
        assert_eq!(updated.section(Section::Pricing), "Only $97 ($1 trial)");
    }

    #[test]
    fn replace_on_absent_section_is_an_error_and_leaves_document() {
        let doc = sample();
        let before = doc.clone();
        let err = doc.replace_section(Section::Guarantee, "30 days").unwrap_err();
        assert_eq!(err, DocumentError::SectionNotFound(Section::Guarantee));
        assert_eq!(doc, before);
        assert_eq!(doc.section(Section::Guarantee), "");
    }

    #[test]
    fn replace_refuses_content_carrying_markers() {
        let doc = Document::skeleton();
        let err = doc
            .replace_section(Section::Headline, "a <!-- HEADLINE_END --> b")
            .unwrap_err();
        assert_eq!(err, DocumentError::MarkerInContent(Section::Headline));

        let err = doc
            .replace_section(Section::Problem, "<!-- CTA_START -->buy")
            .unwrap_err();
        assert_eq!(err, DocumentError::MarkerInContent(Section::Problem));
        assert_eq!(doc, Document::skeleton());
    }

    #[test]
    fn plain_comments_are_still_accepted_as_content() {
        let updated = Document::skeleton()
            .replace_section(Section::Headline, "a <!-- note --> b")
            .unwrap();
        assert_eq!(updated.section(Section::Headline), "a <!-- note --> b");
        assert_eq!(updated.as_str().matches(Section::Headline.end_marker()).count(), 1);
    }

    #[test]
    fn replace_spans_multiline_content_non_greedily() {
        let doc = Document::new(
            "<!-- BENEFITS_START -->\n<ul>\n<li>a</li>\n</ul>\n<!-- BENEFITS_END -->\n\
             <!-- CTA_START -->Join<!-- CTA_END -->",
        );
        let updated = doc.replace_section(Section::Benefits, "<p>b</p>").unwrap();
        assert_eq!(updated.section(Section::Benefits), "<p>b</p>");
        assert_eq!(updated.section(Section::Cta), "Join");
    }

    #[test]
    fn skeleton_contains_every_section_in_order() {
        let doc = Document::skeleton();
        let mut last = 0;
        for section in Section::ALL {
            assert!(doc.has_section(section));
            let at = doc.as_str().find(section.start_marker()).unwrap();
            assert!(at >= last);
            last = at;
        }
        assert!(doc.sections().iter().all(|(_, body)| body.is_empty()));
    }

    #[test]
    fn parses_section_keys_case_insensitively() {
        assert_eq!("CTA".parse::<Section>().unwrap(), Section::Cta);
        assert_eq!(" testimonials ".parse::<Section>().unwrap(), Section::Testimonials);
        assert!(matches!(
            "footer".parse::<Section>(),
            Err(DocumentError::UnknownSection(_))
        ));
    }
}
