//! crates/ignite_core/src/missing.rs
//!
//! Advisory "missing element" notes for unwritten sections of a sales page.

use crate::document::{Document, Section};
use crate::domain::{MissingElement, Priority};

fn priority(section: Section) -> Priority {
    match section {
        Section::Headline | Section::Pricing | Section::Cta => Priority::High,
        Section::Problem | Section::Solution | Section::Benefits => Priority::Medium,
        Section::Testimonials | Section::Guarantee => Priority::Low,
    }
}

fn suggestions(section: Section) -> &'static [&'static str] {
    match section {
        Section::Headline => &[
            "Lead with the transformation your ideal customer wants",
            "Call out who the offer is for in the first line",
        ],
        Section::Problem => &[
            "Describe the pain in your customer's own words",
            "Name what they have already tried that did not work",
        ],
        Section::Solution => &[
            "Introduce your signature method by name",
            "Explain why it works when other approaches fail",
        ],
        Section::Benefits => &[
            "Turn each deliverable into the result it produces",
            "Keep benefits concrete and measurable",
        ],
        Section::Testimonials => &[
            "Add two or three short client results",
            "Include names and specifics where you have permission",
        ],
        Section::Pricing => &[
            "State the investment clearly",
            "Offer a payment plan alongside the pay-in-full price",
        ],
        Section::Guarantee => &[
            "Explain what happens if the offer does not work for them",
        ],
        Section::Cta => &[
            "Use one clear action verb",
            "Repeat the call to action after the pricing block",
        ],
    }
}

/// One advisory element per section whose content is empty or absent.
pub fn detect(document: &Document) -> Vec<MissingElement> {
    document
        .sections()
        .into_iter()
        .filter(|(_, body)| body.is_empty())
        .map(|(section, _)| MissingElement {
            section: section.key().to_string(),
            field: format!("{}Content", section.key()),
            description: format!("The {} section has not been written yet.", section.title()),
            priority: priority(section),
            suggestions: suggestions(section).iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// Elements whose `section` or `field` mentions the section key.
pub fn for_section(elements: &[MissingElement], section: Section) -> Vec<&MissingElement> {
    let key = section.key();
    elements
        .iter()
        .filter(|e| {
            e.section.to_ascii_lowercase().contains(key)
                || e.field.to_ascii_lowercase().contains(key)
        })
        .collect()
}
