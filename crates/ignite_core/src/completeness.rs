//! crates/ignite_core/src/completeness.rs
//!
//! Heuristic readiness score for a generated sales page, derived from how much
//! of the messaging strategy and offer outline the user has filled in.

use crate::document::Document;
use serde_json::Value;

const BASE_SCORE: u8 = 60;
const RICH_RECORD_BONUS: u8 = 15;
const SIGNAL_FIELD_BONUS: u8 = 5;
const RICH_RECORD_MIN_FIELDS: usize = 3;

const AVATAR_FIELDS: &[&str] = &["customeravatar", "idealcustomer", "targetaudience"];
const TRANSFORMATION_FIELDS: &[&str] = &["transformation", "outcome", "desiredoutcome", "result"];

/// Scores a sales page that exists, in `[60, 100]`.
pub fn score(messaging_strategy: &Value, offer_outline: &Value) -> u8 {
    let mut total = BASE_SCORE;

    if populated_fields(messaging_strategy).count() > RICH_RECORD_MIN_FIELDS {
        total += RICH_RECORD_BONUS;
    }
    if populated_fields(offer_outline).count() > RICH_RECORD_MIN_FIELDS {
        total += RICH_RECORD_BONUS;
    }
    if has_field(messaging_strategy, offer_outline, is_avatar_key) {
        total += SIGNAL_FIELD_BONUS;
    }
    if has_field(messaging_strategy, offer_outline, is_transformation_key) {
        total += SIGNAL_FIELD_BONUS;
    }

    total.min(100)
}

/// Like [`score`], but a missing or blank document scores 0.
pub fn score_for(
    document: Option<&Document>,
    messaging_strategy: &Value,
    offer_outline: &Value,
) -> u8 {
    match document {
        Some(doc) if !doc.is_blank() => score(messaging_strategy, offer_outline),
        _ => 0,
    }
}

fn populated_fields(record: &Value) -> impl Iterator<Item = &str> + '_ {
    record
        .as_object()
        .into_iter()
        .flat_map(|map| map.iter())
        .filter(|(_, value)| is_populated(value))
        .map(|(key, _)| key.as_str())
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn has_field(strategy: &Value, outline: &Value, matches: fn(&str) -> bool) -> bool {
    populated_fields(strategy)
        .chain(populated_fields(outline))
        .any(matches)
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_avatar_key(key: &str) -> bool {
    let key = normalize(key);
    key.contains("avatar") || AVATAR_FIELDS.contains(&key.as_str())
}

fn is_transformation_key(key: &str) -> bool {
    let key = normalize(key);
    key.contains("transformation") || TRANSFORMATION_FIELDS.contains(&key.as_str())
}
