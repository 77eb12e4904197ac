//! Rule data model and normalization of raw exported records.
//!
//! Raw records come from the game's JSON export of a crew script. Fields
//! may be missing or inconsistently typed; normalization degrades bad
//! fields to empty text instead of dropping records, so positions stay
//! stable and later rules are never renumbered around a bad entry.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnalysisError;

/// The literal condition text that evaluates as vacuously true.
pub const NO_CONDITION: &str = "None";

/// One ordered `condition → action` entry in a crew script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 0-based position in the normalized sequence. Evaluation order —
    /// analysis never reorders rules.
    pub position: usize,
    /// Condition text; `"None"` means vacuously true.
    pub condition: String,
    /// Action text; empty if the record carried none.
    pub action: String,
    /// Explicit subsystem tag from the export, if any.
    pub subsystem_hint: Option<String>,
}

impl Rule {
    pub fn new(position: usize, condition: &str, action: &str) -> Self {
        Self {
            position,
            condition: condition.to_string(),
            action: action.to_string(),
            subsystem_hint: None,
        }
    }

    /// True iff the condition is the literal "None" (case-insensitive).
    pub fn is_always_true(&self) -> bool {
        is_vacuous(&self.condition)
    }

    pub fn kind(&self) -> RuleKind {
        classify_action(&self.action)
    }

    /// 1-based index shown to players. Internal logic stays 0-based; this
    /// offset is applied only at the insight boundary.
    pub fn display_index(&self) -> usize {
        self.position + 1
    }
}

/// Closed classification of a rule's action: suppression directive or
/// real game action. Derived once and carried on insights, never
/// re-derived ad hoc downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// A suppression directive ("Skip next rule" and variants). If its
    /// condition holds it consumes the next rule instead of that rule
    /// being evaluated.
    Skip,
    /// A terminating game action — evaluation stops here when it fires.
    Action,
}

/// Case-insensitive check for the vacuous condition text.
pub fn is_vacuous(condition: &str) -> bool {
    condition.trim().eq_ignore_ascii_case(NO_CONDITION)
}

/// Classify action text. Every suppression directive the exporter emits
/// starts with "skip" ("Skip next rule", "Skip 1 rule", ...). An empty
/// action is still an Action: it terminates a segment by doing nothing.
pub fn classify_action(action: &str) -> RuleKind {
    if action.trim().to_ascii_lowercase().starts_with("skip") {
        RuleKind::Skip
    } else {
        RuleKind::Action
    }
}

/// Normalize a raw JSON export into an ordered rule sequence.
///
/// Accepts only a JSON array; anything else is a caller contract
/// violation. Records carrying a numeric `index` sort by it; records
/// without one anchor at their array position, so equal keys never
/// reorder and indexed records always order among themselves even when
/// index-free records are interleaved. Malformed records degrade to
/// empty-field rules rather than being dropped.
pub fn normalize(raw: &Value) -> Result<Vec<Rule>, AnalysisError> {
    let records = raw.as_array().ok_or_else(|| AnalysisError::InvalidInput {
        found: json_type_name(raw).to_string(),
    })?;

    let mut keyed: Vec<(f64, usize, &Value)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (explicit_index(record).unwrap_or(i as f64), i, record))
        .collect();
    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    Ok(keyed
        .into_iter()
        .enumerate()
        .map(|(position, (_, _, record))| {
            let condition = match text_field(record, "condition") {
                Some(text) if !text.is_empty() => text,
                _ => NO_CONDITION.to_string(),
            };
            let action = text_field(record, "action").unwrap_or_default();
            let subsystem_hint = text_field(record, "phase").filter(|t| !t.is_empty());
            Rule {
                position,
                condition,
                action,
                subsystem_hint,
            }
        })
        .collect())
}

/// Extract a field as trimmed text, tolerating numeric or boolean typing.
fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract an explicit ordering key. Numeric strings count; anything
/// else means "no key" and the record keeps its array order. NaN is
/// unorderable and treated as no key.
fn explicit_index(record: &Value) -> Option<f64> {
    match record.get("index") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|key| !key.is_nan())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
