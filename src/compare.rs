//! Compare an expected message against an actual decoded one.
//!
//! Directional: wildcard semantics are taken from the expected side only,
//! so swapping the arguments can change the verdict.

use crate::message::Message;

/// Verdict and diagnostic from one comparison. `message` is empty when the
/// messages match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareResult {
    pub equal: bool,
    pub message: String,
}

impl CompareResult {
    fn matched() -> Self {
        CompareResult {
            equal: true,
            message: String::new(),
        }
    }

    fn mismatch(field: &str, expected: &str, actual: &str) -> Self {
        CompareResult {
            equal: false,
            message: format!(
                "field {}: expected {}, actual {}",
                field, expected, actual
            ),
        }
    }
}

/// Walk both messages' fields in declaration order and report the first
/// mismatching non-wildcard field. The messages must share a template;
/// handing in messages built from different templates is a caller error.
///
/// An expected field with an empty value (a wildcard, or a `len()` field
/// that was never resolved by an encode) matches any actual content.
pub fn compare(expected: &Message, actual: &Message) -> CompareResult {
    let actual_values: Vec<&str> = actual.values().map(|(_, v)| v).collect();
    for (i, (name, exp)) in expected.values().enumerate() {
        if exp.is_empty() {
            continue;
        }
        let act = actual_values.get(i).copied().unwrap_or("");
        if exp != act {
            return CompareResult::mismatch(name, exp, act);
        }
    }
    CompareResult::matched()
}
