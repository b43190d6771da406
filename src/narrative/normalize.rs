//! Output normalization
//!
//! Total function from whatever the generator produced to a
//! `NarrativeOutput` of the correct shape. One coercion per field.

use crate::models::{Audience, NarrativeOutput, Narratives};
use crate::narrative::schema::{MAX_LIST_ITEMS, NEXT_ACTION_COUNT};
use serde_json::Value;

pub const NEXT_ACTION_FILLER: &str = "Validate baseline + data provenance.";

pub fn normalize(raw: Option<&Value>) -> NarrativeOutput {
    let field = |key: &str| raw.and_then(|v| v.get(key));

    NarrativeOutput {
        narratives: coerce_narratives(field("narratives")),
        assumptions_and_caveats: coerce_string_list(
            field("assumptions_and_caveats"),
            MAX_LIST_ITEMS,
        ),
        clinical_validation_checklist: coerce_string_list(
            field("clinical_validation_checklist"),
            MAX_LIST_ITEMS,
        ),
        next_best_actions: pad_to(
            coerce_string_list(field("next_best_actions"), NEXT_ACTION_COUNT),
            NEXT_ACTION_COUNT,
        ),
    }
}

fn coerce_narratives(value: Option<&Value>) -> Narratives {
    let mut narratives = Narratives::default();

    let Some(obj) = value.and_then(Value::as_object) else {
        return narratives;
    };

    for audience in Audience::ALL {
        narratives.set(audience, coerce_text(obj.get(audience.as_str())));
    }

    narratives
}

/// Scalars become their text form; null and containers become "".
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

/// Keep non-blank strings in order, at most `limit`.
fn coerce_string_list(value: Option<&Value>, limit: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .take(limit)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn pad_to(mut items: Vec<String>, len: usize) -> Vec<String> {
    items.truncate(len);
    while items.len() < len {
        items.push(NEXT_ACTION_FILLER.to_string());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{} {}", prefix, i)).collect()
    }

    fn with_actions(actions: Vec<String>) -> Value {
        json!({ "next_best_actions": actions })
    }

    #[test]
    fn test_null_and_missing_payloads() {
        for raw in [None, Some(json!(null)), Some(json!("garbage")), Some(json!([1, 2]))] {
            let output = normalize(raw.as_ref());
            assert_eq!(output.narratives, Narratives::default());
            assert!(output.assumptions_and_caveats.is_empty());
            assert!(output.clinical_validation_checklist.is_empty());
            assert_eq!(output.next_best_actions, vec![NEXT_ACTION_FILLER; 3]);
        }
    }

    #[test]
    fn test_wrong_typed_narratives() {
        let raw = json!({
            "narratives": {
                "clinical": "Fewer clicks per encounter.",
                "operations": 42,
                "financial": null,
                "marketing": "ignored"
            }
        });
        let output = normalize(Some(&raw));
        assert_eq!(output.narratives.clinical, "Fewer clicks per encounter.");
        assert_eq!(output.narratives.operations, "42");
        assert_eq!(output.narratives.financial, "");
        assert_eq!(output.narratives.executive, "");

        let raw = json!({
            "narratives": {
                "clinical": ["list"],
                "operations": { "nested": "object" },
                "financial": 38.2,
                "executive": true
            }
        });
        let output = normalize(Some(&raw));
        assert_eq!(output.narratives.clinical, "");
        assert_eq!(output.narratives.operations, "");
        assert_eq!(output.narratives.financial, "38.2");
        assert_eq!(output.narratives.executive, "true");

        let output = normalize(Some(&json!({ "narratives": "flat string" })));
        assert_eq!(output.narratives, Narratives::default());
    }

    #[test]
    fn test_next_best_actions_always_three() {
        let output = normalize(Some(&with_actions(vec![])));
        assert_eq!(output.next_best_actions, vec![NEXT_ACTION_FILLER; 3]);

        let output = normalize(Some(&with_actions(numbered("Action", 1))));
        assert_eq!(
            output.next_best_actions,
            vec!["Action 1", NEXT_ACTION_FILLER, NEXT_ACTION_FILLER]
        );

        let output = normalize(Some(&with_actions(numbered("Action", 3))));
        assert_eq!(output.next_best_actions, numbered("Action", 3));

        let output = normalize(Some(&with_actions(numbered("Action", 5))));
        assert_eq!(output.next_best_actions, numbered("Action", 3));
    }

    #[test]
    fn test_blank_and_non_string_actions_are_dropped_before_truncation() {
        let raw = json!({
            "next_best_actions": ["", 7, "Pilot with 5 physicians", "  ", null, "Baseline notes"]
        });
        let output = normalize(Some(&raw));
        assert_eq!(
            output.next_best_actions,
            vec!["Pilot with 5 physicians", "Baseline notes", NEXT_ACTION_FILLER]
        );
    }

    #[test]
    fn test_lists_capped_at_ten() {
        for n in [0, 10, 15] {
            let raw = json!({
                "assumptions_and_caveats": numbered("Caveat", n),
                "clinical_validation_checklist": numbered("Check", n)
            });
            let output = normalize(Some(&raw));

            let expected = n.min(10);
            assert_eq!(output.assumptions_and_caveats.len(), expected);
            assert_eq!(output.clinical_validation_checklist.len(), expected);
        }

        let raw = json!({ "assumptions_and_caveats": numbered("Caveat", 15) });
        let output = normalize(Some(&raw));
        assert_eq!(output.assumptions_and_caveats, numbered("Caveat", 10));
    }

    #[test]
    fn test_non_array_lists_become_empty() {
        let raw = json!({
            "assumptions_and_caveats": "one long caveat",
            "clinical_validation_checklist": { "0": "check" }
        });
        let output = normalize(Some(&raw));
        assert!(output.assumptions_and_caveats.is_empty());
        assert!(output.clinical_validation_checklist.is_empty());
    }
}
