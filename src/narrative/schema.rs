//! Structured output contract sent with every generation request

use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "roi_narratives";

pub const MIN_LIST_ITEMS: usize = 5;
pub const MAX_LIST_ITEMS: usize = 10;
pub const NEXT_ACTION_COUNT: usize = 3;

fn string_list(min: usize, max: usize) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "minItems": min,
        "maxItems": max
    })
}

/// Strict JSON schema for the narrative payload.
pub fn narrative_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "narratives": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "clinical": { "type": "string" },
                    "operations": { "type": "string" },
                    "financial": { "type": "string" },
                    "executive": { "type": "string" }
                },
                "required": ["clinical", "operations", "financial", "executive"]
            },
            "assumptions_and_caveats": string_list(MIN_LIST_ITEMS, MAX_LIST_ITEMS),
            "clinical_validation_checklist": string_list(MIN_LIST_ITEMS, MAX_LIST_ITEMS),
            "next_best_actions": string_list(NEXT_ACTION_COUNT, NEXT_ACTION_COUNT)
        },
        "required": [
            "narratives",
            "assumptions_and_caveats",
            "clinical_validation_checklist",
            "next_best_actions"
        ]
    })
}
