//! Narrative request/response pipeline
//!
//! Builds the schema-constrained request from the inputs and the
//! projection, makes the single generation call, and normalizes
//! whatever comes back into a guaranteed-shape result.

use crate::llm::{GenerationReply, GenerationRequest, NarrativeGenerator};
use crate::models::{FinancialProjection, NarrativeOutput, RequestInput};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub mod normalize;
pub mod prompt;
pub mod schema;

pub use normalize::{normalize, NEXT_ACTION_FILLER};

pub struct NarrativeService {
    generator: Arc<dyn NarrativeGenerator>,
}

impl NarrativeService {
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self { generator }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Assemble the generation request for one input.
    pub fn build_request(
        input: &RequestInput,
        financials: &FinancialProjection,
    ) -> GenerationRequest {
        GenerationRequest {
            instructions: prompt::system_prompt(input.clinical_validation_mode),
            input: prompt::data_prompt(input, financials),
            schema_name: schema::SCHEMA_NAME,
            schema: schema::narrative_schema(),
        }
    }

    /// Generate and normalize narratives for the requested audiences.
    ///
    /// Only a failed generation call is an error; malformed output is absorbed.
    pub async fn build_and_normalize(
        &self,
        input: &RequestInput,
        financials: &FinancialProjection,
    ) -> Result<NarrativeOutput> {
        let request = Self::build_request(input, financials);

        let reply = self.generator.generate(&request).await?;

        let payload = extract_payload(reply);
        if payload.is_none() {
            warn!(model = %self.model(), "Generator output unusable; returning empty narratives");
        }

        let output = normalize(payload.as_ref()).retain_audiences(&input.audiences);

        info!(
            audiences = input.audiences.len(),
            caveats = output.assumptions_and_caveats.len(),
            checklist = output.clinical_validation_checklist.len(),
            "Narratives normalized"
        );

        Ok(output)
    }
}

/// Pre-parsed value first, then a strict parse of the raw text.
pub fn extract_payload(reply: GenerationReply) -> Option<Value> {
    if let Some(parsed) = reply.parsed.filter(|v| !v.is_null()) {
        return Some(parsed);
    }

    let text = reply.text?;
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Generator text is not valid JSON: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute_financials;
    use crate::error::RoiError;
    use crate::llm::FixtureGenerator;
    use serde_json::json;

    fn acme(audiences: Value) -> RequestInput {
        RequestInput::from_value(&json!({
            "customerName": "Acme Clinic",
            "specialty": "Cardiology",
            "physicianCount": 10,
            "timeSavedHrsPerDay": 2,
            "patientIncreasePerDay": 1,
            "audiences": audiences
        }))
        .unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "narratives": {
                "clinical": "Physicians reclaim two hours a day.",
                "operations": "Notes close same day.",
                "financial": "Illustrative value of $1,375,000 per year.",
                "executive": "A 38.2x illustrative return."
            },
            "assumptions_and_caveats": ["Figures are illustrative.", "Rates are defaults."],
            "clinical_validation_checklist": ["Baseline note time."],
            "next_best_actions": [
                "Run a pilot.",
                "Collect telemetry.",
                "Review with finance.",
                "Extra"
            ]
        })
    }

    async fn run(generator: FixtureGenerator, audiences: Value) -> Result<NarrativeOutput> {
        let input = acme(audiences);
        let financials = compute_financials(&input);
        NarrativeService::new(Arc::new(generator))
            .build_and_normalize(&input, &financials)
            .await
    }

    #[test]
    fn test_extract_prefers_parsed() {
        let reply = GenerationReply {
            parsed: Some(json!({ "from": "parsed" })),
            text: Some("{\"from\":\"text\"}".into()),
        };
        assert_eq!(extract_payload(reply), Some(json!({ "from": "parsed" })));
    }

    #[test]
    fn test_extract_falls_back_to_text() {
        let reply = GenerationReply {
            parsed: Some(Value::Null),
            text: Some("  {\"from\":\"text\"}\n".into()),
        };
        assert_eq!(extract_payload(reply), Some(json!({ "from": "text" })));
    }

    #[test]
    fn test_extract_swallows_bad_text() {
        for text in ["```json\n{}\n```", "Sure! Here you go", "", "null"] {
            let reply = GenerationReply {
                parsed: None,
                text: Some(text.into()),
            };
            assert_eq!(extract_payload(reply), None, "text: {:?}", text);
        }
        assert_eq!(extract_payload(GenerationReply::default()), None);
    }

    #[test]
    fn test_build_request_carries_schema_and_blocks() {
        let input = acme(json!(["clinical"]));
        let request = NarrativeService::build_request(&input, &compute_financials(&input));

        assert_eq!(request.schema_name, "roi_narratives");
        assert_eq!(request.schema["additionalProperties"], false);
        assert!(request.instructions.contains("Clinical validation mode is OFF"));
        assert!(request.input.contains("Annual total value: $1,375,000"));
    }

    #[tokio::test]
    async fn test_financial_only_audience() {
        let output = run(FixtureGenerator::parsed(full_payload()), json!(["financial"]))
            .await
            .unwrap();

        assert_eq!(
            output.narratives.financial,
            "Illustrative value of $1,375,000 per year."
        );
        assert_eq!(output.narratives.clinical, "");
        assert_eq!(output.narratives.operations, "");
        assert_eq!(output.narratives.executive, "");
        assert_eq!(output.assumptions_and_caveats.len(), 2);
        assert_eq!(
            output.next_best_actions,
            vec!["Run a pilot.", "Collect telemetry.", "Review with finance."]
        );
    }

    #[tokio::test]
    async fn test_raw_text_reply_is_parsed() {
        let text = serde_json::to_string(&full_payload()).unwrap();
        let output = run(FixtureGenerator::text(text), json!(["clinical", "executive"]))
            .await
            .unwrap();

        assert_eq!(output.narratives.clinical, "Physicians reclaim two hours a day.");
        assert_eq!(output.narratives.executive, "A 38.2x illustrative return.");
        assert_eq!(output.narratives.financial, "");
    }

    #[tokio::test]
    async fn test_malformed_reply_yields_empty_shape() {
        let output = run(FixtureGenerator::text("not json at all"), json!(["clinical"]))
            .await
            .unwrap();

        assert_eq!(output.narratives.clinical, "");
        assert!(output.assumptions_and_caveats.is_empty());
        assert_eq!(output.next_best_actions, vec![NEXT_ACTION_FILLER; 3]);
    }

    #[tokio::test]
    async fn test_generator_fault_propagates() {
        let result = run(FixtureGenerator::failing("429 rate limited"), json!(["clinical"])).await;

        match result {
            Err(RoiError::GenerationError(message)) => assert!(message.contains("rate limited")),
            other => panic!("expected GenerationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_output() {
        let audiences = json!(["financial", "executive"]);
        let first = run(FixtureGenerator::parsed(full_payload()), audiences.clone())
            .await
            .unwrap();
        let second = run(FixtureGenerator::parsed(full_payload()), audiences)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
