//! OpenAI Responses API client
//!
//! Sends one structured-output request per call.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::AppConfig;
use crate::error::RoiError;
use crate::llm::{GenerationReply, GenerationRequest, NarrativeGenerator};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

/// Reusable Responses API client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: &request.instructions,
                },
                InputMessage {
                    role: "user",
                    content: &request.input,
                },
            ],
            text: TextConfig {
                format: FormatConfig {
                    kind: "json_schema",
                    name: request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        }
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply> {
        let api_key = self.api_key.as_deref().ok_or(RoiError::MissingApiKey)?;

        let url = format!("{}/responses", self.base_url);
        let body = self.build_body(request);

        info!(model = %self.model, schema = request.schema_name, "Calling Responses API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Responses API request failed: {}", e);
                RoiError::GenerationError(format!("Responses API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Responses API error response: {}", error_text);
            return Err(RoiError::GenerationError(format!(
                "Responses API returned {}: {}",
                status, error_text
            )));
        }

        let payload: Value = response.json().await.map_err(|e| {
            error!("Failed to read Responses API body: {}", e);
            RoiError::GenerationError(format!("Responses API body unreadable: {}", e))
        })?;

        let reply = reply_from_payload(&payload);
        if reply.parsed.is_none() && reply.text.is_none() {
            warn!("Responses API returned no output text");
        }

        let output_tokens = output_token_count(&payload);
        info!(output_tokens, "Responses API reply received");

        Ok(reply)
    }
}

/// Pull the structured value or raw text out of a Responses API body.
fn reply_from_payload(payload: &Value) -> GenerationReply {
    let parsed = payload
        .get("output_parsed")
        .filter(|v| !v.is_null())
        .cloned();

    let text = payload
        .get("output_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| collect_output_text(payload));

    GenerationReply { parsed, text }
}

fn output_token_count(payload: &Value) -> u64 {
    payload
        .pointer("/usage/output_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn collect_output_text(payload: &Value) -> Option<String> {
    let parts: Vec<&str> = payload
        .get("output")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    text: TextConfig<'a>,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct TextConfig<'a> {
    format: FormatConfig<'a>,
}

#[derive(Debug, Serialize)]
struct FormatConfig<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    strict: bool,
    schema: &'a Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            instructions: "You write ROI narratives".to_string(),
            input: "Customer: Acme Clinic".to_string(),
            schema_name: "roi_narratives",
            schema: json!({ "type": "object" }),
        }
    }

    #[test]
    fn test_request_serialization() {
        let client = OpenAiClient::new(&AppConfig::default()).unwrap();
        let request = sample_request();

        let json = serde_json::to_value(client.build_body(&request)).unwrap();
        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["input"][0]["role"], "system");
        assert_eq!(json["input"][1]["content"], "Customer: Acme Clinic");
        assert_eq!(json["text"]["format"]["type"], "json_schema");
        assert_eq!(json["text"]["format"]["strict"], true);
        assert_eq!(json["text"]["format"]["schema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = OpenAiClient::new(&AppConfig::default()).unwrap();
        let result = client.generate(&sample_request()).await;

        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_reply_prefers_output_text_then_content_parts() {
        let reply = reply_from_payload(&json!({ "output_text": "{\"a\":1}", "output": [] }));
        assert_eq!(reply.text.as_deref(), Some("{\"a\":1}"));
        assert!(reply.parsed.is_none());

        let reply = reply_from_payload(&json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "{\"narr" },
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": "atives\":{}}" }
                ]}
            ]
        }));
        assert_eq!(reply.text.as_deref(), Some("{\"narratives\":{}}"));
    }

    #[test]
    fn test_output_token_count() {
        let payload = json!({ "usage": { "input_tokens": 900, "output_tokens": 412 } });
        assert_eq!(output_token_count(&payload), 412);
        assert_eq!(output_token_count(&json!({ "usage": null })), 0);
        assert_eq!(output_token_count(&json!({})), 0);
    }

    #[test]
    fn test_reply_carries_pre_parsed_value() {
        let reply = reply_from_payload(&json!({ "output_parsed": { "narratives": {} } }));
        assert_eq!(reply.parsed, Some(json!({ "narratives": {} })));
        assert!(reply.text.is_none());

        let reply = reply_from_payload(&json!({ "output_parsed": null }));
        assert_eq!(reply, GenerationReply::default());
    }
}
