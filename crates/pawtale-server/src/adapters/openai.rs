//! OpenAI chat-completions and moderation adapter

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pawtale::{
    ChatMessage, CompletionOptions, CompletionResponse, GenerationError, ModerationVerdict,
    StoryLlm, TokenUsage,
};

use super::http;
use crate::config::OpenAiConfig;

/// Hosted LLM provider speaking the OpenAI REST dialect
pub struct OpenAiProvider {
    client: Client,
    base_url: Url,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::json_client(config.timeout, Some(&config.api_key))?,
            base_url: http::base_url(&config.base_url)?,
            model: config.model.clone(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(http::join(&self.base_url, segments))
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Provider(format!("Request failed: {}", err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        response
            .json()
            .await
            .map_err(|err| GenerationError::Provider(format!("Parse error: {}", err)))
    }
}

#[async_trait]
impl StoryLlm for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format: options.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let payload = self.post(&["chat", "completions"], &request).await?;
        let parsed: ChatCompletionResponse = serde_json::from_value(payload)
            .map_err(|err| GenerationError::Provider(format!("Parse error: {}", err)))?;

        tracing::debug!(
            model = %parsed.model,
            total_tokens = parsed.usage.as_ref().map(|u| u.total_tokens).unwrap_or_default(),
            "Chat completion received"
        );

        let first = parsed.choices.into_iter().next();
        Ok(CompletionResponse {
            content: first.as_ref().and_then(|c| c.message.content.clone()),
            finish_reason: first.and_then(|c| c.finish_reason),
            model: parsed.model,
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, GenerationError> {
        let payload = self
            .post(&["moderations"], &ModerationRequest { input: text })
            .await?;
        Ok(parse_moderation(&payload))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

// ============================================
// Helper Functions
// ============================================

fn parse_moderation(root: &Value) -> ModerationVerdict {
    let Some(result) = root
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
    else {
        return ModerationVerdict::default();
    };

    let categories = result
        .get("categories")
        .and_then(Value::as_object)
        .map(|cats| {
            cats.iter()
                .filter(|(_, hit)| hit.as_bool() == Some(true))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default();

    ModerationVerdict {
        flagged: result.get("flagged").and_then(Value::as_bool).unwrap_or(false),
        categories,
    }
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    GenerationError::Provider(format!("API error ({}): {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_moderation() {
        let verdict = parse_moderation(&json!({
            "results": [{
                "flagged": true,
                "categories": {"violence": true, "hate": false}
            }]
        }));
        assert!(verdict.flagged);
        assert_eq!(verdict.categories, vec!["violence".to_string()]);

        assert_eq!(parse_moderation(&json!({"results": []})), ModerationVerdict::default());
    }

    #[test]
    fn test_map_http_error_prefers_api_message() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
        );
        assert_eq!(
            err.to_string(),
            "LLM provider error: API error (401): Incorrect API key provided"
        );
    }

    #[test]
    fn test_request_serialization() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            max_tokens: 200,
            temperature: 0.8,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["response_format"]["type"], "json_object");
    }
}
