//! Azure OpenAI chat-completions client.
//!
//! Implements the gateway against the Azure OpenAI REST API. Selected at
//! startup only when credentials are configured; otherwise the canned
//! gateway stands in.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::AiConfig;
use crate::models::DemoDataset;

use super::{AiError, AiGateway, ConversationTurn};

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Azure OpenAI API client.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    /// Fully-formed chat-completions URL including the api-version query.
    url: String,
}

impl AzureOpenAiClient {
    /// Create a new client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version,
        );

        Self {
            inner: Arc::new(ClientInner { client, url }),
        }
    }

    /// Send a chat-completion request and return the first choice's content.
    async fn complete(&self, messages: Vec<ApiMessage>) -> Result<String, AiError> {
        let request = ChatCompletionRequest {
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| AiError::Parse(err.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiError::Parse("response contained no choices".to_string()))
    }
}

#[async_trait]
impl AiGateway for AzureOpenAiClient {
    #[instrument(skip(self, history, data_context))]
    async fn respond(
        &self,
        query: &str,
        history: &[ConversationTurn],
        data_context: &str,
        instance_name: &str,
    ) -> Result<String, AiError> {
        let system = format!(
            "You are Salto, a business data assistant for the \"{instance_name}\" instance. \
             Answer questions using the business data below. When the data does not cover a \
             question, say so instead of guessing.\n\nAvailable business data:\n{data_context}"
        );

        let mut messages = vec![ApiMessage {
            role: "system".to_string(),
            content: system,
        }];
        messages.extend(history.iter().map(|turn| ApiMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }));

        // The history usually already ends with the query, freshly persisted.
        let query_is_last = history
            .last()
            .is_some_and(|turn| turn.content == query);
        if !query_is_last {
            messages.push(ApiMessage {
                role: "user".to_string(),
                content: query.to_string(),
            });
        }

        self.complete(messages).await
    }

    #[instrument(skip(self))]
    async fn generate_demo_datasets(&self) -> Result<Vec<DemoDataset>, AiError> {
        let messages = vec![
            ApiMessage {
                role: "system".to_string(),
                content: "You generate small sample business datasets. Respond with a JSON \
                          array only, no prose. Each element must have the keys dataset_name \
                          (string), description (string), and data (object of simple fields)."
                    .to_string(),
            },
            ApiMessage {
                role: "user".to_string(),
                content: "Generate two sample datasets a small company could explore, such as \
                          sales figures and customer counts."
                    .to_string(),
            },
        ];

        let content = self.complete(messages).await?;
        parse_datasets(&content)
    }
}

/// Parse a JSON array of datasets out of a completion, tolerating markdown
/// code fences around the payload.
fn parse_datasets(content: &str) -> Result<Vec<DemoDataset>, AiError> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(stripped).map_err(|err| AiError::Parse(err.to_string()))
}

/// A chat-completions message.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Response body from the chat-completions endpoint.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ApiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_array() {
        let content = r#"[{"dataset_name": "Sales", "description": "d", "data": {"n": 1}}]"#;
        let datasets = parse_datasets(content).expect("parse");
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].dataset_name, "Sales");
    }

    #[test]
    fn parses_fenced_json_array() {
        let content = "```json\n[{\"dataset_name\": \"Sales\", \"description\": \"d\"}]\n```";
        let datasets = parse_datasets(content).expect("parse");
        assert_eq!(datasets.len(), 1);
        assert!(datasets[0].data.is_empty());
    }

    #[test]
    fn rejects_non_json_content() {
        assert!(parse_datasets("Here are your datasets!").is_err());
    }
}
