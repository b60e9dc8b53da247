use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::LlmError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_message: String,
    pub max_output_tokens: u32,
}

/// Chat-completion backend used for summarization.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the text of the first completion choice, or `None` when the
    /// backend produced no usable choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Azure OpenAI chat completions against a single deployment.
pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: &str, api_key: String, deployment: String, api_version: String) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError> {
        if self.endpoint.is_empty() || self.api_key.is_empty() {
            return Err(LlmError::Config(
                "AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY must be set".to_string(),
            ));
        }

        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            max_tokens: request.max_output_tokens,
        };

        debug!(
            "Requesting completion from deployment {} ({} chars of input)",
            self.deployment,
            request.user_message.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let client = AzureOpenAiClient::new(
            "https://contoso.openai.azure.com/",
            "key".to_string(),
            "gpt-4o-mini".to_string(),
            "2024-02-15-preview".to_string(),
        );
        assert_eq!(
            client.completions_url(),
            "https://contoso.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_response_tolerates_missing_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(parsed.choices[0].message.as_ref().unwrap().content.is_none());

        let empty: ChatResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(empty.choices.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_request() {
        let client = AzureOpenAiClient::new("", String::new(), "d".to_string(), "v".to_string());
        let request = CompletionRequest {
            system_instruction: "s".to_string(),
            user_message: "u".to_string(),
            max_output_tokens: 10,
        };
        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
    }
}
