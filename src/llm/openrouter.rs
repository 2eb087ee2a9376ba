use super::types::*;
use super::{ChatConnection, TextCompletion};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Clone)]
struct OpenRouterEndpoint {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenRouterEndpoint {
    async fn send_request(&self, request: &ApiRequest) -> Result<String> {
        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to OpenRouter")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouter API error {}: {}", status, error_text);
        }

        let completion: CompletionResponse = response.json().await?;
        completion.into_content()
    }
}

pub struct OpenRouterAdapter {
    endpoint: OpenRouterEndpoint,
}

impl OpenRouterAdapter {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            endpoint: OpenRouterEndpoint {
                client: Client::new(),
                api_key,
                model,
            },
        }
    }
}

#[async_trait]
impl TextCompletion for OpenRouterAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_request = ApiRequest {
            model: self.endpoint.model.clone(),
            messages: vec![Message::new("user", request.prompt)],
            stream: false,
            response_format: request.json_response.then(ResponseFormat::json_object),
        };

        self.endpoint.send_request(&api_request).await
    }

    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatConnection> {
        Arc::new(OpenRouterChat {
            endpoint: self.endpoint.clone(),
            history: Mutex::new(vec![Message::new("system", system_instruction)]),
        })
    }

    fn name(&self) -> &'static str {
        "OpenRouter"
    }
}

/// OpenRouter chat session; the system message is the first history entry
pub struct OpenRouterChat {
    endpoint: OpenRouterEndpoint,
    history: Mutex<Vec<Message>>,
}

#[async_trait]
impl ChatConnection for OpenRouterChat {
    async fn send_message(&self, text: &str) -> Result<String> {
        let mut history = self.history.lock().await;

        let mut messages = history.clone();
        messages.push(Message::new("user", text));

        let api_request = ApiRequest {
            model: self.endpoint.model.clone(),
            messages,
            stream: false,
            response_format: None,
        };

        let reply = self.endpoint.send_request(&api_request).await?;

        history.push(Message::new("user", text));
        history.push(Message::new("assistant", reply.clone()));

        Ok(reply)
    }
}

// Internal API types
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: String,
}

impl Message {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Message,
    finish_reason: Option<String>,
}

impl CompletionResponse {
    fn into_content(self) -> Result<String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .context("No choices in response")?;

        if let Some(reason) = &choice.finish_reason {
            tracing::debug!("OpenRouter finish reason: {}", reason);
        }

        Ok(choice.message.content)
    }
}
