use super::types::*;
use super::{ChatConnection, TextCompletion};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Shared HTTP plumbing for the one-shot adapter and its chat sessions
#[derive(Clone)]
struct GeminiEndpoint {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiEndpoint {
    fn url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, error_text);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response")?;

        body.into_text()
    }
}

pub struct GeminiAdapter {
    endpoint: GeminiEndpoint,
}

impl GeminiAdapter {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            endpoint: GeminiEndpoint {
                client: Client::new(),
                api_key,
                model,
            },
        }
    }
}

#[async_trait]
impl TextCompletion for GeminiAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_request = GenerateRequest {
            contents: vec![Content::user(request.prompt)],
            system_instruction: None,
            generation_config: request.json_response.then(|| GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        self.endpoint.generate(&api_request).await
    }

    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatConnection> {
        Arc::new(GeminiChat {
            endpoint: self.endpoint.clone(),
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            history: Mutex::new(Vec::new()),
        })
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

/// Gemini chat session
///
/// `generateContent` is stateless, so the session keeps the transcript and
/// replays it with each turn.
pub struct GeminiChat {
    endpoint: GeminiEndpoint,
    system_instruction: SystemInstruction,
    history: Mutex<Vec<Content>>,
}

#[async_trait]
impl ChatConnection for GeminiChat {
    async fn send_message(&self, text: &str) -> Result<String> {
        // Held across the request so turns on one session never interleave
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::user(text.to_string()));

        let api_request = GenerateRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: None,
        };

        let reply = self.endpoint.generate(&api_request).await?;

        history.push(Content::user(text.to_string()));
        history.push(Content::model(reply.clone()));
        tracing::debug!("Gemini chat history now {} turns", history.len());

        Ok(reply)
    }
}

// Internal API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text }],
        }
    }

    fn model(text: String) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .context("No candidates in Gemini response")?;

        if let Some(reason) = &candidate.finish_reason {
            tracing::debug!("Gemini finish reason: {}", reason);
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(text)
    }
}
