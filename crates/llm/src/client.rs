//! Blocking HTTP client for the Ollama `/api/chat` endpoint.

use crate::config::LlmConfig;
use crate::ChatBackend;
use aied_core::{ChatMessage, Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Request body for a non-streaming chat call.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Chat client for an Ollama server.
pub struct OllamaClient {
    config: LlmConfig,
    http: Client,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::LlmError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn map_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::LlmTimeout {
                timeout: self.config.timeout,
            }
        } else {
            Error::LlmError(e.to_string())
        }
    }
}

impl ChatBackend for OllamaClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.config.chat_url();
        log::debug!(
            "POST {} (model {}, {} message(s))",
            url,
            self.config.model,
            messages.len()
        );

        let body = build_request(&self.config.model, messages);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(Error::LlmError(format!("HTTP {}: {}", status, detail.trim())));
        }

        let text = response.text().map_err(|e| self.map_error(e))?;
        let content = parse_response(&text)?;
        log::debug!("Model replied with {} chars", content.len());
        Ok(content)
    }
}

fn build_request<'a>(model: &'a str, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages,
        stream: false,
    }
}

fn parse_response(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::LlmError(format!("Unexpected response: {}", e)))?;
    Ok(parsed.message.content)
}
