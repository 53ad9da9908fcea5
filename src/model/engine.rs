//! Local engine backend: an OpenAI-compatible chat completions server
//! (llama.cpp `llama-server` and similar) running on the device.
//!
//! The provisioned artifact path doubles as the model id, so a server that
//! hosts several GGUF files picks the one the session asked for.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::artifact::LocalModel;
use super::session::EngineLoader;
use super::types::{CompletionRequest, InferenceError, LanguageEngine, PromptMessage};

const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// LOADER
// =============================================================================

/// Builds [`LocalServerEngine`]s against one base URL.
pub struct LocalServerLoader {
    base_url: String,
    timeout: Duration,
}

impl LocalServerLoader {
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), timeout }
    }
}

#[async_trait::async_trait]
impl EngineLoader for LocalServerLoader {
    async fn load(&self, model: &LocalModel) -> Result<Box<dyn LanguageEngine>, InferenceError> {
        let present = tokio::fs::try_exists(&model.path)
            .await
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;
        if !present {
            return Err(InferenceError::ModelLoad(format!("artifact missing: {}", model.path.display())));
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| InferenceError::HttpClientBuild(e.to_string()))?;

        info!(base_url = %self.base_url, size = %model.size_class, model = %model.path.display(), "local engine ready");
        Ok(Box::new(LocalServerEngine {
            http,
            base_url: self.base_url.clone(),
            model_id: model.path.to_string_lossy().into_owned(),
        }))
    }
}

// =============================================================================
// ENGINE
// =============================================================================

pub struct LocalServerEngine {
    http: reqwest::Client,
    base_url: String,
    model_id: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
    stop: &'a [String],
}

#[async_trait::async_trait]
impl LanguageEngine for LocalServerEngine {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let body = ChatRequest {
            model: &self.model_id,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: &request.stop,
        };
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, messages = request.messages.len(), "engine request");

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;
        if status != 200 {
            return Err(InferenceError::Response { status, body: text });
        }
        parse_chat_completion(&text)
    }
}

/// Pull `choices[0].message.content` out of a chat completions body.
///
/// # Errors
///
/// Returns [`InferenceError::Parse`] for malformed JSON or a missing choice.
pub(crate) fn parse_chat_completion(json_text: &str) -> Result<String, InferenceError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| InferenceError::Parse(e.to_string()))?;
    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(InferenceError::Parse("missing choices[0]".to_string()));
    };
    Ok(choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
