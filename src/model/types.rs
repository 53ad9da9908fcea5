//! Model-layer types: prompt messages, the completion contract and errors.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures while making a model artifact available on disk.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The model directory could not be created.
    #[error("model directory unavailable: {0}")]
    Directory(String),

    /// The download request failed before or during transfer.
    #[error("download failed: {0}")]
    Download(String),

    /// The model source answered with a non-success status.
    #[error("download returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The artifact path could not be expressed as a file URI.
    #[error("invalid model path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for ProvisionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Directory(_) => "E_MODEL_DIRECTORY",
            Self::Download(_) => "E_DOWNLOAD",
            Self::HttpStatus { .. } => "E_DOWNLOAD_STATUS",
            Self::InvalidPath(_) => "E_MODEL_PATH",
            Self::Io(_) => "E_IO",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Download(_) | Self::HttpStatus { status: 429 | 500..=599, .. })
    }
}

/// Failures while loading a model or generating text.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The engine could not load the model artifact.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The request to the engine failed.
    #[error("inference request failed: {0}")]
    Request(String),

    /// The engine returned a non-success status.
    #[error("inference response error: status {status}: {body}")]
    Response { status: u16, body: String },

    /// The engine response body could not be deserialized.
    #[error("inference response parse failed: {0}")]
    Parse(String),

    /// The engine produced only whitespace.
    #[error("engine returned an empty completion")]
    EmptyCompletion,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for InferenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ModelLoad(_) => "E_MODEL_LOAD",
            Self::Request(_) => "E_INFERENCE_REQUEST",
            Self::Response { .. } => "E_INFERENCE_RESPONSE",
            Self::Parse(_) => "E_INFERENCE_PARSE",
            Self::EmptyCompletion => "E_EMPTY_COMPLETION",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

/// Any failure on the generative path. The only user-visible failure kind.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl ErrorCode for ReplyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Provision(e) => e.error_code(),
            Self::Inference(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Provision(e) => e.retryable(),
            Self::Inference(e) => e.retryable(),
        }
    }
}

// =============================================================================
// COMPLETION CONTRACT
// =============================================================================

/// One `{role, content}` entry of an inference request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

/// Fully-assembled request handed to an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

/// A loaded model able to generate text. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LanguageEngine: Send + Sync {
    /// Generate a reply for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if generation fails.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
