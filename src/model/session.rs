//! Inference session manager: one live engine handle, keyed by size class.
//!
//! ARCHITECTURE
//! ============
//! `SessionManager` exclusively owns the only loaded engine. Asking for the
//! cached size class returns it unchanged; asking for the other one drops
//! the old handle before the new model is provisioned and loaded, so two
//! models are never resident together. Handles are lent out as borrows of
//! the manager, which stops callers from holding a superseded one.
//!
//! The manager has no internal locking. Callers that share it across
//! conversations wrap it in a mutex.

use std::sync::Arc;

use tracing::{debug, info};

use super::artifact::{LocalModel, SizeClass};
use super::provision::ModelProvisioner;
use super::types::{CompletionRequest, InferenceError, LanguageEngine, PromptMessage, ReplyError};

/// Fixed tutor persona prepended to every request.
pub const SYSTEM_PROMPT: &str = "You are a kind, concise, encouraging K-12 tutor. \
     Explain ideas step by step in simple language, check understanding, \
     and never just hand over answers to homework without explaining them.";

/// Cap on generated tokens per reply.
pub const MAX_NEW_TOKENS: u32 = 200;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// End-of-turn markers used by common chat templates.
pub const STOP_SEQUENCES: [&str; 5] = ["</s>", "<|end|>", "<|eot_id|>", "<|end_of_text|>", "<|im_end|>"];

// =============================================================================
// LOADER
// =============================================================================

/// Turns a provisioned artifact into a live engine. Enables mocking in tests.
#[async_trait::async_trait]
pub trait EngineLoader: Send + Sync {
    /// Load `model` into memory.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the model cannot be loaded.
    async fn load(&self, model: &LocalModel) -> Result<Box<dyn LanguageEngine>, InferenceError>;
}

// =============================================================================
// SESSION
// =============================================================================

/// A loaded engine plus what it was loaded from.
pub struct InferenceSession {
    size_class: SizeClass,
    model: LocalModel,
    /// Monotonic load counter; a new value means a fresh engine.
    generation: u64,
    engine: Box<dyn LanguageEngine>,
}

impl InferenceSession {
    #[must_use]
    pub fn size_class(&self) -> SizeClass {
        self.size_class
    }

    #[must_use]
    pub fn model(&self) -> &LocalModel {
        &self.model
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Caller-tunable generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct SessionManager {
    provisioner: ModelProvisioner,
    loader: Arc<dyn EngineLoader>,
    current: Option<InferenceSession>,
    loads: u64,
}

impl SessionManager {
    #[must_use]
    pub fn new(provisioner: ModelProvisioner, loader: Arc<dyn EngineLoader>) -> Self {
        Self { provisioner, loader, current: None, loads: 0 }
    }

    #[must_use]
    pub fn provisioner(&self) -> &ModelProvisioner {
        &self.provisioner
    }

    /// Size class of the resident engine, if any.
    #[must_use]
    pub fn loaded(&self) -> Option<SizeClass> {
        self.current.as_ref().map(InferenceSession::size_class)
    }

    /// Drop the resident engine.
    pub fn release(&mut self) {
        if let Some(old) = self.current.take() {
            info!(size = %old.size_class, generation = old.generation, "session released");
        }
    }

    /// Return the engine for `size`, loading it if the cached one differs.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplyError`] if provisioning or loading fails. The
    /// previous engine is already released at that point.
    pub async fn get_session(&mut self, size: SizeClass) -> Result<&InferenceSession, ReplyError> {
        let session = match self.current.take() {
            Some(cached) if cached.size_class == size => {
                debug!(size = %size, generation = cached.generation, "session reused");
                cached
            }
            stale => {
                if let Some(old) = stale {
                    info!(from = %old.size_class, to = %size, "session swap: releasing previous engine");
                    drop(old);
                }
                let model = self.provisioner.ensure_model(size).await?;
                let engine = self.loader.load(&model).await?;
                self.loads += 1;
                info!(size = %size, generation = self.loads, uri = %model.uri, "session loaded");
                InferenceSession { size_class: size, model, generation: self.loads, engine }
            }
        };
        Ok(&*self.current.insert(session))
    }
}

// =============================================================================
// COMPLETION
// =============================================================================

/// Assemble the tutor request around `messages` and run it on `session`.
///
/// # Errors
///
/// Returns an [`InferenceError`] if the engine fails or produces nothing.
pub async fn completion(
    session: &InferenceSession,
    messages: &[PromptMessage],
    params: CompletionParams,
) -> Result<String, InferenceError> {
    let request = build_request(messages, params);
    let text = session.engine.complete(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(InferenceError::EmptyCompletion);
    }
    Ok(text.to_string())
}

pub(crate) fn build_request(messages: &[PromptMessage], params: CompletionParams) -> CompletionRequest {
    let mut all = Vec::with_capacity(messages.len() + 1);
    all.push(PromptMessage::new("system", SYSTEM_PROMPT));
    all.extend_from_slice(messages);
    CompletionRequest {
        messages: all,
        max_tokens: MAX_NEW_TOKENS,
        temperature: params.temperature,
        stop: STOP_SEQUENCES.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
