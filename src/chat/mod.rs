//! Conversation controller: sequences one learner turn end to end.
//!
//! DESIGN
//! ======
//! A submission appends the user message and a sentinel placeholder as one
//! visible transition, tries the symbolic resolver, and only falls back to
//! the on-device model when the resolver declines. The reply replaces the
//! placeholder in place. Model-path failures become a fixed apology; the
//! diagnostic goes to the log, never to the chat.
//!
//! CONCURRENCY
//! ===========
//! A single-flight flag rejects re-entrant submissions without queuing.
//! History lives behind a `std::sync::Mutex` that is never held across an
//! await. The session manager is shared through an async mutex so several
//! conversations in one process serialize their `get_session`/`completion`
//! pairs. Every transition is persisted, then published on a watch channel.

pub mod message;
pub mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::ErrorCode;
use crate::math;
use crate::model::session::{self, CompletionParams, DEFAULT_TEMPERATURE, SessionManager};
use crate::model::types::{PromptMessage, ReplyError};
use crate::model::SizeClass;
use message::{APOLOGY, Message, prune};
use store::{KeyValueStore, StoreError};

/// Prior messages sent to the model alongside the new user message.
pub const DEFAULT_CONTEXT_WINDOW: usize = 6;

/// Tunables fixed for the lifetime of a conversation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversationSettings {
    pub context_window: usize,
    pub temperature: f32,
    pub model_choice: SizeClass,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            temperature: DEFAULT_TEMPERATURE,
            model_choice: SizeClass::default(),
        }
    }
}

struct ChatState {
    messages: Vec<Message>,
    model_choice: SizeClass,
}

/// Storage key for a profile's history.
#[must_use]
pub fn history_key(profile: &str) -> String {
    format!("chat:{profile}")
}

pub struct Conversation {
    store: Arc<dyn KeyValueStore>,
    key: String,
    sessions: Arc<tokio::sync::Mutex<SessionManager>>,
    context_window: usize,
    temperature: f32,
    state: Mutex<ChatState>,
    in_flight: AtomicBool,
    snapshots: watch::Sender<Vec<Message>>,
}

/// Clears the single-flight flag when the turn ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Conversation {
    /// Restore the history under `key` and build a controller over it.
    ///
    /// A placeholder left behind by an interrupted turn is dropped. An
    /// unreadable history is logged and replaced by an empty one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store itself cannot be read.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        key: String,
        sessions: Arc<tokio::sync::Mutex<SessionManager>>,
        settings: ConversationSettings,
    ) -> Result<Self, StoreError> {
        let mut messages = match store.get(&key).await? {
            Some(text) => serde_json::from_str::<Vec<Message>>(&text).unwrap_or_else(|e| {
                warn!(%key, error = %e, "chat: stored history unreadable, starting fresh");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let before = messages.len();
        messages.retain(|m| !m.is_placeholder());
        if messages.len() != before {
            info!(%key, dropped = before - messages.len(), "chat: dropped stale placeholder");
        }
        prune(&mut messages);
        info!(%key, restored = messages.len(), model = %settings.model_choice, "chat: opened");

        let (snapshots, _) = watch::channel(messages.clone());
        Ok(Self {
            store,
            key,
            sessions,
            context_window: settings.context_window,
            temperature: settings.temperature,
            state: Mutex::new(ChatState { messages, model_choice: settings.model_choice }),
            in_flight: AtomicBool::new(false),
            snapshots,
        })
    }

    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightGuard(&self.in_flight))
    }

    /// Current history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    #[must_use]
    pub fn model_choice(&self) -> SizeClass {
        self.state().model_choice
    }

    /// Receiver that sees one history snapshot per visible transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.snapshots.subscribe()
    }

    /// Pick the model for subsequent generative replies.
    pub fn set_model_choice(&self, size: SizeClass) {
        let previous = std::mem::replace(&mut self.state().model_choice, size);
        if previous != size {
            info!(key = %self.key, from = %previous, to = %size, "chat: model choice changed");
        }
    }

    /// Empty the history. Returns `false` while a turn is in flight.
    pub async fn clear_history(&self) -> bool {
        let Some(_guard) = self.try_begin() else {
            debug!(key = %self.key, "chat: clear rejected, request in flight");
            return false;
        };
        let snapshot = {
            let mut state = self.state();
            state.messages.clear();
            state.messages.clone()
        };
        info!(key = %self.key, "chat: history cleared");
        self.commit(snapshot).await;
        true
    }

    /// Handle one learner submission.
    ///
    /// Returns `false` without touching history for blank input or while
    /// another submission is in flight. Never fails: model errors become
    /// the apology message.
    pub async fn on_user_submit(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!(key = %self.key, "chat: empty submission ignored");
            return false;
        }
        let Some(_guard) = self.try_begin() else {
            debug!(key = %self.key, "chat: submission rejected, request in flight");
            return false;
        };

        let user = Message::user(text);
        let (snapshot, context, choice) = {
            let mut state = self.state();
            // A cancelled turn leaves its placeholder behind.
            let before = state.messages.len();
            state.messages.retain(|m| !m.is_placeholder());
            if state.messages.len() != before {
                warn!(key = %self.key, "chat: dropped placeholder from an abandoned turn");
            }
            let start = state.messages.len().saturating_sub(self.context_window);
            let mut context: Vec<PromptMessage> = state.messages[start..].iter().map(Message::to_prompt).collect();
            context.push(user.to_prompt());

            state.messages.push(user);
            state.messages.push(Message::placeholder());
            prune(&mut state.messages);
            (state.messages.clone(), context, state.model_choice)
        };
        info!(key = %self.key, len = text.len(), "chat: submission accepted");
        self.commit(snapshot).await;

        let reply = match math::resolve(text) {
            Some(resolution) => {
                info!(key = %self.key, answer = %resolution.answer, "chat: deterministic reply");
                resolution.render()
            }
            None => match self.generate(&context, choice).await {
                Ok(reply) => {
                    info!(key = %self.key, model = %choice, len = reply.len(), "chat: model reply");
                    reply
                }
                Err(e) => {
                    error!(
                        key = %self.key,
                        error = %e,
                        error_code = e.error_code(),
                        retryable = e.retryable(),
                        "chat: reply failed"
                    );
                    APOLOGY.to_string()
                }
            },
        };

        let snapshot = {
            let mut state = self.state();
            let reply = Message::assistant(reply);
            match state.messages.iter().rposition(Message::is_placeholder) {
                Some(index) => state.messages[index] = reply,
                None => state.messages.push(reply),
            }
            state.messages.clone()
        };
        self.commit(snapshot).await;
        true
    }

    async fn generate(&self, context: &[PromptMessage], choice: SizeClass) -> Result<String, ReplyError> {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions.get_session(choice).await?;
        debug!(key = %self.key, generation = handle.generation(), uri = %handle.model().uri, "chat: generating");
        let params = CompletionParams { temperature: self.temperature };
        Ok(session::completion(handle, context, params).await?)
    }

    /// Persist `snapshot`, then publish it. A store failure is logged and
    /// the in-memory history stays authoritative.
    async fn commit(&self, snapshot: Vec<Message>) {
        if let Err(e) = self.persist(&snapshot).await {
            warn!(key = %self.key, error = %e, error_code = e.error_code(), "chat: persist failed");
        }
        self.snapshots.send_replace(snapshot);
    }

    async fn persist(&self, snapshot: &[Message]) -> Result<(), StoreError> {
        let value = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &value).await
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
