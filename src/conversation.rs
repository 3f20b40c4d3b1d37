//! State of the conversation on screen.
//!
//! Holds the active message list, tracks whether a saved conversation is being
//! viewed (read-only), and runs the translate flow for a chat line.
//!
//! Every reset bumps a generation counter. A translation request remembers the
//! generation it was issued in, and its answer is dropped if the user has
//! started a new conversation or opened a saved one in the meantime.

use crate::api::{ApiError, Backend, TranslateRequest};
use crate::db::models::{ChatHistory, Message, RemoteId, Sender};
use crate::phrase::{detect_language, extract_phrase};
use crate::session::Session;

pub const WELCOME_TEXT: &str = "Welcome! Ask me to translate words.";
pub const NOT_UNDERSTOOD_REPLY: &str = "Sorry, I couldn't understand the request.";
pub const TRANSLATION_FAILED_REPLY: &str =
    "There was an issue with the translation request. Please try again.";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("This is a saved conversation. Start a new conversation to keep chatting.")]
    ReadOnly,
    #[error("Still waiting for the previous reply.")]
    Busy,
}

/// A translation the caller must perform before calling
/// [`ConversationManager::finish_send`]. Until it is handed back to
/// `finish_send` or [`ConversationManager::cancel_send`] the conversation
/// refuses further sends.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "pass to finish_send or cancel_send, or the conversation stays busy"]
pub struct PendingTranslation {
    generation: u64,
    pub request: TranslateRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartNewOutcome {
    /// The previous conversation was saved to the backend.
    Saved,
    /// Nothing needed saving.
    Cleared,
}

#[derive(Debug, Default)]
pub struct ConversationManager {
    messages: Vec<Message>,
    selected: Option<ChatHistory>,
    intro_sent: bool,
    generation: u64,
    in_flight: Option<u64>,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn selected(&self) -> Option<&ChatHistory> {
        self.selected.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn show_welcome(&self) -> bool {
        self.messages.is_empty() && !self.intro_sent
    }

    pub fn input_enabled(&self) -> bool {
        self.selected.is_none()
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Append a message. Blank text is ignored; returns whether anything was added.
    pub fn append_message(&mut self, sender: Sender, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.messages.push(Message {
            sender,
            text: text.to_string(),
        });
        true
    }

    /// Whether the current messages belong to an unsaved conversation.
    pub fn has_unsaved_messages(&self) -> bool {
        !self.messages.is_empty() && self.selected.is_none()
    }

    /// Show a saved conversation read-only. Selecting the one already shown
    /// does nothing. Returns whether the state changed.
    pub fn select_historical(&mut self, chat: &ChatHistory) -> bool {
        if let Some(current) = &self.selected {
            if current.chat_id.is_some() && current.chat_id == chat.chat_id {
                return false;
            }
        }
        self.messages = chat.messages.clone();
        self.selected = Some(chat.clone());
        self.bump();
        tracing::info!(
            "opened saved conversation {}",
            chat.chat_id.as_ref().map(|id| id.0.as_str()).unwrap_or("<unsaved>")
        );
        true
    }

    /// Whether the conversation on screen is the saved one with this id.
    pub fn is_showing(&self, chat_id: &RemoteId) -> bool {
        self.selected
            .as_ref()
            .and_then(|c| c.chat_id.as_ref())
            .is_some_and(|id| id == chat_id)
    }

    /// Save the current conversation if it needs it, then reset to an empty one.
    ///
    /// A failed save leaves everything in place so nothing is lost.
    pub async fn start_new(
        &mut self,
        backend: &dyn Backend,
        session: Option<&Session>,
    ) -> Result<StartNewOutcome, ApiError> {
        let outcome = if self.has_unsaved_messages() {
            let session = session
                .ok_or_else(|| ApiError::Auth("No token found! Please log in again.".into()))?;
            backend.save_history(session, &self.messages).await?;
            tracing::info!("saved conversation with {} messages", self.messages.len());
            StartNewOutcome::Saved
        } else {
            StartNewOutcome::Cleared
        };
        self.reset();
        Ok(outcome)
    }

    /// Drop the current state without saving.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.selected = None;
        self.intro_sent = false;
        self.bump();
    }

    fn bump(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    /// First half of sending a chat line: record the user's message and decide
    /// whether a translation request is needed.
    ///
    /// Returns `Ok(None)` when the line was blank or was answered locally.
    pub fn begin_send(&mut self, input: &str) -> Result<Option<PendingTranslation>, ConversationError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        if !self.input_enabled() {
            return Err(ConversationError::ReadOnly);
        }
        if self.in_flight == Some(self.generation) {
            return Err(ConversationError::Busy);
        }

        self.append_message(Sender::You, input);
        self.intro_sent = true;

        let language = detect_language(input);
        let phrase = extract_phrase(input);
        let (Some(language), false) = (language, phrase.is_empty()) else {
            self.append_message(Sender::Chatbot, NOT_UNDERSTOOD_REPLY);
            return Ok(None);
        };

        self.in_flight = Some(self.generation);
        Ok(Some(PendingTranslation {
            generation: self.generation,
            request: TranslateRequest { phrase, language },
        }))
    }

    /// Second half of sending: apply the backend's answer. Answers from an
    /// earlier generation are discarded; returns whether it was applied.
    pub fn finish_send(
        &mut self,
        pending: PendingTranslation,
        result: Result<String, ApiError>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(
                "dropping stale translation from generation {} (now {})",
                pending.generation,
                self.generation
            );
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(translated) => {
                self.append_message(
                    Sender::Chatbot,
                    &format!("The translated phrase is: {}", translated),
                );
            }
            Err(e) => {
                tracing::warn!("translation failed: {}", e);
                self.append_message(Sender::Chatbot, TRANSLATION_FAILED_REPLY);
            }
        }
        true
    }

    /// Give up on a pending translation without adding a reply. Returns
    /// whether it still belonged to the current generation.
    pub fn cancel_send(&mut self, pending: PendingTranslation) -> bool {
        if pending.generation != self.generation {
            return false;
        }
        tracing::debug!("translation cancelled in generation {}", pending.generation);
        self.in_flight = None;
        true
    }

    /// Send a chat line and wait for the reply.
    pub async fn send(&mut self, backend: &dyn Backend, input: &str) -> Result<(), ConversationError> {
        if let Some(pending) = self.begin_send(input)? {
            let result = backend.translate_phrase(&pending.request).await;
            self.finish_send(pending, result);
        }
        Ok(())
    }
}
