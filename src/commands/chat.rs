use super::{AppState, NO_TOKEN_ALERT};
use crate::conversation::{ConversationManager, StartNewOutcome};
use crate::db::models::ChatHistory;
use crate::history::ChatHistoryList;

/// Everything the chat screen keeps between actions.
#[derive(Debug, Default)]
pub struct ChatState {
    pub conversation: ConversationManager,
    pub history: ChatHistoryList,
}

impl ChatState {
    /// Start from the offline copy of the history list.
    pub fn load(state: &AppState) -> Self {
        let mut history = ChatHistoryList::new();
        match state.db.load_chat_cache() {
            Ok(cached) => history.seed(cached),
            Err(e) => tracing::warn!("could not read chat cache: {}", e),
        }
        Self {
            conversation: ConversationManager::new(),
            history,
        }
    }
}

/// A completed action, plus the alert from the history refresh that followed
/// it when that refresh failed. The action itself stands either way.
#[derive(Debug)]
pub struct Refreshed<T> {
    pub value: T,
    pub refresh_alert: Option<String>,
}

async fn refresh_after<T>(state: &AppState, chat: &mut ChatState, value: T) -> Refreshed<T> {
    let refresh_alert = refresh_history(state, chat).await.err();
    if let Some(alert) = &refresh_alert {
        tracing::warn!("history not refreshed: {}", alert);
    }
    Refreshed {
        value,
        refresh_alert,
    }
}

pub async fn refresh_history(state: &AppState, chat: &mut ChatState) -> Result<usize, String> {
    let session = state.require_session()?;
    let entries = chat
        .history
        .refresh(state.backend.as_ref(), &session)
        .await
        .map_err(|e| {
            tracing::warn!("fetching chat history failed: {}", e);
            if e.is_auth() {
                NO_TOKEN_ALERT.to_string()
            } else {
                "Failed to fetch chat history. Please check your authentication.".to_string()
            }
        })?;
    if let Err(e) = state.db.replace_chat_cache(entries) {
        tracing::warn!("could not cache chat history: {}", e);
    }
    Ok(entries.len())
}

pub async fn send_message(state: &AppState, chat: &mut ChatState, input: &str) -> Result<(), String> {
    chat.conversation
        .send(state.backend.as_ref(), input)
        .await
        .map_err(|e| e.to_string())
}

pub async fn start_new_conversation(
    state: &AppState,
    chat: &mut ChatState,
) -> Result<Refreshed<StartNewOutcome>, String> {
    let session = state.current_session()?;
    let outcome = chat
        .conversation
        .start_new(state.backend.as_ref(), session.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!("saving conversation failed: {}", e);
            if e.is_auth() {
                NO_TOKEN_ALERT.to_string()
            } else {
                "Failed to save the current conversation before starting a new one.".to_string()
            }
        })?;

    if outcome == StartNewOutcome::Saved {
        return Ok(refresh_after(state, chat, outcome).await);
    }
    Ok(Refreshed {
        value: outcome,
        refresh_alert: None,
    })
}

/// Open the saved conversation at a 1-based list position.
pub fn view_chat_history(chat: &mut ChatState, position: usize) -> Result<bool, String> {
    let selected: ChatHistory = chat
        .history
        .nth(position)
        .cloned()
        .ok_or_else(|| format!("No saved conversation at position {}", position))?;
    Ok(chat.conversation.select_historical(&selected))
}

/// Delete the saved conversation at a 1-based list position.
pub async fn delete_chat_history(
    state: &AppState,
    chat: &mut ChatState,
    position: usize,
) -> Result<Refreshed<()>, String> {
    let session = state.require_session()?;
    let chat_id = chat
        .history
        .nth(position)
        .and_then(|c| c.chat_id.clone())
        .ok_or_else(|| format!("No saved conversation at position {}", position))?;

    chat.history
        .delete(state.backend.as_ref(), &session, &chat_id)
        .await
        .map_err(|e| {
            tracing::warn!("deleting chat {} failed: {}", chat_id, e);
            "Failed to delete chat history".to_string()
        })?;
    if let Err(e) = state.db.replace_chat_cache(chat.history.entries()) {
        tracing::warn!("could not cache chat history: {}", e);
    }
    Ok(refresh_after(state, chat, ()).await)
}
