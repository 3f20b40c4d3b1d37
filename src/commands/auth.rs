use super::AppState;
use crate::api::{ApiError, Credentials, Registration};
use crate::db::models::{ChatHistory, RemoteId};
use crate::session::{Session, SessionStore};

const FALLBACK_DETAIL: &str = "Something went wrong!";

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: Option<RemoteId>,
    pub chat_history: Vec<ChatHistory>,
}

fn detail(e: &ApiError) -> &str {
    e.server_message().unwrap_or(FALLBACK_DETAIL)
}

pub async fn login(state: &AppState, email: String, password: String) -> Result<LoginOutcome, String> {
    let credentials = Credentials { email, password };
    let resp = state.backend.login(&credentials).await.map_err(|e| {
        tracing::warn!("login failed: {}", e);
        format!("Login failed: {}", detail(&e))
    })?;

    state
        .db
        .store(&Session::new(resp.access_token))
        .map_err(|e| e.to_string())?;
    if let Err(e) = state.db.replace_chat_cache(&resp.chat_history) {
        tracing::warn!("could not cache chat history: {}", e);
    }
    tracing::info!("logged in as {}", credentials.email);

    Ok(LoginOutcome {
        user_id: resp.user_id,
        chat_history: resp.chat_history,
    })
}

pub async fn register(
    state: &AppState,
    username: String,
    email: String,
    password: String,
) -> Result<(), String> {
    let registration = Registration {
        username,
        email,
        password,
    };
    state.backend.register(&registration).await.map_err(|e| {
        tracing::warn!("registration failed: {}", e);
        format!("Registration failed: {}", detail(&e))
    })?;
    tracing::info!("registered {}", registration.email);
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), String> {
    state.db.clear().map_err(|e| {
        tracing::warn!("logout failed: {}", e);
        "Failed to log out.".to_string()
    })?;
    if let Err(e) = state.db.clear_chat_cache() {
        tracing::warn!("could not clear chat cache: {}", e);
    }
    Ok(())
}
