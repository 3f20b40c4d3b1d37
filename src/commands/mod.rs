//! User actions. Each command returns either its result or the alert text to
//! show the user; nothing here is fatal.

pub mod auth;
pub mod chat;
pub mod image;
pub mod settings;

use crate::api::Backend;
use crate::db::Database;
use crate::session::{Session, SessionStore};
use std::sync::Arc;

pub const NO_TOKEN_ALERT: &str = "No token found! Please log in again.";

pub struct AppState {
    pub db: Database,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(db: Database, backend: Arc<dyn Backend>) -> Self {
        Self { db, backend }
    }

    /// Stored session, or the "please log in" alert.
    pub fn require_session(&self) -> Result<Session, String> {
        self.current_session()?.ok_or_else(|| NO_TOKEN_ALERT.to_string())
    }

    pub fn current_session(&self) -> Result<Option<Session>, String> {
        self.db.load().map_err(|e| e.to_string())
    }
}
