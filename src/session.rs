//! Session token storage.
//!
//! The bearer token obtained at login is loaded once per action and handed to
//! the backend client as a [`Session`], rather than read from shared state at
//! request time.

use crate::db::Database;
use std::sync::Mutex;

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Local storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Bearer credential for authenticated backend calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StoreError>;
    fn store(&self, session: &Session) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

impl SessionStore for Database {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self
            .get_setting(TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(Session::new))
    }

    fn store(&self, session: &Session) -> Result<(), StoreError> {
        self.set_setting(TOKEN_KEY, session.token())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.delete_setting(TOKEN_KEY)?;
        Ok(())
    }
}

/// Process-local store, used where nothing should touch disk.
#[derive(Default)]
pub struct MemorySessionStore {
    current: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone())
    }

    fn store(&self, session: &Session) -> Result<(), StoreError> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SessionStore) {
        assert!(store.load().unwrap().is_none());
        store.store(&Session::new("abc")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Session::new("abc")));
        store.store(&Session::new("def")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token(), "def");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_database_store_lifecycle() {
        let db = Database::in_memory().unwrap();
        exercise(&db);
    }

    #[test]
    fn test_memory_store_lifecycle() {
        exercise(&MemorySessionStore::default());
    }

    #[test]
    fn test_debug_hides_token() {
        let s = Session::new("secret-token");
        assert!(!format!("{:?}", s).contains("secret"));
        assert_eq!(s.bearer(), "Bearer secret-token");
    }
}
