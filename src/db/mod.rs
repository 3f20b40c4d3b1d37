pub mod models;

use models::ChatHistory;
use rusqlite::{params, Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub const DB_FILE_NAME: &str = "phrasebox.db";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(app_dir: &Path) -> Result<Self> {
        if let Err(e) = std::fs::create_dir_all(app_dir) {
            tracing::warn!("could not create data dir {}: {}", app_dir.display(), e);
        }
        let conn = Connection::open(app_dir.join(DB_FILE_NAME))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat_cache (
                position INTEGER PRIMARY KEY,
                chat_id TEXT,
                timestamp TEXT,
                messages TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ── Settings ──

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Chat history cache ──

    /// Replace the offline copy of the history list, keeping server order.
    pub fn replace_chat_cache(&self, chats: &[ChatHistory]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM chat_cache", [])?;
        for (i, chat) in chats.iter().enumerate() {
            let messages = serde_json::to_string(&chat.messages)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            tx.execute(
                "INSERT INTO chat_cache (position, chat_id, timestamp, messages) VALUES (?1, ?2, ?3, ?4)",
                params![
                    i as i64,
                    chat.chat_id.as_ref().map(|id| id.0.as_str()),
                    chat.timestamp,
                    messages
                ],
            )?;
        }
        tx.commit()
    }

    pub fn load_chat_cache(&self) -> Result<Vec<ChatHistory>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT chat_id, timestamp, messages FROM chat_cache ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let chat_id: Option<String> = row.get(0)?;
            let messages: String = row.get(2)?;
            let messages = serde_json::from_str(&messages).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(ChatHistory {
                chat_id: chat_id.map(models::RemoteId),
                timestamp: row.get(1)?,
                messages,
            })
        })?;
        rows.collect()
    }

    pub fn clear_chat_cache(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM chat_cache", [])?;
        Ok(())
    }
}
