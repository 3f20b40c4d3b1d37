use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    You,
    Chatbot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::You => f.write_str("You"),
            Sender::Chatbot => f.write_str("Chatbot"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn you(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::You,
            text: text.into(),
        }
    }

    pub fn chatbot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Chatbot,
            text: text.into(),
        }
    }
}

/// Server-assigned identifier. The backend is not consistent about whether
/// ids are JSON strings or numbers, so both are accepted and kept as text.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RemoteId(pub String);

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RemoteId(s),
            Raw::Int(n) => RemoteId(n.to_string()),
            Raw::Uint(n) => RemoteId(n.to_string()),
        })
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        RemoteId(s.to_string())
    }
}

/// A saved conversation as stored by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatHistory {
    #[serde(default)]
    pub chat_id: Option<RemoteId>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

const PREVIEW_CHARS: usize = 30;

impl ChatHistory {
    /// Date portion of the timestamp, or the raw value when it is not a
    /// format we recognise.
    pub fn display_date(&self) -> String {
        let Some(raw) = self.timestamp.as_deref() else {
            return String::new();
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt.format("%Y-%m-%d").to_string();
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return dt.format("%Y-%m-%d").to_string();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return dt.format("%Y-%m-%d").to_string();
        }
        raw.to_string()
    }

    /// First characters of the opening message, as shown in the history list.
    pub fn preview(&self) -> String {
        let first = self
            .messages
            .first()
            .map(|m| m.text.chars().take(PREVIEW_CHARS).collect::<String>())
            .unwrap_or_default();
        format!("{}...", first)
    }
}
