pub mod client;
#[cfg(test)]
pub(crate) mod fake;

use crate::db::models::{ChatHistory, Message, RemoteId};
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use client::BackendClient;

#[derive(Debug, Serialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<RemoteId>,
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<ChatHistory>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TranslateRequest {
    pub phrase: String,
    pub language: String,
}

/// Languages offered for image OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrLanguage {
    English,
    Spanish,
    French,
}

impl OcrLanguage {
    pub fn code(self) -> &'static str {
        match self {
            OcrLanguage::English => "en",
            OcrLanguage::Spanish => "es",
            OcrLanguage::French => "fr",
        }
    }
}

impl fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OcrLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(OcrLanguage::English),
            "es" | "spanish" => Ok(OcrLanguage::Spanish),
            "fr" | "french" => Ok(OcrLanguage::French),
            other => Err(format!("Unsupported language: {} (expected en, es or fr)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub image: Vec<u8>,
    pub file_name: String,
    pub source_lang: OcrLanguage,
    pub target_lang: OcrLanguage,
}

impl OcrRequest {
    pub fn mime_type(&self) -> &'static str {
        let lower = self.file_name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct OcrResult {
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub translated_text: String,
}

/// Remote operations the client depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
    async fn fetch_history(&self, session: &Session) -> Result<Vec<ChatHistory>, ApiError>;
    async fn save_history(&self, session: &Session, messages: &[Message]) -> Result<(), ApiError>;
    async fn delete_history(&self, session: &Session, chat_id: &RemoteId) -> Result<(), ApiError>;
    async fn translate_phrase(&self, request: &TranslateRequest) -> Result<String, ApiError>;
    async fn ocr_translate(&self, request: &OcrRequest) -> Result<OcrResult, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Server error: {status} - {message}")]
    Rejected { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message supplied by the server, when there is one worth showing.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Auth(message) | ApiError::Rejected { message, .. } if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}
