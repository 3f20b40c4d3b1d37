use super::{
    ApiError, Backend, Credentials, LoginResponse, OcrRequest, OcrResult, Registration,
    TranslateRequest,
};
use crate::config::BackendConfig;
use crate::db::models::{ChatHistory, Message, RemoteId};
use crate::session::Session;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct ChatHistoryResponse {
    #[serde(default)]
    chat_histories: Vec<ChatHistory>,
}

#[derive(Serialize)]
struct SaveHistoryRequest<'a> {
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedPhrase")]
    translated_phrase: Option<String>,
}

/// HTTP implementation of [`Backend`]. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct BackendClient {
    config: BackendConfig,
    http: Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn chat_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.chat_base_url, path)
    }

    fn image_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.image_base_url, path)
    }
}

/// Turn a non-success status into an error carrying the server's message.
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = error_message(&text);
    tracing::debug!("backend returned {}: {}", status, message);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Auth(message))
        }
        _ => Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Pull a human readable message out of an error body. Servers answer with
/// `message`, `error` or `msg` depending on which layer produced the error.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                return s.clone();
            }
        }
    }
    body.trim().to_string()
}

#[async_trait]
impl Backend for BackendClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        tracing::debug!("POST /login for {}", credentials.email);
        let resp = self
            .http
            .post(self.chat_url("login"))
            .json(credentials)
            .send()
            .await?;
        read_json(check(resp).await?).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        tracing::debug!("POST /register for {}", registration.email);
        let resp = self
            .http
            .post(self.chat_url("register"))
            .json(registration)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn fetch_history(&self, session: &Session) -> Result<Vec<ChatHistory>, ApiError> {
        tracing::debug!("GET /chat-history");
        let resp = self
            .http
            .get(self.chat_url("chat-history"))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        let data: ChatHistoryResponse = read_json(check(resp).await?).await?;
        Ok(data.chat_histories)
    }

    async fn save_history(&self, session: &Session, messages: &[Message]) -> Result<(), ApiError> {
        tracing::debug!("POST /save-chat-history with {} messages", messages.len());
        let resp = self
            .http
            .post(self.chat_url("save-chat-history"))
            .header(AUTHORIZATION, session.bearer())
            .json(&SaveHistoryRequest { messages })
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn delete_history(&self, session: &Session, chat_id: &RemoteId) -> Result<(), ApiError> {
        tracing::debug!("DELETE /delete-chat?chat_id={}", chat_id);
        let resp = self
            .http
            .delete(self.chat_url("delete-chat"))
            .query(&[("chat_id", chat_id.0.as_str())])
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn translate_phrase(&self, request: &TranslateRequest) -> Result<String, ApiError> {
        tracing::debug!("POST /translates ({})", request.language);
        let resp = self
            .http
            .post(self.chat_url("translates"))
            .json(request)
            .send()
            .await?;
        let data: TranslateResponse = read_json(check(resp).await?).await?;
        data.translated_phrase
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Parse("response did not include a translation".into()))
    }

    async fn ocr_translate(&self, request: &OcrRequest) -> Result<OcrResult, ApiError> {
        tracing::debug!(
            "POST /ocr_translate {} bytes {} -> {}",
            request.image.len(),
            request.source_lang,
            request.target_lang
        );
        let image = Part::bytes(request.image.clone())
            .file_name(request.file_name.clone())
            .mime_str(request.mime_type())?;
        let form = Form::new()
            .part("image", image)
            .text("source_lang", request.source_lang.code())
            .text("target_lang", request.target_lang.code());

        let resp = self
            .http
            .post(self.image_url("ocr_translate"))
            .multipart(form)
            .send()
            .await?;
        read_json(check(resp).await?).await
    }
}
