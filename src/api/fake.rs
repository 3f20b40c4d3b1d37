use super::{
    ApiError, Backend, Credentials, LoginResponse, OcrRequest, OcrResult, Registration,
    TranslateRequest,
};
use crate::db::models::{ChatHistory, Message, RemoteId};
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(String),
    Register(String),
    FetchHistory(String),
    SaveHistory(String, Vec<Message>),
    DeleteHistory(String, RemoteId),
    Translate(TranslateRequest),
    Ocr(usize),
}

/// Scripted backend that records every call.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub history: Mutex<Vec<ChatHistory>>,
    pub translation: Mutex<Option<String>>,
    pub fail_save: Mutex<bool>,
    pub fail_fetch: Mutex<bool>,
}

impl FakeBackend {
    pub fn translating(to: &str) -> Self {
        let fake = Self::default();
        *fake.translation.lock().unwrap() = Some(to.to_string());
        fake
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn unavailable() -> ApiError {
    ApiError::Rejected {
        status: 503,
        message: "unavailable".into(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(credentials.email.clone()));
        if credentials.password != "secret" {
            return Err(ApiError::Auth("Invalid credentials".into()));
        }
        Ok(LoginResponse {
            access_token: format!("token-for-{}", credentials.email),
            user_id: Some(RemoteId("1".into())),
            chat_history: self.history.lock().unwrap().clone(),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.record(Call::Register(registration.email.clone()));
        Ok(())
    }

    async fn fetch_history(&self, session: &Session) -> Result<Vec<ChatHistory>, ApiError> {
        self.record(Call::FetchHistory(session.token().to_string()));
        if *self.fail_fetch.lock().unwrap() {
            return Err(unavailable());
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn save_history(&self, session: &Session, messages: &[Message]) -> Result<(), ApiError> {
        self.record(Call::SaveHistory(session.token().to_string(), messages.to_vec()));
        if *self.fail_save.lock().unwrap() {
            return Err(unavailable());
        }
        let mut history = self.history.lock().unwrap();
        let id = RemoteId(format!("saved-{}", history.len() + 1));
        history.push(ChatHistory {
            chat_id: Some(id),
            messages: messages.to_vec(),
            timestamp: None,
        });
        Ok(())
    }

    async fn delete_history(&self, session: &Session, chat_id: &RemoteId) -> Result<(), ApiError> {
        self.record(Call::DeleteHistory(session.token().to_string(), chat_id.clone()));
        self.history
            .lock()
            .unwrap()
            .retain(|c| c.chat_id.as_ref() != Some(chat_id));
        Ok(())
    }

    async fn translate_phrase(&self, request: &TranslateRequest) -> Result<String, ApiError> {
        self.record(Call::Translate(request.clone()));
        self.translation.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn ocr_translate(&self, request: &OcrRequest) -> Result<OcrResult, ApiError> {
        self.record(Call::Ocr(request.image.len()));
        Ok(OcrResult {
            extracted_text: "hello".into(),
            translated_text: "hola".into(),
        })
    }
}
