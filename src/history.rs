use crate::api::{ApiError, Backend};
use crate::db::models::{ChatHistory, RemoteId};
use crate::session::Session;

/// Client-side copy of the user's saved conversations.
///
/// Always replaced wholesale from the backend; a failed refresh keeps the
/// previous entries.
#[derive(Debug, Default, Clone)]
pub struct ChatHistoryList {
    entries: Vec<ChatHistory>,
}

impl ChatHistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, entries: Vec<ChatHistory>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[ChatHistory] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, chat_id: &RemoteId) -> Option<&ChatHistory> {
        self.entries
            .iter()
            .find(|c| c.chat_id.as_ref() == Some(chat_id))
    }

    /// Entry by its 1-based position in the list as displayed.
    pub fn nth(&self, position: usize) -> Option<&ChatHistory> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub async fn refresh(
        &mut self,
        backend: &dyn Backend,
        session: &Session,
    ) -> Result<&[ChatHistory], ApiError> {
        let entries = backend.fetch_history(session).await?;
        tracing::debug!("history refreshed: {} conversations", entries.len());
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Delete on the server and drop the entry locally. Callers refresh
    /// afterwards; a failed refresh does not undo the delete.
    pub async fn delete(
        &mut self,
        backend: &dyn Backend,
        session: &Session,
        chat_id: &RemoteId,
    ) -> Result<(), ApiError> {
        backend.delete_history(session, chat_id).await?;
        tracing::info!("deleted conversation {}", chat_id);
        self.entries.retain(|c| c.chat_id.as_ref() != Some(chat_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeBackend};
    use crate::db::models::Message;

    fn chat(id: &str) -> ChatHistory {
        ChatHistory {
            chat_id: Some(RemoteId(id.into())),
            messages: vec![Message::you(format!("message {}", id))],
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_entries() {
        let backend = FakeBackend::default();
        *backend.history.lock().unwrap() = vec![chat("1"), chat("2")];
        let mut list = ChatHistoryList::new();
        list.seed(vec![chat("old")]);

        let session = Session::new("t");
        let entries = list.refresh(&backend, &session).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(list.get(&RemoteId("old".into())).is_none());
        assert_eq!(list.nth(2).unwrap().chat_id, Some(RemoteId("2".into())));
        assert!(list.nth(0).is_none());
        assert!(list.nth(3).is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_entries() {
        let backend = FakeBackend::default();
        *backend.fail_fetch.lock().unwrap() = true;
        let mut list = ChatHistoryList::new();
        list.seed(vec![chat("1")]);
        assert!(list.refresh(&backend, &Session::new("t")).await.is_err());
        assert_eq!(list.entries(), &[chat("1")]);
    }

    #[tokio::test]
    async fn test_delete_drops_entry_locally() {
        let backend = FakeBackend::default();
        *backend.history.lock().unwrap() = vec![chat("1"), chat("2")];
        let mut list = ChatHistoryList::new();
        let session = Session::new("t");
        list.refresh(&backend, &session).await.unwrap();

        list.delete(&backend, &session, &RemoteId("1".into()))
            .await
            .unwrap();

        assert_eq!(list.entries(), &[chat("2")]);
        assert_eq!(
            backend.calls(),
            vec![
                Call::FetchHistory("t".into()),
                Call::DeleteHistory("t".into(), RemoteId("1".into())),
            ]
        );
    }
}
