use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use tutorbook_core::{
    chat::ChatSession,
    errors::{BookingError, ProviderError},
    models::chat::{ChannelKey, ChatMessage},
    ports::ChatProvider,
};

/// Provider keeping channels and messages in memory.
#[derive(Default)]
struct InMemoryChat {
    connected: Mutex<Vec<String>>,
    channels: Mutex<Vec<(ChannelKey, Vec<String>)>>,
    messages: Mutex<Vec<ChatMessage>>,
    fetches: Mutex<usize>,
}

#[async_trait]
impl ChatProvider for InMemoryChat {
    async fn connect_user(&self, user_id: &str) -> Result<(), ProviderError> {
        self.connected.lock().unwrap().push(user_id.to_string());
        Ok(())
    }

    async fn disconnect_user(&self, user_id: &str) -> Result<(), ProviderError> {
        self.connected.lock().unwrap().retain(|u| u != user_id);
        Ok(())
    }

    async fn ensure_channel(&self, key: &ChannelKey, members: &[String]) -> Result<(), ProviderError> {
        let mut channels = self.channels.lock().unwrap();
        if !channels.iter().any(|(k, _)| k == key) {
            channels.push((key.clone(), members.to_vec()));
        }
        Ok(())
    }

    async fn send_message(
        &self,
        key: &ChannelKey,
        sender_id: &str,
        text: &str,
    ) -> Result<ChatMessage, ProviderError> {
        let mut messages = self.messages.lock().unwrap();
        let message = ChatMessage {
            id: format!("m{}", messages.len() + 1),
            channel: key.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn fetch_messages(
        &self,
        key: &ChannelKey,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>, ProviderError> {
        *self.fetches.lock().unwrap() += 1;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.channel == key && since.is_none_or(|s| m.created_at > s))
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn test_both_sides_share_one_channel() {
    let provider = Arc::new(InMemoryChat::default());

    let mut parent = ChatSession::new(provider.clone());
    parent.connect("parent-1").await.unwrap();
    parent.send("anna-schmidt", "Hallo!").await.unwrap();

    let mut tutor = ChatSession::new(provider.clone());
    tutor.connect("anna-schmidt").await.unwrap();
    tutor.send("parent-1", "Guten Tag").await.unwrap();

    assert_eq!(provider.channels.lock().unwrap().len(), 1);
    let history = parent.history("anna-schmidt", None).await.unwrap();
    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Hallo!", "Guten Tag"]);
}

#[tokio::test]
async fn test_session_lifecycle_is_explicit() {
    let provider = Arc::new(InMemoryChat::default());
    let mut session = ChatSession::new(provider.clone());

    assert!(matches!(
        session.send("anna-schmidt", "Hallo").await,
        Err(BookingError::Validation(_))
    ));

    session.connect("parent-1").await.unwrap();
    session.connect("parent-2").await.unwrap();
    assert_eq!(*provider.connected.lock().unwrap(), vec!["parent-2".to_string()]);

    session.disconnect().await.unwrap();
    assert!(provider.connected.lock().unwrap().is_empty());
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn test_blank_messages_and_self_chat_are_rejected() {
    let provider = Arc::new(InMemoryChat::default());
    let mut session = ChatSession::new(provider);
    session.connect("parent-1").await.unwrap();

    assert!(matches!(session.send("anna-schmidt", "   ").await, Err(BookingError::Validation(_))));
    assert!(matches!(session.send("parent-1", "hi").await, Err(BookingError::Validation(_))));
}

#[tokio::test]
async fn test_poller_delivers_new_messages_until_stopped() {
    let provider = Arc::new(InMemoryChat::default());
    let mut parent = ChatSession::new(provider.clone());
    parent.connect("parent-1").await.unwrap();
    let mut tutor = ChatSession::new(provider.clone());
    tutor.connect("anna-schmidt").await.unwrap();

    parent.send("anna-schmidt", "first").await.unwrap();
    let mut poller = tutor
        .poll("parent-1", Duration::from_millis(10))
        .await
        .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(2), poller.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.text, "first");

    tokio::time::sleep(Duration::from_millis(5)).await;
    parent.send("anna-schmidt", "second").await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(2), poller.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.text, "second");

    poller.stop();
    let fetches = *provider.fetches.lock().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*provider.fetches.lock().unwrap(), fetches);
}

#[tokio::test]
async fn test_poller_delivers_messages_sharing_a_timestamp() {
    let provider = Arc::new(InMemoryChat::default());
    let key = ChannelKey::for_pair("parent-1", "anna-schmidt");
    let sent_at = Utc::now();
    for (id, text) in [("m1", "Hallo"), ("m2", "Wann passt es?")] {
        provider.messages.lock().unwrap().push(ChatMessage {
            id: id.to_string(),
            channel: key.clone(),
            sender_id: "parent-1".to_string(),
            text: text.to_string(),
            created_at: sent_at,
        });
    }

    let mut tutor = ChatSession::new(provider.clone());
    tutor.connect("anna-schmidt").await.unwrap();
    let mut poller = tutor
        .poll("parent-1", Duration::from_millis(10))
        .await
        .unwrap();

    let mut delivered = Vec::new();
    for _ in 0..2 {
        let message = tokio::time::timeout(Duration::from_secs(2), poller.next())
            .await
            .unwrap()
            .unwrap();
        delivered.push(message.id);
    }
    assert_eq!(delivered, vec!["m1".to_string(), "m2".to_string()]);

    // Later polls must not repeat either message.
    assert!(
        tokio::time::timeout(Duration::from_millis(60), poller.next())
            .await
            .is_err()
    );
    poller.stop();
}
