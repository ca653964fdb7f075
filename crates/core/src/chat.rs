//! Parent/tutor conversations on top of a [`ChatProvider`].

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    errors::{BookingError, BookingResult},
    models::chat::{ChannelKey, ChatMessage},
    ports::ChatProvider,
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// A chat connection owned by one user. Created explicitly and passed to
/// whoever needs it; nothing is shared behind the caller's back.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    user_id: Option<String>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            user_id: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Connects as `user_id`, dropping any connection held for another user.
    pub async fn connect(&mut self, user_id: &str) -> BookingResult<()> {
        if self.user_id.as_deref() == Some(user_id) {
            return Ok(());
        }
        self.disconnect().await?;
        self.provider.connect_user(user_id).await?;
        info!("Chat connected as {}", user_id);
        self.user_id = Some(user_id.to_string());
        Ok(())
    }

    pub async fn disconnect(&mut self) -> BookingResult<()> {
        if let Some(user_id) = self.user_id.take() {
            self.provider.disconnect_user(&user_id).await?;
            debug!("Chat disconnected for {}", user_id);
        }
        Ok(())
    }

    fn me(&self) -> BookingResult<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| BookingError::Validation("Chat session is not connected".to_string()))
    }

    /// Creates or reuses the channel between the session user and `peer_id`.
    pub async fn open_conversation(&self, peer_id: &str) -> BookingResult<ChannelKey> {
        let me = self.me()?;
        if peer_id.trim().is_empty() || peer_id == me {
            return Err(BookingError::Validation(
                "A conversation needs another participant".to_string(),
            ));
        }
        let key = ChannelKey::for_pair(me, peer_id);
        let members = [me.to_string(), peer_id.to_string()];
        self.provider.ensure_channel(&key, &members).await?;
        Ok(key)
    }

    pub async fn send(&self, peer_id: &str, text: &str) -> BookingResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BookingError::Validation("Message text is empty".to_string()));
        }
        let key = self.open_conversation(peer_id).await?;
        Ok(self.provider.send_message(&key, self.me()?, text).await?)
    }

    pub async fn history(
        &self,
        peer_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> BookingResult<Vec<ChatMessage>> {
        let key = self.open_conversation(peer_id).await?;
        Ok(self.provider.fetch_messages(&key, since).await?)
    }

    /// Starts re-fetching the conversation every `interval` until the poller
    /// is stopped or dropped.
    pub async fn poll(&self, peer_id: &str, interval: Duration) -> BookingResult<ConversationPoller> {
        let key = self.open_conversation(peer_id).await?;
        Ok(ConversationPoller::spawn(Arc::clone(&self.provider), key, interval))
    }
}

/// Background re-fetch of one open conversation.
pub struct ConversationPoller {
    handle: JoinHandle<()>,
    messages: mpsc::Receiver<ChatMessage>,
}

impl ConversationPoller {
    fn spawn(provider: Arc<dyn ChatProvider>, key: ChannelKey, interval: Duration) -> Self {
        let (tx, messages) = mpsc::channel(64);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_seen: Option<DateTime<Utc>> = None;
            // Ids delivered at `last_seen`, for providers that answer inclusively.
            let mut at_last_seen: HashSet<String> = HashSet::new();
            loop {
                ticker.tick().await;
                let batch = match provider.fetch_messages(&key, last_seen).await {
                    Ok(batch) => batch,
                    Err(e) => {
                        warn!("Polling {} failed: {}", key, e);
                        continue;
                    }
                };
                for message in batch {
                    match last_seen {
                        Some(seen) if message.created_at < seen => continue,
                        Some(seen) if message.created_at == seen => {
                            if !at_last_seen.insert(message.id.clone()) {
                                continue;
                            }
                        }
                        _ => {
                            last_seen = Some(message.created_at);
                            at_last_seen.clear();
                            at_last_seen.insert(message.id.clone());
                        }
                    }
                    if tx.send(message).await.is_err() {
                        return;
                    }
                }
            }
        });
        Self { handle, messages }
    }

    pub async fn next(&mut self) -> Option<ChatMessage> {
        self.messages.recv().await
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for ConversationPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
