//! Client for the hosted chat provider's REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use eyre::Result;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use tutorbook_core::{
    errors::ProviderError,
    models::chat::{ChannelKey, ChatMessage},
    ports::ChatProvider,
};

use crate::{
    config::ChatConfig,
    http::{build_client, check_status, read_json, unreachable},
};

pub struct HttpChatClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    messages: Vec<ChatMessage>,
}

impl HttpChatClient {
    pub fn new(config: &ChatConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_key)
    }

    fn user_path(user_id: &str, action: &str) -> String {
        format!("/users/{}/{}", urlencoding::encode(user_id), action)
    }

    fn channel_path(key: &ChannelKey) -> String {
        format!("/channels/{}", urlencoding::encode(key.as_str()))
    }
}

#[async_trait]
impl ChatProvider for HttpChatClient {
    async fn connect_user(&self, user_id: &str) -> std::result::Result<(), ProviderError> {
        let response = self
            .request(Method::POST, &Self::user_path(user_id, "connect"))
            .send()
            .await
            .map_err(unreachable)?;
        check_status(response).await?;
        Ok(())
    }

    async fn disconnect_user(&self, user_id: &str) -> std::result::Result<(), ProviderError> {
        let response = self
            .request(Method::POST, &Self::user_path(user_id, "disconnect"))
            .send()
            .await
            .map_err(unreachable)?;
        check_status(response).await?;
        Ok(())
    }

    async fn ensure_channel(
        &self,
        key: &ChannelKey,
        members: &[String],
    ) -> std::result::Result<(), ProviderError> {
        debug!("Ensuring chat channel {}", key);

        // PUT is idempotent on the provider side.
        let response = self
            .request(Method::PUT, &Self::channel_path(key))
            .json(&json!({ "members": members }))
            .send()
            .await
            .map_err(unreachable)?;
        check_status(response).await?;
        Ok(())
    }

    async fn send_message(
        &self,
        key: &ChannelKey,
        sender_id: &str,
        text: &str,
    ) -> std::result::Result<ChatMessage, ProviderError> {
        let response = self
            .request(Method::POST, &format!("{}/messages", Self::channel_path(key)))
            .json(&json!({ "sender_id": sender_id, "text": text }))
            .send()
            .await
            .map_err(unreachable)?;
        read_json(response).await
    }

    async fn fetch_messages(
        &self,
        key: &ChannelKey,
        since: Option<DateTime<Utc>>,
    ) -> std::result::Result<Vec<ChatMessage>, ProviderError> {
        let mut request = self.request(Method::GET, &format!("{}/messages", Self::channel_path(key)));
        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339_opts(SecondsFormat::Millis, true))]);
        }

        let response = request.send().await.map_err(unreachable)?;
        let page: MessagePage = read_json(response).await?;

        let mut messages = page.messages;
        // The provider filters inclusively; callers expect strictly newer.
        if let Some(since) = since {
            messages.retain(|m| m.created_at > since);
        }
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}
