//! Session verification against the hosted auth provider.

use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use tutorbook_core::{
    errors::ProviderError,
    models::session::{Role, SessionUser},
    ports::SessionVerifier,
};

use crate::{
    config::AuthConfig,
    http::{build_client, read_json, unreachable},
};

pub struct HttpSessionVerifier {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    role: Option<Role>,
    tutor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl From<AuthUser> for SessionUser {
    fn from(user: AuthUser) -> Self {
        SessionUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            // Accounts without a role signed up through the parent flow.
            role: user.user_metadata.role.unwrap_or(Role::Parent),
            tutor_id: user.user_metadata.tutor_id,
        }
    }
}

impl HttpSessionVerifier {
    pub fn new(config: &AuthConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn verify(&self, token: &str) -> std::result::Result<Option<SessionUser>, ProviderError> {
        let mut request = self
            .client
            .get(format!("{}/auth/v1/user", self.api_url))
            .bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await.map_err(unreachable)?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("Auth provider rejected session token");
            return Ok(None);
        }

        let user: AuthUser = read_json(response).await?;
        Ok(Some(user.into()))
    }
}
