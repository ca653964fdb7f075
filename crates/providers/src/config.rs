use std::{env, time::Duration};

use chrono_tz::Tz;
use eyre::{Result, eyre};

const DEFAULT_SCHEDULING_URL: &str = "https://api.cal.com";
const DEFAULT_TIME_ZONE: &str = "Europe/Berlin";
const DEFAULT_LOCALE: &str = "de";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Scheduling provider settings.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub api_url: String,
    /// Without a key every call reports the provider as misconfigured.
    pub api_key: Option<String>,
    pub event_type_id: Option<i64>,
    pub time_zone: Tz,
    pub locale: String,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

/// Configuration for the hosted providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub scheduling: SchedulingConfig,
    /// Chat is optional; the chat routes are disabled without it.
    pub chat: Option<ChatConfig>,
    pub auth: AuthConfig,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let event_type_id = var("SCHEDULING_EVENT_TYPE_ID")
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| eyre!("SCHEDULING_EVENT_TYPE_ID must be a valid integer"))
            })
            .transpose()?;

        let time_zone = var("SCHEDULING_TIME_ZONE")
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string())
            .parse::<Tz>()
            .map_err(|e| eyre!("SCHEDULING_TIME_ZONE is not a known time zone: {}", e))?;

        let scheduling = SchedulingConfig {
            api_url: trim_url(var("SCHEDULING_API_URL").unwrap_or_else(|| DEFAULT_SCHEDULING_URL.to_string())),
            api_key: var("SCHEDULING_API_KEY"),
            event_type_id,
            time_zone,
            locale: var("SCHEDULING_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        };

        let chat = match (var("CHAT_API_URL"), var("CHAT_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(ChatConfig {
                api_url: trim_url(api_url),
                api_key,
            }),
            (None, None) => None,
            _ => return Err(eyre!("CHAT_API_URL and CHAT_API_KEY must be set together")),
        };

        let auth = AuthConfig {
            api_url: trim_url(
                var("AUTH_API_URL").ok_or_else(|| eyre!("AUTH_API_URL environment variable not set"))?,
            ),
            api_key: var("AUTH_API_KEY"),
        };

        let timeout = var("PROVIDER_TIMEOUT_SECONDS")
            .map(|secs| {
                secs.parse::<u64>()
                    .map_err(|_| eyre!("PROVIDER_TIMEOUT_SECONDS must be a whole number"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Ok(Self {
            scheduling,
            chat,
            auth,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
