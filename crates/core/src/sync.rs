//! Best-effort write reporting.
//!
//! A [`SyncWarning`] records a write that did not reach one of the storage
//! tiers. It is never surfaced to the end user as a failure; it is logged and,
//! when a channel is attached, forwarded so callers can observe it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTier {
    /// The hosted scheduling provider.
    Scheduling,
    /// The remote structured store.
    Store,
    /// The local cache mirror.
    LocalCache,
}

impl fmt::Display for SyncTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncTier::Scheduling => "scheduling",
            SyncTier::Store => "store",
            SyncTier::LocalCache => "local cache",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWarning {
    pub tier: SyncTier,
    pub operation: String,
    pub subject: String,
    pub message: String,
}

impl SyncWarning {
    pub fn new(
        tier: SyncTier,
        operation: impl Into<String>,
        subject: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            tier,
            operation: operation.into(),
            subject: subject.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sync failed for {} ({}): {}",
            self.tier, self.operation, self.subject, self.message
        )
    }
}

/// Where sync warnings go. Always logged; optionally forwarded.
#[derive(Debug, Clone, Default)]
pub struct WarningSink {
    channel: Option<UnboundedSender<SyncWarning>>,
}

impl WarningSink {
    pub fn new(channel: UnboundedSender<SyncWarning>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    pub fn report(&self, warning: SyncWarning) {
        warn!(
            tier = %warning.tier,
            operation = %warning.operation,
            subject = %warning.subject,
            "{}",
            warning.message
        );
        if let Some(channel) = &self.channel {
            // Receiver may be gone; the log line above is the record then.
            let _ = channel.send(warning);
        }
    }
}
