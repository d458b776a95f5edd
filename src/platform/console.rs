//! Console platform used by the `nobotd` binary.
//!
//! Emitted notices go to stdout as `[group] text`; mutes and deletions are
//! logged. Display names are whatever the input script registered.

use async_trait::async_trait;
use dashmap::DashMap;
use std::io::Write;
use tracing::info;

use super::Platform;
use crate::error::{PlatformError, PlatformResult};
use crate::event::GroupMessage;

/// Platform adapter that prints to the terminal.
#[derive(Debug, Default)]
pub struct ConsolePlatform {
    names: DashMap<String, String>,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name for an account.
    pub fn set_name(&self, account: impl Into<String>, name: impl Into<String>) {
        self.names.insert(account.into(), name.into());
    }
}

#[async_trait]
impl Platform for ConsolePlatform {
    async fn resolve_display_name(&self, _event: &GroupMessage, account: &str) -> Option<String> {
        self.names.get(account).map(|name| name.value().clone())
    }

    async fn set_mute(&self, event: &GroupMessage, account: &str, duration_secs: u64) -> PlatformResult {
        if account.is_empty() {
            return Err(PlatformError::InvalidId(account.to_string()));
        }
        if duration_secs == 0 {
            info!(group = %event.group_id, account = %account, "Unmuted");
        } else {
            info!(group = %event.group_id, account = %account, duration_secs, "Muted");
        }
        Ok(())
    }

    async fn delete_message(&self, event: &GroupMessage) -> PlatformResult {
        if event.message_id.is_empty() {
            return Err(PlatformError::InvalidId("<no message id>".to_string()));
        }
        info!(group = %event.group_id, message_id = %event.message_id, "Deleted message");
        Ok(())
    }

    fn is_elevated_role(&self, event: &GroupMessage) -> bool {
        event.sender_role.is_elevated()
    }

    async fn emit(&self, event: &GroupMessage, text: &str) -> PlatformResult {
        let line = format!("[{}] {}\n", event.group_id, text);
        std::io::stdout().write_all(line.as_bytes()).map_err(|e| PlatformError::Rejected {
            call: "emit",
            reason: e.to_string(),
        })
    }
}
