//! Platform capability seam.
//!
//! The moderator never talks to a chat platform directly. Everything it
//! needs (sending text, muting, deleting, nickname lookup, role checks) goes
//! through the [`Platform`] trait, implemented once per supported platform.
//!
//! Mute and delete are best effort: the helpers in this module log and
//! count failures and never hand them back to the caller.

pub mod console;

pub use console::ConsolePlatform;

use crate::error::PlatformResult;
use crate::event::GroupMessage;
use async_trait::async_trait;
use tracing::warn;

/// Capabilities the moderator needs from a chat platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Display name of `account` in the event's group, if the platform knows one.
    async fn resolve_display_name(&self, event: &GroupMessage, account: &str) -> Option<String>;

    /// Mute `account` in the event's group for `duration_secs` (0 lifts the mute).
    async fn set_mute(&self, event: &GroupMessage, account: &str, duration_secs: u64) -> PlatformResult;

    /// Delete (recall) the event's message.
    async fn delete_message(&self, event: &GroupMessage) -> PlatformResult;

    /// Whether the sender is an owner or admin of the group.
    fn is_elevated_role(&self, event: &GroupMessage) -> bool;

    /// Send `text` into the event's conversation.
    async fn emit(&self, event: &GroupMessage, text: &str) -> PlatformResult;
}

/// Display name of `account`, falling back to the raw id.
pub async fn display_name(platform: &dyn Platform, event: &GroupMessage, account: &str) -> String {
    platform
        .resolve_display_name(event, account)
        .await
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| account.to_string())
}

/// Send a notice, logging failures.
pub async fn notify(platform: &dyn Platform, event: &GroupMessage, text: &str) {
    let result = platform.emit(event, text).await;
    swallow("emit", &event.group_id, None, result);
}

/// Mute an account, logging failures. Returns whether the call succeeded.
pub async fn mute(platform: &dyn Platform, event: &GroupMessage, account: &str, duration_secs: u64) -> bool {
    let result = platform.set_mute(event, account, duration_secs).await;
    swallow("set_mute", &event.group_id, Some(account), result)
}

/// Delete the event's message, logging failures. Returns whether the call succeeded.
pub async fn delete(platform: &dyn Platform, event: &GroupMessage) -> bool {
    let result = platform.delete_message(event).await;
    let ok = swallow("delete_message", &event.group_id, Some(event.sender_id.as_str()), result);
    if ok {
        crate::metrics::record_deletion();
    }
    ok
}

fn swallow(call: &'static str, group: &str, account: Option<&str>, result: PlatformResult) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(
                call,
                group = %group,
                account = account.unwrap_or("-"),
                error = %e,
                "Platform call failed"
            );
            crate::metrics::record_platform_error(call, e.error_code());
            false
        }
    }
}
