//! Platform fake that records every call.

use async_trait::async_trait;
use nobot::error::{PlatformError, PlatformResult};
use nobot::event::GroupMessage;
use nobot::platform::Platform;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Emit(String),
    Mute { account: String, secs: u64 },
    Delete(String),
}

#[derive(Default)]
pub struct RecordingPlatform {
    actions: Mutex<Vec<Action>>,
    names: Mutex<HashMap<String, String>>,
    fail_mute: AtomicBool,
}

#[allow(dead_code)]
impl RecordingPlatform {
    pub fn set_name(&self, account: &str, name: &str) {
        self.names.lock().insert(account.to_string(), name.to_string());
    }

    pub fn fail_mutes(&self, fail: bool) {
        self.fail_mute.store(fail, Ordering::Relaxed);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().clone()
    }

    /// Only the emitted texts, in order.
    pub fn emitted(&self) -> Vec<String> {
        self.actions
            .lock()
            .iter()
            .filter_map(|a| match a {
                Action::Emit(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.actions.lock().clear();
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn resolve_display_name(&self, _event: &GroupMessage, account: &str) -> Option<String> {
        self.names.lock().get(account).cloned()
    }

    async fn set_mute(&self, _event: &GroupMessage, account: &str, duration_secs: u64) -> PlatformResult {
        if self.fail_mute.load(Ordering::Relaxed) {
            return Err(PlatformError::Rejected {
                call: "set_mute",
                reason: "bot is not an admin".into(),
            });
        }
        self.actions.lock().push(Action::Mute {
            account: account.to_string(),
            secs: duration_secs,
        });
        Ok(())
    }

    async fn delete_message(&self, event: &GroupMessage) -> PlatformResult {
        self.actions.lock().push(Action::Delete(event.message_id.clone()));
        Ok(())
    }

    fn is_elevated_role(&self, event: &GroupMessage) -> bool {
        event.sender_role.is_elevated()
    }

    async fn emit(&self, _event: &GroupMessage, text: &str) -> PlatformResult {
        self.actions.lock().push(Action::Emit(text.to_string()));
        Ok(())
    }
}
