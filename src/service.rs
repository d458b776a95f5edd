//! The moderator: single entry point for group messages.
//!
//! [`Moderator::handle_message`] runs, in order:
//! 1. skip messages sent by the moderator itself
//! 2. swallow ignored commands from non-elevated members
//! 3. admin commands
//! 4. probe classification (while the group is being probed)
//! 5. enforcement (skipped for a sender newly tagged by step 4 on this message)
//!
//! Nothing here returns an error; platform failures are logged where they
//! happen. The caller gets an [`EventControl`] telling it whether other
//! handlers may still see the event.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{Instrument, debug, info};

use crate::SharedStore;
use crate::commands::{self, GroupCommand};
use crate::config::{CommandsConfig, Config};
use crate::detection::{Detector, ProbeOutcome};
use crate::enforcement::{EnforcementOutcome, Enforcer};
use crate::event::GroupMessage;
use crate::platform::{self, Platform};
use crate::telemetry::{CommandTimer, spans};

pub const NOTICE_ENFORCEMENT_ON: &str = "Bot enforcement enabled in this group";
pub const NOTICE_ENFORCEMENT_OFF: &str = "Bot enforcement disabled in this group";
pub const NOTICE_NO_BOTS: &str = "No tagged bots in this group";

/// Whether the host should pass the event on to other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventControl {
    Continue,
    Stop,
}

/// What the moderator did with one message, for the caller and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Sent by the moderator itself.
    OwnMessage,
    /// An ignored command from a regular member.
    IgnoredCommand,
    /// An admin command the sender may not run.
    Denied(GroupCommand),
    /// An admin command, with the probe outcome for detect.
    Command(GroupCommand, Option<ProbeOutcome>),
    /// The sender was newly tagged by probe classification.
    Classified,
    /// Passed through enforcement.
    Enforced(EnforcementOutcome),
}

impl Handled {
    pub fn control(self) -> EventControl {
        match self {
            Self::IgnoredCommand | Self::Denied(_) | Self::Command(..) => EventControl::Stop,
            Self::Enforced(outcome) if outcome.stops_event() => EventControl::Stop,
            _ => EventControl::Continue,
        }
    }
}

/// Bot detection and enforcement for every group the platform delivers.
pub struct Moderator {
    store: SharedStore,
    platform: Arc<dyn Platform>,
    detector: Detector,
    enforcer: Enforcer,
    commands: CommandsConfig,
}

impl Moderator {
    pub fn new(config: &Config, store: SharedStore, platform: Arc<dyn Platform>) -> Self {
        Self {
            detector: Detector::new(
                store.clone(),
                platform.clone(),
                &config.detection,
                &config.enforcement,
            ),
            enforcer: Enforcer::new(store.clone(), platform.clone(), &config.enforcement),
            commands: config.commands.clone(),
            store,
            platform,
        }
    }

    /// Shared record store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Handle one group message; returns whether other handlers may see it.
    pub async fn handle_message(&self, event: &GroupMessage) -> EventControl {
        self.process(event).await.control()
    }

    /// Handle one group message and report what was done.
    pub async fn process(&self, event: &GroupMessage) -> Handled {
        crate::metrics::record_event();
        let span = spans::group_event(&event.group_id, &event.sender_id, &event.message_id);
        let handled = self.dispatch(event).instrument(span).await;
        if handled.control() == EventControl::Stop {
            crate::metrics::record_event_stopped();
        }
        handled
    }

    async fn dispatch(&self, event: &GroupMessage) -> Handled {
        if event.is_from_self() {
            return Handled::OwnMessage;
        }

        let elevated = self.platform.is_elevated_role(event);
        if !elevated && commands::is_ignored(&event.text, &self.commands) {
            debug!(text = %event.text, "Swallowed ignored command");
            return Handled::IgnoredCommand;
        }

        if let Some(command) = GroupCommand::parse(&event.text, &self.commands) {
            if command.requires_elevation() && !elevated {
                debug!(command = command.name(), "Admin command from non-elevated sender");
                return Handled::Denied(command);
            }
            let probe = self.run_command(command, event).await;
            return Handled::Command(command, probe);
        }

        // Accounts tagged before this message are still judged
        if let Some(verdict) = self.detector.classify_reply(event).await
            && verdict.newly_tagged
        {
            return Handled::Classified;
        }

        Handled::Enforced(self.enforcer.enforce(event).await)
    }

    async fn run_command(&self, command: GroupCommand, event: &GroupMessage) -> Option<ProbeOutcome> {
        let _timer = CommandTimer::new(command.name());
        let platform = self.platform.as_ref();
        let group = event.group_id.as_str();
        info!(command = command.name(), "Admin command");

        match command {
            GroupCommand::Detect => return Some(self.detector.invoke(event).await),
            GroupCommand::Tag => {
                for account in event.mentions() {
                    let newly = self.store.lock().tag(group, &account);
                    if newly {
                        crate::metrics::record_tag("command");
                        let name = platform::display_name(platform, event, &account).await;
                        platform::notify(platform, event, &format!("Tagged [{name}] as a bot")).await;
                    }
                }
            }
            GroupCommand::Untag => {
                for account in event.mentions() {
                    if self.store.lock().untag(group, &account) {
                        crate::metrics::record_untag();
                    }
                    platform::mute(platform, event, &account, 0).await;
                    let name = platform::display_name(platform, event, &account).await;
                    platform::notify(platform, event, &format!("Removed the bot tag from [{name}]")).await;
                }
            }
            GroupCommand::List => {
                let ids = self.store.lock().tagged_account_ids(group);
                let text = if ids.is_empty() {
                    NOTICE_NO_BOTS.to_string()
                } else {
                    let names =
                        join_all(ids.iter().map(|id| platform::display_name(platform, event, id))).await;
                    format!("Tagged bots: {}", names.join(", "))
                };
                platform::notify(platform, event, &text).await;
            }
            GroupCommand::Enable => {
                self.store.lock().set_enforcement(group, true);
                platform::notify(platform, event, NOTICE_ENFORCEMENT_ON).await;
            }
            GroupCommand::Disable => {
                self.store.lock().set_enforcement(group, false);
                platform::notify(platform, event, NOTICE_ENFORCEMENT_OFF).await;
            }
        }
        None
    }
}
