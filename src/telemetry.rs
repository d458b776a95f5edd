//! Telemetry utilities for command timing and event correlation.

use std::time::Instant;

/// Guard for timing admin command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.command, duration);
    }
}

/// Standardized span constructors for moderation observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for handling one group message.
    pub fn group_event(group: &str, sender: &str, message_id: &str) -> Span {
        if message_id.is_empty() {
            info_span!("event", group = %group, sender = %sender)
        } else {
            info_span!("event", group = %group, sender = %sender, msg = %message_id)
        }
    }

    /// Span for one probe session.
    pub fn probe(group: &str, generation: u64) -> Span {
        info_span!("probe", group = %group, generation)
    }
}
