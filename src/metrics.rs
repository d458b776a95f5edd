//! Prometheus metrics collection for nobot.
//!
//! Counters describe what the moderator did to group members; they are
//! exposed on the optional HTTP endpoint (see [`crate::http`]).
//!
//! - `nobot_accounts_tagged_total{source}` - Accounts tagged (probe or command)
//! - `nobot_mutes_total{reason}` - Mutes issued (length or frequency)
//! - `nobot_platform_errors_total{call,error}` - Swallowed platform failures
//! - `nobot_probe_sessions_total{outcome}` - Finished probe sessions

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Group messages handed to the moderator.
pub static EVENTS_HANDLED: OnceLock<IntCounter> = OnceLock::new();

/// Events whose propagation to other handlers was stopped.
pub static EVENTS_STOPPED: OnceLock<IntCounter> = OnceLock::new();

/// Accounts newly tagged, by source (probe, command).
pub static ACCOUNTS_TAGGED: OnceLock<IntCounterVec> = OnceLock::new();

/// Accounts whose tag was removed.
pub static ACCOUNTS_UNTAGGED: OnceLock<IntCounter> = OnceLock::new();

/// Mutes issued, by reason (length, frequency).
pub static MUTES: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages deleted.
pub static MESSAGES_DELETED: OnceLock<IntCounter> = OnceLock::new();

/// Platform failures swallowed, by call and error code.
pub static PLATFORM_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Probe sessions finished, by outcome.
pub static PROBE_SESSIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Admin commands processed by type.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Admin command latency by type.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Groups with a probe currently running.
pub static ACTIVE_PROBES: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Recording before `init` is a silent no-op.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(metric = stringify!($metric), error = %e, "Failed to register metric");
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(metric = stringify!($metric), error = %e, "Failed to create metric");
                }
            }
        };
    }

    register!(EVENTS_HANDLED, IntCounter::new("nobot_events_total", "Group messages handled"));
    register!(EVENTS_STOPPED, IntCounter::new("nobot_events_stopped_total", "Group messages stopped from further handling"));
    register!(ACCOUNTS_TAGGED, IntCounterVec::new(Opts::new("nobot_accounts_tagged_total", "Accounts tagged as bots"), &["source"]));
    register!(ACCOUNTS_UNTAGGED, IntCounter::new("nobot_accounts_untagged_total", "Accounts whose bot tag was removed"));
    register!(MUTES, IntCounterVec::new(Opts::new("nobot_mutes_total", "Mutes issued to tagged accounts"), &["reason"]));
    register!(MESSAGES_DELETED, IntCounter::new("nobot_messages_deleted_total", "Messages deleted"));
    register!(PLATFORM_ERRORS, IntCounterVec::new(Opts::new("nobot_platform_errors_total", "Platform call failures"), &["call", "error"]));
    register!(PROBE_SESSIONS, IntCounterVec::new(Opts::new("nobot_probe_sessions_total", "Probe sessions by outcome"), &["outcome"]));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("nobot_command_total", "Admin commands processed by type"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("nobot_command_duration_seconds", "Admin command latency by type")
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
        &["command"]));
    register!(ACTIVE_PROBES, IntGauge::new("nobot_active_probes", "Groups with a running probe"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
pub fn record_event() {
    if let Some(c) = EVENTS_HANDLED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_event_stopped() {
    if let Some(c) = EVENTS_STOPPED.get() {
        c.inc();
    }
}

/// Record a newly tagged account.
#[inline]
pub fn record_tag(source: &str) {
    if let Some(c) = ACCOUNTS_TAGGED.get() {
        c.with_label_values(&[source]).inc();
    }
}

#[inline]
pub fn record_untag() {
    if let Some(c) = ACCOUNTS_UNTAGGED.get() {
        c.inc();
    }
}

/// Record a mute issued for `reason`.
#[inline]
pub fn record_mute(reason: &str) {
    if let Some(c) = MUTES.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_deletion() {
    if let Some(c) = MESSAGES_DELETED.get() {
        c.inc();
    }
}

/// Record a swallowed platform failure.
#[inline]
pub fn record_platform_error(call: &str, error: &str) {
    if let Some(c) = PLATFORM_ERRORS.get() {
        c.with_label_values(&[call, error]).inc();
    }
}

/// Record the end of a probe session.
#[inline]
pub fn record_probe_outcome(outcome: &str) {
    if let Some(c) = PROBE_SESSIONS.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

/// Adjust the running-probe gauge.
#[inline]
pub fn adjust_active_probes(delta: i64) {
    if let Some(g) = ACTIVE_PROBES.get() {
        g.add(delta);
    }
}

/// Record an admin command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}
