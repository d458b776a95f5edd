//! nobot - bot detection and enforcement for group chats.
//!
//! Finds bot-like accounts in a group by probing it with test commands,
//! tags them, and throttles tagged accounts by message length and
//! frequency. Platform access goes through the [`platform::Platform`]
//! trait; group state lives in a [`nobot_records::RecordStore`].

pub mod commands;
pub mod config;
pub mod detection;
pub mod enforcement;
pub mod error;
pub mod event;
pub mod http;
pub mod metrics;
pub mod platform;
pub mod script;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use nobot_records as records;
pub use service::{EventControl, Handled, Moderator};

/// The record store shared by every task.
///
/// Locks are held only between suspension points, never across `.await`.
pub type SharedStore = std::sync::Arc<parking_lot::Mutex<nobot_records::RecordStore>>;
