//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level [`Config`] plus platform, storage and metrics tables
//! - [`detection`]: Probe sequence and classification settings
//! - [`enforcement`]: Throttling and mute settings
//! - [`commands`]: Admin command words and ignored commands
//! - [`validation`]: Startup sanity checks

mod commands;
mod defaults;
mod detection;
mod enforcement;
mod types;
pub mod validation;

pub use commands::CommandsConfig;
pub use detection::DetectionConfig;
pub use enforcement::EnforcementConfig;
pub use types::{Config, ConfigError, MetricsConfig, PlatformConfig, StorageConfig};
