//! Configuration validation.
//!
//! Checks run at startup. None of these stop the moderator from running;
//! the caller logs them so operators can fix the file.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation problems found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("detection.probe_commands is empty; detection will finish immediately")]
    NoProbeCommands,
    #[error("detection.probe_interval is 0; probes will be sent back to back")]
    ZeroProbeInterval,
    #[error("detection.bot_words contains an empty entry, which matches every message")]
    EmptyBotWord,
    #[error("enforcement.max_length is 0; every non-empty message is too long")]
    ZeroMaxLength,
    #[error("enforcement.ban_duration is 0; mutes would lift immediately")]
    ZeroBanDuration,
    #[error("storage.path parent directory does not exist: {0}")]
    StoragePathInvalid(String),
}

/// Validate a configuration, returning all problems found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.detection.probe_commands.is_empty() {
        errors.push(ValidationError::NoProbeCommands);
    }
    if config.detection.probe_interval == 0 {
        errors.push(ValidationError::ZeroProbeInterval);
    }
    if config.detection.bot_words.iter().any(String::is_empty) {
        errors.push(ValidationError::EmptyBotWord);
    }
    if config.enforcement.max_length == 0 {
        errors.push(ValidationError::ZeroMaxLength);
    }
    if config.enforcement.ban_duration == 0 {
        errors.push(ValidationError::ZeroBanDuration);
    }

    let storage_path = Path::new(&config.storage.path);
    if let Some(parent) = storage_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::StoragePathInvalid(config.storage.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
