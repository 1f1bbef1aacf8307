//! # Configuration Module
//!
//! This module handles configuration and data directory setup for moodtune.
//!
//! ## Data Storage
//!
//! The session and history store lives in the platform-standard data directory:
//! - Linux: `~/.local/share/moodtune/moodtune.db`
//! - macOS: `~/Library/Application Support/moodtune/moodtune.db`
//! - Windows: `%APPDATA%\moodtune\moodtune.db`
//!
//! ## Model Hub
//!
//! The hosted classifier is configured through [`HubConfig`]. The API token is
//! normally taken from the `HF_API_TOKEN` environment variable by the CLI.

use crate::hub::HubConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Name of the store file inside the data directory.
pub const STORE_FILE_NAME: &str = "moodtune.db";

/// Returns the platform-appropriate data directory for moodtune, creating it
/// if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The moodtune subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join("moodtune");
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create moodtune data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Returns the default store path.
///
/// # Examples
///
/// ```no_run
/// use moodtune::config::get_store_path;
///
/// let store_path = get_store_path()?;
/// println!("Store location: {}", store_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_store_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(STORE_FILE_NAME))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the key-value store file
    pub store_path: PathBuf,
    /// Hosted classifier settings
    pub hub: HubConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_path: get_store_path().unwrap_or_else(|_| PathBuf::from(STORE_FILE_NAME)),
            hub: HubConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime configuration in the default location.
    ///
    /// # Errors
    ///
    /// See [`get_data_dir`].
    pub fn new() -> Result<Self> {
        Ok(Self {
            store_path: get_store_path()?,
            hub: HubConfig::default(),
        })
    }

    /// Create configuration with an explicit store path.
    #[must_use]
    pub fn with_store_path(store_path: PathBuf) -> Self {
        Self {
            store_path,
            hub: HubConfig::default(),
        }
    }
}
