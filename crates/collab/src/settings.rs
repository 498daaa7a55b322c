//! Conversion settings
//!
//! Settings are stored as JSON. Missing fields take their defaults, and a
//! file that fails to parse falls back to the defaults entirely.

use crate::CollabResult;
use doc_model::DEFAULT_LINK_TARGET;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the root fragment holding the document body
pub const DEFAULT_FRAGMENT_NAME: &str = "default";

/// Settings shared by the decoder, encoder and snapshot loader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionSettings {
    /// Root fragment holding the document body
    pub fragment_name: String,
    /// Target given to decoded links that carry none
    pub default_link_target: String,
    /// What to do with a block element found inside a mark wrapper
    pub nested_block_policy: NestedBlockPolicy,
    /// Binary encoding of snapshot updates
    pub update_encoding: UpdateEncoding,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            fragment_name: DEFAULT_FRAGMENT_NAME.to_string(),
            default_link_target: DEFAULT_LINK_TARGET.to_string(),
            nested_block_policy: NestedBlockPolicy::default(),
            update_encoding: UpdateEncoding::default(),
        }
    }
}

/// Handling of a block element nested directly inside a mark wrapper.
///
/// Marks should only wrap text, so such a tree violates the schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NestedBlockPolicy {
    /// Decode it as a regular block at the wrapper's position
    Hoist,
    /// Leave it out of the decoded document
    Drop,
    /// Fail the decode
    Reject,
}

impl Default for NestedBlockPolicy {
    fn default() -> Self {
        Self::Hoist
    }
}

/// Binary update format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateEncoding {
    V1,
    V2,
}

impl Default for UpdateEncoding {
    fn default() -> Self {
        Self::V1
    }
}

/// Settings manager for loading and saving conversion settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: ConversionSettings,
}

impl SettingsManager {
    /// Create a settings manager backed by the given file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: ConversionSettings::default(),
        }
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_sync(&mut self) -> CollabResult<&ConversionSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<ConversionSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse settings file {:?}, using defaults: {}",
                        self.settings_path,
                        e
                    );
                    self.current = ConversionSettings::default();
                }
            }
        } else {
            self.current = ConversionSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> CollabResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get the current settings
    pub fn current(&self) -> &ConversionSettings {
        &self.current
    }

    /// Replace the current settings (call `save_sync` to persist)
    pub fn update(&mut self, settings: ConversionSettings) {
        self.current = settings;
    }
}
