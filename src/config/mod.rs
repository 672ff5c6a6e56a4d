// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Configuration management for Picsort

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Web server settings
    #[serde(default)]
    pub web: WebConfig,

    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    /// Maximum size of one multipart upload, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Accepted file extensions (lowercase, without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Maximum preview width in pixels; wider images are scaled down
    #[serde(default = "default_max_width")]
    pub max_width: u32,
}

// Default value functions
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_max_body_bytes() -> usize { 64 * 1024 * 1024 }
fn default_max_width() -> u32 { 600 }

fn default_extensions() -> Vec<String> {
    vec!["png", "jpg", "jpeg", "gif"]
        .into_iter().map(String::from).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            upload: UploadConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            extensions: default_extensions(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::PicsortError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check whether a filename carries an accepted image extension
    pub fn accepts(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.upload.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }
}
