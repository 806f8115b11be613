//! Settings management
//!
//! Persisted key-value settings: AI credential, per-task model ids, the
//! knowledge-server list, and validation-rule toggles. Settings are read
//! fresh at the start of every pipeline invocation; nothing here is cached.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One configured knowledge server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeServerConfig {
    pub name: String,
    pub url: String,
    pub enabled: bool,
    /// Trust weight 0-100 applied to every context this server contributes
    pub weight: u8,
}

/// Persisted settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// AI credential; falls back to HAZCHECK_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for full shipment validation
    #[serde(default = "default_validation_model")]
    pub validation_model: String,

    /// Fast model used for SDS field extraction and the screenshot field read
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Model used for the final screenshot validation call
    #[serde(default = "default_screenshot_model")]
    pub screenshot_model: String,

    /// Configured knowledge servers
    #[serde(default)]
    pub servers: Vec<KnowledgeServerConfig>,

    /// Carrier-rule toggles keyed by rule id; a rule toggled off is
    /// left out of the validation prompt. Unknown ids are ignored.
    #[serde(default)]
    pub rule_toggles: HashMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: std::env::var("HAZCHECK_API_KEY").ok(),
            validation_model: default_validation_model(),
            extraction_model: default_extraction_model(),
            screenshot_model: default_screenshot_model(),
            servers: Vec::new(),
            rule_toggles: HashMap::new(),
        }
    }
}

fn default_validation_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_extraction_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_screenshot_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Settings {
    /// Load settings from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut settings: Settings = serde_yaml::from_str(&content)?;
            if settings.api_key.is_none() {
                settings.api_key = std::env::var("HAZCHECK_API_KEY").ok();
            }
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to an explicit path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)
            .map_err(crate::error::HazCheckError::Yaml)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default settings path (HAZCHECK_CONFIG overrides)
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("HAZCHECK_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("settings.yml")
    }

    /// Servers that should contribute context
    pub fn enabled_servers(&self) -> Vec<KnowledgeServerConfig> {
        self.servers.iter().filter(|s| s.enabled).cloned().collect()
    }
}
