// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for the Perspective client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::PerspectiveError;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Defaults for analyze calls
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Export and report settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// API key; prefer `token_env` so keys stay out of config files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub skip_on_lang: bool,
    #[serde(default)]
    pub skip_on_unknown: bool,
    /// Ask the service not to store the submitted text
    #[serde(default)]
    pub do_not_store: bool,
    #[serde(default)]
    pub span_annotations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_chart_path")]
    pub chart_path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default)]
    pub align_right: bool,
    #[serde(default)]
    pub sort_by: Option<String>,
}

// Default value functions
fn default_token_env() -> String { "PERSPECTIVE_API_KEY".to_string() }
fn default_endpoint() -> String { "https://commentanalyzer.googleapis.com/v1alpha1".to_string() }
fn default_discovery_url() -> String {
    "https://commentanalyzer.googleapis.com/$discovery/rest?version=v1alpha1".to_string()
}
fn default_timeout() -> u64 { 30 }
fn default_attributes() -> Vec<String> { vec!["production".to_string()] }
fn default_database_path() -> String { "data.sqlite3".to_string() }
fn default_chart_path() -> String { "chart.svg".to_string() }
fn default_history_path() -> String { "perspective_history.jsonl".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
            endpoint: default_endpoint(),
            discovery_url: default_discovery_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            attributes: default_attributes(),
            language: None,
            skip_on_lang: false,
            skip_on_unknown: false,
            do_not_store: false,
            span_annotations: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            chart_path: default_chart_path(),
            history_path: default_history_path(),
            align_right: false,
            sort_by: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| PerspectiveError::Config(format!("Failed to parse config: {}", e)))?;
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

    /// API key from the config file, falling back to the environment
    pub fn resolve_token(&self) -> crate::Result<String> {
        if let Some(token) = self.api.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(token.to_string());
        }
        std::env::var(&self.api.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                PerspectiveError::Config(format!(
                    "No API key configured. Set api.token or the {} environment variable",
                    self.api.token_env
                ))
            })
    }

    /// Per-client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.api.endpoint.clone(),
            discovery_url: self.api.discovery_url.clone(),
            timeout_secs: self.api.timeout_secs,
            log_level: self.logging.level,
            do_not_store: self.analysis.do_not_store,
            span_annotations: self.analysis.span_annotations,
        }
    }
}

/// Settings owned by one client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub discovery_url: String,
    pub timeout_secs: u64,
    pub log_level: LogLevel,
    pub do_not_store: bool,
    pub span_annotations: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        AppConfig::default().client_config()
    }
}

/// Verbosity of the events a client emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Whether an event at `level` should be emitted
    pub fn allows(self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = PerspectiveError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" => Ok(LogLevel::Off),
            "error" | "critical" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(PerspectiveError::Config(format!("Unknown log level: {}", other))),
        }
    }
}
