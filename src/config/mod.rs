//! Configuration management
//!
//! This module handles loading and parsing configuration for StudiHub.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. The backend
//! section ships with placeholder credentials so a fresh checkout boots
//! and renders the seeded content instead of refusing to start.

use serde::{Deserialize, Serialize};

/// Placeholder value for an unconfigured backend URL
pub const PLACEHOLDER_URL: &str = "YOUR_BACKEND_URL";
/// Placeholder value for an unconfigured anon key
pub const PLACEHOLDER_ANON_KEY: &str = "YOUR_BACKEND_ANON_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Content and presentation configuration
    #[serde(default)]
    pub content: ContentConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Hosted backend configuration
///
/// Points at a Supabase-style deployment: the auth API lives under
/// `{url}/auth/v1` and the resource API under `{url}/rest/v1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Public anon key sent with every request
    #[serde(default = "default_anon_key")]
    pub anon_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: default_anon_key(),
        }
    }
}

impl BackendConfig {
    /// Whether the credentials are still the shipped placeholders.
    ///
    /// Startup logs a warning in that case; every remote call will fail
    /// and the page degrades to the seeded content.
    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL || self.anon_key == PLACEHOLDER_ANON_KEY
    }
}

fn default_backend_url() -> String {
    PLACEHOLDER_URL.to_string()
}

fn default_anon_key() -> String {
    PLACEHOLDER_ANON_KEY.to_string()
}

/// Content and presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Marketplace page size for the initial load and each load-more
    #[serde(default = "default_templates_per_page")]
    pub templates_per_page: u32,
    /// WhatsApp number purchases and consultations are routed to
    #[serde(default = "default_contact_number")]
    pub contact_number: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            templates_per_page: default_templates_per_page(),
            contact_number: default_contact_number(),
        }
    }
}

fn default_templates_per_page() -> u32 {
    12
}

fn default_contact_number() -> String {
    "6283119226089".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        // Handle empty file - return defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - STUDIHUB_SERVER_HOST
    /// - STUDIHUB_SERVER_PORT
    /// - STUDIHUB_BACKEND_URL
    /// - STUDIHUB_BACKEND_ANON_KEY
    /// - STUDIHUB_TEMPLATES_PER_PAGE
    /// - STUDIHUB_CONTACT_NUMBER
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("STUDIHUB_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("STUDIHUB_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("STUDIHUB_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(anon_key) = std::env::var("STUDIHUB_BACKEND_ANON_KEY") {
            self.backend.anon_key = anon_key;
        }

        if let Ok(per_page) = std::env::var("STUDIHUB_TEMPLATES_PER_PAGE") {
            if let Ok(per_page) = per_page.parse::<u32>() {
                self.content.templates_per_page = per_page;
            }
        }
        if let Ok(number) = std::env::var("STUDIHUB_CONTACT_NUMBER") {
            self.content.contact_number = number;
        }
    }

    /// Reject values the rest of the application cannot work with
    fn validate(&self) -> Result<(), ConfigError> {
        if self.content.templates_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "content.templates_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
// Both `tests` and `property_tests` modules use this to prevent race conditions.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
