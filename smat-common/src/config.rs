//! Bootstrap configuration loading
//!
//! The service reads one TOML file at startup. Every field has a built-in
//! default, so a missing file only produces a warning and the service starts
//! with compiled defaults.
//!
//! # Config file resolution priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`SMAT_CONFIG`)
//! 3. `./smat.toml` in the working directory
//! 4. `smat/smat.toml` under the platform config directory
//! 5. Compiled defaults (no file)
//!
//! Explicitly requested files (1 and 2) must exist; the discovered locations
//! (3 and 4) are optional.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SMAT_CONFIG";

/// Environment variable consulted when `[llm] api_key` is not set
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Config file name looked up in the working and platform config directories
pub const DEFAULT_CONFIG_FILE: &str = "smat.toml";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub session: SessionConfig,
    pub llm: LlmConfig,
    pub langflow: LangflowConfig,
    pub pdf: PdfConfig,
    pub debug: DebugConfig,
    pub logging: LoggingConfig,
    /// Accounts allowed to log in
    pub users: Vec<UserProfile>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Reference data location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding questions.json, recommendations.json and survey.json
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

/// Session cookie and store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Max-Age attribute of the session cookie
    pub cookie_max_age_secs: u64,
    /// Server-side expiry of sessions and stored reports (unset: never expire)
    pub ttl_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_secs: 3600,
            ttl_secs: None,
        }
    }
}

/// OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Bearer token; falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub summary_model: String,
    pub insights_model: String,
    pub extraction_model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            summary_model: "gpt-4".to_string(),
            insights_model: "gpt-4".to_string(),
            extraction_model: "gpt-4".to_string(),
            timeout_secs: 60,
        }
    }
}

/// External flow analysis endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LangflowConfig {
    pub enabled: bool,
    /// Flow run URL, e.g. `http://localhost:7860/api/v1/run/<flow-id>`
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for LangflowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://localhost:7860/api/v1/run/sustainability-assessment".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Headless browser used for PDF output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub chromium_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            chromium_path: PathBuf::from("chromium"),
            timeout_secs: 60,
        }
    }
}

/// Questionnaire pre-fill for manual testing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Level pre-selected for every question when enabled
    pub default_score: u8,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_score: 3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A user account and the company profile attached to it
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub username: String,
    pub password: String,
    pub name: String,
    pub company: String,
    pub industry: String,
    pub revenue: String,
    pub location: String,
}

impl AppConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Look up a configured user by login name
    pub fn find_user(&self, username: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Fill `llm.api_key` from the given value when the file left it unset
    pub fn with_api_key_fallback(mut self, env_key: Option<String>) -> Self {
        if self.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            self.llm.api_key = env_key.filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Sanity checks that must hold before the service starts
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.debug.default_score) {
            return Err(Error::Config(format!(
                "debug.default_score must be between 1 and 5, got {}",
                self.debug.default_score
            )));
        }
        if self.langflow.enabled && self.langflow.url.trim().is_empty() {
            return Err(Error::Config(
                "langflow.enabled is set but langflow.url is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a configuration file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    Discovered(PathBuf),
    Defaults,
}

/// Resolves the config file location following the documented priority
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Determine which configuration source applies
    pub fn resolve(&self) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        // Priority 3 and 4: well-known locations
        for candidate in Self::discovery_paths() {
            if candidate.is_file() {
                return ConfigSource::Discovered(candidate);
            }
        }

        ConfigSource::Defaults
    }

    /// Resolve and load the configuration, applying the API key fallback
    pub fn load(&self) -> Result<AppConfig> {
        let config = match self.resolve() {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                if !path.is_file() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                info!("Loading configuration from {}", path.display());
                AppConfig::from_file(&path)?
            }
            ConfigSource::Discovered(path) => {
                info!("Loading configuration from {}", path.display());
                AppConfig::from_file(&path)?
            }
            ConfigSource::Defaults => {
                warn!("No configuration file found, using compiled defaults");
                AppConfig::default()
            }
        };

        let config = config.with_api_key_fallback(std::env::var(API_KEY_ENV_VAR).ok());
        config.validate()?;

        if config.users.is_empty() {
            warn!("No users configured; nobody will be able to log in");
        }
        Ok(config)
    }

    fn discovery_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("smat").join(DEFAULT_CONFIG_FILE));
        }
        paths
    }
}
