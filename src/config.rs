//! Configuration system for the simulator
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (SURGE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::PersonaId;

/// Main simulator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// HTTP listener settings
    pub server: ServerSettings,

    /// Session time box and patience defaults
    pub session: SessionSettings,

    /// Where persona definitions come from
    pub personas: PersonaSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// TCP port to bind
    pub port: u16,
}

/// Session defaults applied when a session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Length of the interview window in seconds
    pub time_limit_secs: u64,

    /// Starting patience for the finance persona
    pub patience_finance: u32,

    /// Starting patience for the clinical persona
    pub patience_clinical: u32,

    /// Starting patience for the operations persona
    pub patience_operations: u32,

    /// Seed used when a client does not supply one
    pub default_seed: i64,
}

/// Persona definition source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Directory with `<persona>.toml` overrides (bundled definitions otherwise)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 7 * 60,
            patience_finance: 5,
            patience_clinical: 6,
            patience_operations: 6,
            default_seed: 42,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl SessionSettings {
    /// Interview window as a duration
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Starting patience for a persona
    pub fn patience_for(&self, persona: PersonaId) -> u32 {
        match persona {
            PersonaId::Finance => self.patience_finance,
            PersonaId::Clinical => self.patience_clinical,
            PersonaId::Operations => self.patience_operations,
        }
    }
}

impl PersonaSettings {
    /// Override directory as a PathBuf
    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(PathBuf::from)
    }
}

impl SimConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            PathBuf::from("surge-sim.toml"),
            dirs::config_dir()
                .map(|p| p.join("surge-sim").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".surge-sim").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SURGE_HOST") {
            self.server.host = val;
        }
        if let Some(n) = env_parse("SURGE_PORT") {
            self.server.port = n;
        }

        if let Some(n) = env_parse("SURGE_TIME_LIMIT_SECS") {
            self.session.time_limit_secs = n;
        }
        if let Some(n) = env_parse("SURGE_PATIENCE_FINANCE") {
            self.session.patience_finance = n;
        }
        if let Some(n) = env_parse("SURGE_PATIENCE_CLINICAL") {
            self.session.patience_clinical = n;
        }
        if let Some(n) = env_parse("SURGE_PATIENCE_OPERATIONS") {
            self.session.patience_operations = n;
        }
        if let Some(n) = env_parse("SURGE_DEFAULT_SEED") {
            self.session.default_seed = n;
        }

        if let Ok(val) = std::env::var("SURGE_PERSONA_DIR") {
            self.personas.dir = Some(val);
        }

        if let Ok(val) = std::env::var("SURGE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("SURGE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("SURGE_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref dir) = self.personas.dir {
            self.personas.dir = Some(expand_path(dir));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "server.host",
                "host cannot be empty",
            ));
        }
        if self.server.port == 0 {
            return Err(Error::config_field_invalid(
                "server.port",
                "port must be between 1 and 65535",
            ));
        }

        if self.session.time_limit_secs == 0 {
            return Err(Error::config_field_invalid(
                "session.time_limit_secs",
                "time limit must be greater than zero",
            ));
        }
        for persona in PersonaId::all() {
            if self.session.patience_for(*persona) == 0 {
                return Err(Error::config_field_invalid(
                    format!("session.patience_{}", persona.slug()),
                    "starting patience must be at least 1",
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".surge-sim")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

const DEFAULT_CONFIG: &str = r#"# Surge-Staffing interview simulator configuration

[server]
# Interface and port for the HTTP API
host = "127.0.0.1"
port = 8000

[session]
# Interview window in seconds (advisory; nothing is cut off)
time_limit_secs = 420

# Starting patience per persona; vague questions cost one point each
patience_finance = 5
patience_clinical = 6
patience_operations = 6

# Seed used when POST /session omits one
default_seed = 42

[personas]
# Directory holding finance.toml / clinical.toml / operations.toml overrides.
# Bundled definitions are used for any file that is missing.
# dir = "~/.surge-sim/personas"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.surge-sim/logs/surge-sim.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;
