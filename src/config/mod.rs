// Required external crates for configuration management and serialization
use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for the model hub endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Base URL of the hub website (trending page, model links)
    pub base_url: String,
    /// Base URL of the hub models API
    pub api_url: String,
    /// Maximum number of models fetched per list (trending cards, popular models)
    pub model_limit: usize,
}

/// Configuration for the Notion document sink
#[derive(Debug, Deserialize, Clone)]
pub struct NotionConfig {
    /// Integration token used as bearer auth
    pub token: String,
    /// Database the daily report page is created under
    pub database_id: String,
}

/// Configuration for the narration (news script) service
#[derive(Debug, Deserialize, Clone)]
pub struct NarrationConfig {
    /// API key for the text-generation service
    pub api_key: String,
    /// Messages endpoint URL
    pub api_url: String,
    /// Model name requested for script generation
    pub model: String,
    /// Upper bound on generated script length
    pub max_tokens: u32,
    /// Sampling temperature (0.0-1.0)
    pub temperature: f32,
}

/// Configuration for the daily schedule
#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    /// Wall-clock time of the daily run, "HH:MM"
    pub update_time: String,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Optional log directory path
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Hub-related settings
    pub hub: HubConfig,
    /// Notion-related settings
    pub notion: NotionConfig,
    /// Narration-related settings
    pub narration: NarrationConfig,
    /// Schedule-related settings
    pub schedule: ScheduleConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with TRENDCAST__
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("Failed to get current directory: {}", e)))?
            .join("config");

        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(format!(
                "Config directory not found at: {}",
                config_dir.display()
            )));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(format!(
                "Default configuration file not found at: {}",
                default_config.display()
            )));
        }

        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        // Load and validate configuration
        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("TRENDCAST")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // Required credentials must be present before any work begins
        if self.notion.token.is_empty() || self.notion.database_id.is_empty() {
            return Err(ConfigError::Message(
                "notion.token and notion.database_id must be set \
                 (TRENDCAST__NOTION__TOKEN / TRENDCAST__NOTION__DATABASE_ID)"
                    .to_string(),
            ));
        }

        if self.narration.api_key.is_empty() {
            return Err(ConfigError::Message(
                "narration.api_key must be set (TRENDCAST__NARRATION__API_KEY)".to_string(),
            ));
        }

        // Validate model limit
        if self.hub.model_limit == 0 {
            return Err(ConfigError::Message(
                "hub.model_limit must be greater than 0".to_string(),
            ));
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.narration.temperature) {
            return Err(ConfigError::Message(format!(
                "Temperature must be between 0.0 and 1.0, got: {}",
                self.narration.temperature
            )));
        }

        // Validate max_tokens
        if self.narration.max_tokens == 0 {
            return Err(ConfigError::Message(
                "narration.max_tokens must be greater than 0".to_string(),
            ));
        }

        // Validate the daily run time format
        if NaiveTime::parse_from_str(&self.schedule.update_time, "%H:%M").is_err() {
            return Err(ConfigError::Message(format!(
                "schedule.update_time must be in HH:MM format, got: {}",
                self.schedule.update_time
            )));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(format!(
                "Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                self.logging.level
            ))),
        }?;

        // Create log directory if configured and it doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }
}
