//! Runtime configuration, read from `ASSISTANT_*` environment variables
//! (optionally through a `.env` file).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::conversation::storage::DEFAULT_HISTORY_KEY;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

const DB_FILENAME: &str = "assistant.sqlite";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Bunyan,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "bunyan" => Ok(LogFormat::Bunyan),
            other => Err(AppError::Config(format!("unknown log format '{}'", other))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Bunyan => "bunyan",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_delay_window"))]
pub struct AssistantConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    /// Storage key of the conversation history.
    #[validate(length(min = 1))]
    pub history_key: String,
    #[validate(range(max = 60000))]
    pub typing_delay_min_ms: u64,
    #[validate(range(max = 60000))]
    pub typing_delay_max_ms: u64,
    #[validate(range(min = 1, max = 600))]
    pub reply_timeout_secs: u64,
    #[validate(range(min = 1, max = 4096))]
    pub channel_capacity: usize,
    #[validate(length(min = 1))]
    pub log_level: String,
    pub log_format: LogFormat,
}

fn validate_delay_window(config: &AssistantConfig) -> Result<(), ValidationError> {
    if config.typing_delay_min_ms > config.typing_delay_max_ms {
        return Err(ValidationError::new("typing_delay_min_ms_exceeds_max"));
    }
    Ok(())
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::with_data_dir(PortablePathManager::default_data_dir())
    }
}

impl AssistantConfig {
    fn with_data_dir(data_dir: PathBuf) -> Self {
        let db_path = PortablePathManager::new(&data_dir).db_dir().join(DB_FILENAME);
        Self {
            data_dir,
            db_path,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            typing_delay_min_ms: 1000,
            typing_delay_max_ms: 3000,
            reply_timeout_secs: 30,
            channel_capacity: 32,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    /// Loads `.env` if present, then reads the environment.
    pub fn load() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Reads the environment over the defaults and validates the result.
    pub fn from_env() -> Result<Self, AppError> {
        let data_dir = env_var("ASSISTANT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(PortablePathManager::default_data_dir);
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = env_var("ASSISTANT_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = env_var("ASSISTANT_HISTORY_KEY") {
            config.history_key = key;
        }
        if let Some(level) = env_var("ASSISTANT_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(format) = env_var("ASSISTANT_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        config.typing_delay_min_ms =
            env_parse("ASSISTANT_TYPING_DELAY_MIN_MS", config.typing_delay_min_ms)?;
        config.typing_delay_max_ms =
            env_parse("ASSISTANT_TYPING_DELAY_MAX_MS", config.typing_delay_max_ms)?;
        config.reply_timeout_secs =
            env_parse("ASSISTANT_REPLY_TIMEOUT_SECS", config.reply_timeout_secs)?;
        config.channel_capacity = env_parse("ASSISTANT_CHANNEL_CAPACITY", config.channel_capacity)?;

        config.validate()?;
        Ok(config)
    }

    pub fn typing_delay_min(&self) -> Duration {
        Duration::from_millis(self.typing_delay_min_ms)
    }

    pub fn typing_delay_max(&self) -> Duration {
        Duration::from_millis(self.typing_delay_max_ms)
    }

    /// Time a caller waits for a reply. Includes the longest typing delay
    /// so a slow "typing" bot never trips the timeout.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs) + self.typing_delay_max()
    }

    pub fn paths(&self) -> PortablePathManager {
        PortablePathManager::new(&self.data_dir)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}: {}", name, e))),
        None => Ok(default),
    }
}
