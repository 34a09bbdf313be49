//! Service configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Engine loop configuration
    pub engine: EngineSettings,

    /// Replay driver configuration
    pub replay: ReplaySettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Engine loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Capacity of the event mailbox feeding the engine loop
    pub event_queue_capacity: usize,
}

/// Replay driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// JSON document holding the account summary and position groups
    pub snapshot_file: PathBuf,

    /// JSON-lines file of ticks to replay through the engine
    pub ticks_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { event_queue_capacity: 1024 }
    }
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            snapshot_file: PathBuf::from("./data/snapshot.json"),
            ticks_file: PathBuf::from("./data/ticks.jsonl"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from environment variables
pub fn load_config() -> Result<ServiceConfig> {
    let mut config = ServiceConfig::default();
    load_from_env(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn load_from_env(config: &mut ServiceConfig) {
    if let Ok(level) = std::env::var("TERMINAL_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("TERMINAL_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Ok(snapshot_file) = std::env::var("TERMINAL_SNAPSHOT_FILE") {
        config.replay.snapshot_file = PathBuf::from(snapshot_file);
    }

    if let Ok(ticks_file) = std::env::var("TERMINAL_TICKS_FILE") {
        config.replay.ticks_file = PathBuf::from(ticks_file);
    }

    if let Ok(capacity) = std::env::var("TERMINAL_EVENT_QUEUE") {
        config.engine.event_queue_capacity = capacity.parse().unwrap_or(1024);
    }
}

/// Validate configuration
fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.engine.event_queue_capacity == 0 {
        return Err(anyhow::anyhow!("Event queue capacity must be non-zero"));
    }

    Ok(())
}
