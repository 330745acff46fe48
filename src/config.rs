use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::commands::AppConfig;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub upload_client_secret: String,
    pub auto_cleanup_days: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_client_secret: String::new(),
            auto_cleanup_days: 30,
            log_level: "warn".to_string(),
        }
    }
}

impl From<Config> for AppConfig {
    fn from(config: Config) -> Self {
        AppConfig {
            upload_client_secret: config.upload_client_secret,
            auto_cleanup_days: config.auto_cleanup_days,
        }
    }
}

fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join("nestup");

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

fn load_config_internal() -> AppResult<Config> {
    let config_path = get_config_path()?;

    if config_path.exists() {
        let config_str = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        // Validate config before returning
        validate_config(&config)?;

        Ok(config)
    } else {
        // Create default config
        let default_config = Config::default();
        save_config_internal(&default_config)?;
        Ok(default_config)
    }
}

pub fn load_config() -> AppResult<AppConfig> {
    load_config_internal().map(Into::into)
}

pub fn save_config(app_config: AppConfig) -> AppResult<()> {
    // Apply on top of the stored config so fields outside the public
    // surface (log_level) survive a save
    let mut config = load_config_internal().unwrap_or_default();
    config.upload_client_secret = app_config.upload_client_secret;
    config.auto_cleanup_days = app_config.auto_cleanup_days;

    validate_config(&config)?;
    save_config_internal(&config)
}

fn save_config_internal(config: &Config) -> AppResult<()> {
    let config_path = get_config_path()?;

    // Create backup of existing config
    if config_path.exists() {
        let backup_path = config_path.with_extension("json.bak");
        if let Err(e) = fs::copy(&config_path, &backup_path) {
            log::warn!("Failed to create config backup: {}", e);
        }
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_str)?;

    log::info!("Configuration saved successfully");
    Ok(())
}

pub fn get_data_directory() -> AppResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not find data directory".to_string()))?
        .join("nestup");

    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

pub fn get_history_directory() -> AppResult<PathBuf> {
    let history_dir = get_data_directory()?.join("history");
    fs::create_dir_all(&history_dir)?;
    Ok(history_dir)
}

/// Log filter from the stored config; falls back to the default level when
/// the config is missing or unreadable so logging never blocks startup
pub fn log_level_filter() -> log::LevelFilter {
    let level = match load_config_internal() {
        Ok(config) => config.log_level,
        Err(_) => return log::LevelFilter::Warn,
    };

    match level.as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    }
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    if config.auto_cleanup_days == 0 {
        return Err(AppError::validation(
            "auto_cleanup_days",
            "Must be greater than 0",
        ));
    }

    // Validate log level
    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation(
            "log_level",
            "Must be a valid log level",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert!(config.upload_client_secret.is_empty());
    }

    #[test]
    fn test_validate_config_rejects_bad_log_level() {
        let config = Config {
            log_level: "verbose".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_rejects_zero_cleanup_days() {
        let config = Config {
            auto_cleanup_days: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
