//! Config command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success};
use cw_core::config::{self, ConsoleConfig};
use cw_core::ConfigError;

/// Config file to use: the one given on the command line or the default
pub fn resolve_config_path(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

/// Load the console configuration.
///
/// A missing default config file means built-in defaults; a missing file
/// that was asked for explicitly is an error.
pub fn load_console_config(config_path: Option<&PathBuf>) -> Result<ConsoleConfig> {
    let path = resolve_config_path(config_path);
    match config::load_config::<ConsoleConfig>(&path) {
        Ok(config) => {
            tracing::debug!("Loaded config from {:?}", path);
            Ok(config)
        }
        Err(ConfigError::NotFound(_)) if config_path.is_none() => {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(ConsoleConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config: {:?}", path)),
    }
}

/// Print the effective configuration as TOML
pub fn config_show(config_path: Option<&PathBuf>) -> Result<()> {
    let config = load_console_config(config_path)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Write a default config file
pub fn config_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    let path = resolve_config_path(config_path);
    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite it");
        return Ok(());
    }

    config::save_config(&path, &ConsoleConfig::default())
        .with_context(|| format!("Failed to write config: {:?}", path))?;
    print_success(&format!("Wrote default config to {:?}", path));
    Ok(())
}

/// Print one config value by dotted key, e.g. `retry.max_retries`
pub fn config_get(config_path: Option<&PathBuf>, key: &str) -> Result<()> {
    let config = load_console_config(config_path)?;
    let root = toml::Value::try_from(&config).context("Failed to encode config")?;

    match lookup(&root, key) {
        Some(toml::Value::String(s)) => println!("{}", s),
        Some(toml::Value::Table(t)) => print!("{}", toml::to_string_pretty(t)?),
        Some(value) => println!("{}", value),
        None => anyhow::bail!("Key not found: {}", key),
    }
    Ok(())
}

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(root, |current, part| current.as_table()?.get(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_nested_key() {
        let root = toml::Value::try_from(ConsoleConfig::default()).unwrap();

        assert_eq!(
            lookup(&root, "retry.max_retries").and_then(|v| v.as_integer()),
            Some(3)
        );
        assert_eq!(
            lookup(&root, "tunnel.data_source").and_then(|v| v.as_str()),
            Some("postgresql")
        );
        assert!(lookup(&root, "retry.nope").is_none());
        assert!(lookup(&root, "retry.max_retries.deeper").is_none());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_console_config(Some(&path)).is_err());
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        config_init(Some(&path), false).unwrap();
        let loaded = load_console_config(Some(&path)).unwrap();
        assert_eq!(loaded.retry.max_retries, 3);
        assert_eq!(loaded.window.app_bar_height, 28.0);
    }
}
