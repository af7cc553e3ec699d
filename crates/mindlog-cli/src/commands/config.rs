//! Config command - view, validate and edit the configuration file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use mindlog_core::config::Config;

use crate::context::CliContext;
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (file plus environment)
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value in the file
    Set {
        /// Configuration key (e.g., "sync.interval_secs")
        key: String,
        /// New value
        value: String,
    },
    /// Validate the configuration file
    Validate,
}

/// Keys accepted by `config set`, with a short description
const SETTABLE_KEYS: &[(&str, &str)] = &[
    ("remote.url", "Backend project URL, 'none' to clear"),
    ("remote.anon_key", "Backend public key, 'none' to clear"),
    ("offline_mode", "true|false"),
    ("sync.interval_secs", "Seconds between automatic passes"),
    ("sync.startup_delay_secs", "Seconds before the first pass"),
    ("sync.catchup_delay_secs", "Seconds before the catch-up pass"),
    ("sync.enabled_by_default", "true|false"),
    ("storage.database", "SQLite database path"),
    ("backup.preserved_keys", "Comma-separated keys kept across restore"),
    ("backup.creator", "Name recorded in backup metadata"),
    ("logging.level", "trace|debug|info|warn|error"),
];

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        match self {
            ConfigCommand::Show => self.execute_show(ctx, &*formatter),
            ConfigCommand::Path => {
                let path = ctx.config_path();
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "config_path": path.display().to_string(),
                        "exists": path.exists(),
                    }));
                } else {
                    println!("{}", path.display());
                }
                Ok(())
            }
            ConfigCommand::Set { key, value } => self.execute_set(ctx, &*formatter, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx, &*formatter),
        }
    }

    fn execute_show(&self, ctx: &CliContext, formatter: &dyn OutputFormatter) -> Result<()> {
        let config_path = ctx.config_path();
        let mut config = ctx.load_config()?;
        if let Some(key) = config.remote.anon_key.as_mut() {
            *key = mask_secret(key);
        }

        info!(config_path = %config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }
        Ok(())
    }

    fn execute_set(
        &self,
        ctx: &CliContext,
        formatter: &dyn OutputFormatter,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let config_path = ctx.config_path();
        // Environment overrides must not leak into the file
        let mut config = load_file_or_default(&config_path)?;

        info!(key = %key, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{key}': {e}"));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, description) in SETTABLE_KEYS {
                    formatter.info(&format!("  {name:<26} - {description}"));
                }
            }
            return Ok(());
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "errors": messages,
                }));
            } else {
                formatter.error(&format!("Invalid value for '{key}': {}", messages.join("; ")));
            }
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(&config_path, yaml).context("Failed to write configuration file")?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {key}"));
            formatter.info(&format!("Saved to {}", config_path.display()));
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &CliContext, formatter: &dyn OutputFormatter) -> Result<()> {
        let config_path = ctx.config_path();

        if !config_path.exists() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": true,
                    "config_path": config_path.display().to_string(),
                    "errors": [],
                    "note": "configuration file not found, defaults in use",
                }));
            } else {
                formatter.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                formatter.info("Using default configuration (local-only mode).");
            }
            return Ok(());
        }

        let config = match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {e}")],
                    }));
                } else {
                    formatter.error(&format!("Failed to parse configuration: {e}"));
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }
        Ok(())
    }
}

fn load_file_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

/// Keeps the first four characters of a secret
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => anyhow::bail!("Expected true or false, got '{other}'"),
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- remote ---
        "remote.url" => config.remote.url = optional(value),
        "remote.anon_key" => config.remote.anon_key = optional(value),
        "offline_mode" => config.offline_mode = parse_bool(value)?,

        // --- sync ---
        "sync.interval_secs" => {
            config.sync.interval_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for sync.interval_secs")?;
        }
        "sync.startup_delay_secs" => {
            config.sync.startup_delay_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for sync.startup_delay_secs")?;
        }
        "sync.catchup_delay_secs" => {
            config.sync.catchup_delay_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for sync.catchup_delay_secs")?;
        }
        "sync.enabled_by_default" => config.sync.enabled_by_default = parse_bool(value)?,

        // --- storage ---
        "storage.database" => config.storage.database = PathBuf::from(value),

        // --- backup ---
        "backup.preserved_keys" => {
            config.backup.preserved_keys = value
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
        "backup.creator" => config.backup.creator = value.to_string(),

        // --- logging ---
        "logging.level" => config.logging.level = value.to_string(),

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }
    Ok(())
}
