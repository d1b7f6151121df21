//! CLI argument definitions for the Quotebook server.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use quotebook_core::config::QuotebookConfig;

/// Quotebook - a REST API for authors and their quotes.
#[derive(Parser, Debug, Default)]
#[command(name = "quotebook", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Path to the SQLite database file.
    #[arg(short = 'd', long = "database")]
    pub database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Keep all data in memory; nothing is written to disk.
    #[arg(long = "in-memory")]
    pub in_memory: bool,
}

impl CliArgs {
    /// Load the configuration file and apply flag and environment overrides.
    ///
    /// The file path comes from --config > QUOTEBOOK_CONFIG > ./quotebook.toml.
    /// A missing file means defaults; an unreadable one is logged and also
    /// falls back to defaults.
    pub fn resolve_config(&self) -> (PathBuf, QuotebookConfig) {
        self.resolve_config_with_env(|key| std::env::var(key).ok())
    }

    fn resolve_config_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> (PathBuf, QuotebookConfig) {
        let path = self
            .config
            .clone()
            .or_else(|| env("QUOTEBOOK_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("quotebook.toml"));

        let mut config = if path.exists() {
            QuotebookConfig::load_or_default(&path)
        } else {
            QuotebookConfig::default()
        };
        self.apply_with_env(&mut config, &env);
        (path, config)
    }

    fn apply_with_env(&self, config: &mut QuotebookConfig, env: impl Fn(&str) -> Option<String>) {
        if let Some(host) = self.host.clone().or_else(|| env("QUOTEBOOK_HOST")) {
            config.server.host = host;
        }

        let env_port = env("QUOTEBOOK_PORT").and_then(|val| match val.parse::<u16>() {
            Ok(p) => Some(p),
            Err(_) => {
                tracing::warn!(value = %val, "Ignoring invalid QUOTEBOOK_PORT");
                None
            }
        });
        if let Some(port) = self.port.or(env_port) {
            config.server.port = port;
        }

        let database = self
            .database
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env("QUOTEBOOK_DATABASE"));
        if let Some(path) = database {
            config.database.path = path;
        }

        if self.in_memory {
            config.database.in_memory = true;
        }

        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}
