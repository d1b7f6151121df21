use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{QuotebookError, Result};
use crate::pagination::{DEFAULT_LIMIT, MAX_LIMIT};

/// Top-level configuration for the Quotebook service.
///
/// Loaded from `quotebook.toml` (or the path given on the command line).
/// Every section is optional; missing sections and fields take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotebookConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl QuotebookConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuotebookConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuotebookError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Entity store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file.
    pub path: String,
    /// Use a throwaway in-memory database instead of `path`.
    pub in_memory: bool,
    /// Skip running schema migrations on startup.
    pub skip_setup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "quotebook.db".to_string(),
            in_memory: false,
            skip_setup: false,
        }
    }
}

/// Limits applied to every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = QuotebookConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3030");
        assert_eq!(config.database.path, "quotebook.db");
        assert!(!config.database.in_memory);
        assert!(!config.database.skip_setup);
        assert_eq!(config.pagination.default_limit, 50);
        assert_eq!(config.pagination.max_limit, 50);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[server]
host = "0.0.0.0"
port = 8080

[database]
path = "/var/lib/quotebook/quotes.db"

[pagination]
default_limit = 20
max_limit = 40
"#;
        let file = create_temp_config(content);
        let config = QuotebookConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.database.path, "/var/lib/quotebook/quotes.db");
        assert_eq!(config.pagination.default_limit, 20);
        assert_eq!(config.pagination.max_limit, 40);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[server]
port = 9000
"#;
        let file = create_temp_config(content);
        let config = QuotebookConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.path, "quotebook.db");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = QuotebookConfig::load_or_default(Path::new("/nonexistent/quotebook.toml"));
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = QuotebookConfig::load(file.path());
        assert!(matches!(result, Err(QuotebookError::Config(_))));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("quotebook.toml");

        let mut config = QuotebookConfig::default();
        config.server.port = 4040;
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = QuotebookConfig::load(&path).unwrap();
        assert_eq!(reloaded.server.port, 4040);
        assert_eq!(reloaded.general.log_level, "info");
    }
}
