//! Application configuration management.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Root directory for stored files.
    #[serde(default = "default_upload_root")]
    pub root: PathBuf,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed extensions per type tag ("1" = contract documents, "2" = drawings).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: HashMap<String, Vec<String>>,
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100 MiB
}

fn default_allowed_extensions() -> HashMap<String, Vec<String>> {
    HashMap::from([
        ("1".to_string(), vec!["pdf".to_string()]),
        (
            "2".to_string(),
            ["jpg", "jpeg", "png", "gif", "webp"]
                .map(String::from)
                .to_vec(),
        ),
    ])
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: default_upload_root(),
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PACTFILE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_file_size, 100 * 1024 * 1024);
        assert_eq!(
            upload.allowed_extensions.get("1"),
            Some(&vec!["pdf".to_string()])
        );
        assert!(
            upload
                .allowed_extensions
                .get("2")
                .is_some_and(|exts| exts.iter().any(|e| e == "webp"))
        );
    }
}
