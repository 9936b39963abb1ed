//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for askdb
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model to use
    pub model: Option<String>,
    /// Local path for the database file
    pub db_path: Option<String>,
    /// Where to download the database from if absent
    pub db_url: Option<String>,
    /// Maximum rows returned per query
    pub row_cap: Option<usize>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub openai: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("askdb")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for ASKDB_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("ASKDB_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some("gpt-4o-mini".to_string()),
            db_path: Some("Chinook.db".to_string()),
            db_url: None,
            row_cap: None,
            api_keys: ApiKeys::default(),
        };

        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# askdb configuration file
# Place at ~/.config/askdb/config.toml (Linux/Mac) or %APPDATA%\askdb\config.toml (Windows)

# Model to use
model = "gpt-4o-mini"

# Local path for the database file (downloaded on first use if absent)
db_path = "Chinook.db"

# Where to download the database from
# db_url = "https://storage.googleapis.com/benchmarks-artifacts/chinook/Chinook.db"

# Maximum rows returned per query (default 40)
# row_cap = 40

# API key (optional - the OPENAI_API_KEY environment variable is
# checked first and is the recommended place for it)
[api_keys]
# openai = "sk-..."
"#
}
