use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig::default(),
            lookup: LookupConfig::default(),
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Heading substituted into the generated web page
    #[serde(default = "default_page_heading")]
    pub page_heading: String,

    /// Page owner name shown in the generated page's banner
    #[serde(default = "default_page_owner")]
    pub page_owner: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            page_heading: default_page_heading(),
            page_owner: default_page_owner(),
        }
    }
}

/// Settings for the remote movie lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the OMDb-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every lookup request
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Default value functions for serde
fn default_page_heading() -> String {
    "My Movie Database".to_string()
}

fn default_page_owner() -> String {
    "Reelkeep".to_string()
}

fn default_base_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Save configuration to file
    fn save(&self, config: &Config) -> Result<()>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        use anyhow::Context;
        use std::fs;

        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::info!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        log::debug!(
            "Config: lookup endpoint {}, timeout {}s",
            config.lookup.base_url,
            config.lookup.timeout_secs
        );

        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        use anyhow::Context;
        use std::fs;

        let toml_str =
            toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(&self.path, toml_str)
            .with_context(|| format!("Failed to write config to {:?}", self.path))?;

        log::debug!("Saved configuration to {:?}", self.path);

        Ok(())
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        use anyhow::Context;
        use std::fs;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../../reelkeep.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.general.page_heading, "My Movie Database");
        assert_eq!(config.lookup.base_url, "http://www.omdbapi.com");
        assert_eq!(config.lookup.timeout_secs, 5);
        assert!(config.lookup.api_key.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
        [lookup]
        api_key = "abc123"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.lookup.api_key, "abc123");
        assert_eq!(config.lookup.base_url, "http://www.omdbapi.com");
        assert_eq!(config.general.page_heading, "My Movie Database");
    }

    #[test]
    fn test_example_config_parses() {
        let example = include_str!("../../reelkeep.toml.example");
        let config: Config = toml::from_str(example).unwrap();
        assert_eq!(config.lookup.timeout_secs, 5);
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TomlConfigStorage::new(dir.path().join("reelkeep.toml"));

        let config = storage.load().unwrap();
        assert!(storage.path().exists());
        assert_eq!(config.lookup.base_url, "http://www.omdbapi.com");
    }
}
