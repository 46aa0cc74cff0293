//! Configuration management
//!
//! TOML config with per-section defaults, stored under the platform
//! config directory. The enrichment provider priority list lives here;
//! the API key itself lives in the keyring (see [`crate::credentials`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::enrich::ProviderSpec;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Durable store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Enrichment provider settings
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Machine-translation settings
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite database; defaults to the platform data dir
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Ordered provider priority list; the first reachable, credentialed
    /// provider that answers wins
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSpec>,
}

fn default_providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            name: "openrouter".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
        },
        ProviderSpec {
            name: "openrouter-free".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-oss-120b:free".to_string(),
        },
    ]
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// LibreTranslate-compatible endpoint
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,
}

fn default_translation_endpoint() -> String {
    "https://libretranslate.de/translate".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translation_endpoint(),
        }
    }
}

impl Config {
    /// Load configuration from file, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent().context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve the SQLite database path
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("vocab.db")),
        }
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "vocab-trainer", "vocab-trainer")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "vocab-trainer", "vocab-trainer")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!("  database:    {}", config.database_path()?.display());
    println!("  translation: {}", config.translation.endpoint);
    println!("  API key:     {}", if crate::credentials::has_api_key() { "configured" } else { "not configured" });
    println!("  providers:");
    for provider in &config.enrichment.providers {
        println!("    {:<16} {} ({})", provider.name, provider.model, provider.base_url);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.enrichment.providers.len(), 2);
        assert_eq!(config.enrichment.providers[0].name, "openrouter");
        assert!(config.translation.endpoint.contains("libretranslate"));
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [translation]
            endpoint = "http://localhost:5000/translate"
        "#,
        )
        .unwrap();
        assert_eq!(config.translation.endpoint, "http://localhost:5000/translate");
        assert_eq!(config.enrichment.providers.len(), 2);
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.enrichment.providers, config.enrichment.providers);
    }
}
