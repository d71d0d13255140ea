//! Engine configuration
//!
//! Stored as JSON, by default in ~/.config/snapdiff/config.json.
//! Environment variables fill in anything the caller does not set.

use crate::model::DEFAULT_DISCRIMINATOR;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Order in which an update recombines object children into a digest
///
/// The tree builder always combines object children in sorted key order.
/// `Insertion` recombines in the node's current enumeration order, so keys
/// added by an update sit after the ones that were already there and the
/// resulting digest can differ from a fresh build of the same content.
/// `Sorted` recombines in key order and keeps both paths identical, but
/// digests of previously updated trees will not match.
///
/// Arrays are positional under both orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestOrder {
    #[default]
    Insertion,
    Sorted,
}

impl fmt::Display for DigestOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestOrder::Insertion => write!(f, "insertion"),
            DigestOrder::Sorted => write!(f, "sorted"),
        }
    }
}

impl FromStr for DigestOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "insertion" => Ok(DigestOrder::Insertion),
            "sorted" => Ok(DigestOrder::Sorted),
            other => Err(Error::Config(format!("Unknown digest order: {}", other))),
        }
    }
}

/// Settings shared by the tree builder and the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Property that marks an object as an opaque leaf when truthy
    pub discriminator: String,
    /// Child order used when an update recomputes a digest
    pub digest_order: DigestOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            discriminator: DEFAULT_DISCRIMINATOR.to_string(),
            digest_order: DigestOrder::default(),
        }
    }
}

/// On-disk form, where every field is optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    discriminator: Option<String>,
    digest_order: Option<DigestOrder>,
}

impl EngineConfig {
    /// Defaults overridden by SNAPDIFF_DISCRIMINATOR and SNAPDIFF_DIGEST_ORDER
    pub fn from_env() -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(discriminator) = std::env::var("SNAPDIFF_DISCRIMINATOR") {
            config.discriminator = discriminator;
        }
        if let Ok(order) = std::env::var("SNAPDIFF_DIGEST_ORDER") {
            config.digest_order = order.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = discriminator.into();
        self
    }

    pub fn with_digest_order(mut self, order: DigestOrder) -> Self {
        self.digest_order = order;
        self
    }

    /// Default location (~/.config/snapdiff/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("snapdiff").join("config.json"))
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        EngineConfig::default().merge_file(path)
    }

    /// Overlay the fields a JSON file sets; the rest keep their current value
    pub fn merge_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if let Some(discriminator) = file.discriminator {
            self.discriminator = discriminator;
        }
        if let Some(order) = file.digest_order {
            self.digest_order = order;
        }

        self.validate()?;
        Ok(self)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.discriminator.is_empty() {
            return Err(Error::Config("Discriminator must not be empty".into()));
        }
        Ok(())
    }
}
