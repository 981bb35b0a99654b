//! Alias management
//!
//! An alias is a saved Spaces account: a name for a set of credentials plus
//! the region and host they connect to.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::credentials::{BucketLookup, Credentials, DEFAULT_HOST, DEFAULT_REGION, TimeoutConfig};
use crate::error::{Error, Result};

/// A named Spaces account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Unique name for this alias
    pub name: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Region slug, e.g. "ams3" or "nyc3"
    #[serde(default = "default_region")]
    pub region: String,

    /// Service host, or a full endpoint URL for other S3-compatible servers
    #[serde(default = "default_host")]
    pub host: String,

    /// Bucket lookup style
    #[serde(default)]
    pub bucket_lookup: BucketLookup,

    /// Timeout configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl std::fmt::Debug for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alias")
            .field("name", &self.name)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("host", &self.host)
            .field("bucket_lookup", &self.bucket_lookup)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Alias {
    /// Create an alias for the default region and host
    pub fn new(
        name: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: default_region(),
            host: default_host(),
            bucket_lookup: BucketLookup::Auto,
            timeout: None,
        }
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.unwrap_or_default()
    }

    /// Connection credentials for this alias
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            region: self.region.clone(),
            host: self.host.clone(),
            bucket_lookup: self.bucket_lookup,
            timeout: self.timeout,
        }
    }
}

/// Manager for alias operations
pub struct AliasManager {
    config_manager: ConfigManager,
}

impl AliasManager {
    /// Create a new AliasManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new AliasManager using the default config location
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_manager: ConfigManager::new()?,
        })
    }

    /// List all configured aliases
    pub fn list(&self) -> Result<Vec<Alias>> {
        Ok(self.config_manager.load()?.aliases)
    }

    /// Get an alias by name
    pub fn get(&self, name: &str) -> Result<Alias> {
        self.config_manager
            .load()?
            .aliases
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Save an alias
    ///
    /// An alias with the same name is replaced when `replace` is set and
    /// rejected with [`Error::AliasExists`] otherwise.
    pub fn set(&self, alias: Alias, replace: bool) -> Result<()> {
        let mut config = self.config_manager.load()?;

        if config.aliases.iter().any(|a| a.name == alias.name) {
            if !replace {
                return Err(Error::AliasExists(alias.name));
            }
            config.aliases.retain(|a| a.name != alias.name);
        }
        tracing::debug!(alias = %alias.name, "Saving alias");
        config.aliases.push(alias);

        self.config_manager.save(&config)
    }

    /// Remove an alias
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.aliases.len();

        config.aliases.retain(|a| a.name != name);

        if config.aliases.len() == original_len {
            return Err(Error::AliasNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if an alias exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.aliases.iter().any(|a| a.name == name))
    }
}
