//! Connection credentials and endpoint derivation
//!
//! A Spaces connection is identified by an access key, a secret key, a
//! region and a host. The endpoint and the public object URLs are derived
//! from region and host; nothing about them changes after construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default region slug
pub const DEFAULT_REGION: &str = "ams3";

/// Default service host
pub const DEFAULT_HOST: &str = "digitaloceanspaces.com";

/// Region requests are signed for
///
/// Spaces-style providers route by endpoint and expect SigV4 requests signed
/// for `us-east-1` regardless of the region slug in the host name.
pub const SIGNING_REGION: &str = "us-east-1";

/// How bucket names are placed in request URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLookup {
    /// Virtual-host for bare hosts, path style for explicit endpoint URLs
    #[default]
    Auto,
    /// `https://endpoint/bucket/key`
    Path,
    /// `https://bucket.endpoint/key`
    Dns,
}

impl fmt::Display for BucketLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BucketLookup::Auto => "auto",
            BucketLookup::Path => "path",
            BucketLookup::Dns => "dns",
        };
        f.write_str(s)
    }
}

impl FromStr for BucketLookup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(BucketLookup::Auto),
            "path" => Ok(BucketLookup::Path),
            "dns" => Ok(BucketLookup::Dns),
            other => Err(Error::Config(format!(
                "Bucket lookup must be 'auto', 'path', or 'dns', got '{other}'"
            ))),
        }
    }
}

/// Transport timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// Everything needed to build a signing client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub host: String,
    pub bucket_lookup: BucketLookup,
    pub timeout: Option<TimeoutConfig>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("host", &self.host)
            .field("bucket_lookup", &self.bucket_lookup)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Credentials {
    /// Credentials for the default region and host
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: DEFAULT_REGION.to_string(),
            host: DEFAULT_HOST.to_string(),
            bucket_lookup: BucketLookup::Auto,
            timeout: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_bucket_lookup(mut self, lookup: BucketLookup) -> Self {
        self.bucket_lookup = lookup;
        self
    }

    /// Whether `host` is a full endpoint URL rather than a bare domain
    fn has_explicit_endpoint(&self) -> bool {
        self.host.contains("://")
    }

    /// Service endpoint, e.g. `https://ams3.digitaloceanspaces.com`
    pub fn endpoint(&self) -> Result<Url> {
        let url = if self.has_explicit_endpoint() {
            Url::parse(&self.host)?
        } else {
            Url::parse(&format!("https://{}.{}", self.region, self.host))?
        };
        Ok(url)
    }

    /// Whether requests should use path-style addressing
    pub fn path_style(&self) -> bool {
        match self.bucket_lookup {
            BucketLookup::Path => true,
            BucketLookup::Dns => false,
            BucketLookup::Auto => self.has_explicit_endpoint(),
        }
    }

    /// Unsigned URL of an object
    ///
    /// Always returns a value; for private objects the URL simply will not
    /// authenticate.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<String> {
        let mut url = self.endpoint()?;

        if !self.path_style() {
            let host = url
                .host_str()
                .ok_or_else(|| Error::Config(format!("Endpoint has no host: {url}")))?
                .to_string();
            url.set_host(Some(&format!("{bucket}.{host}")))?;
        }

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config("Endpoint cannot carry a path".into()))?;
            segments.pop_if_empty();
            if self.path_style() {
                segments.push(bucket);
            }
            segments.extend(key.split('/'));
        }

        Ok(url.to_string())
    }
}
