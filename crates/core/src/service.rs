//! Storage service entry point

use std::sync::Arc;

use crate::acl::CannedAcl;
use crate::error::{Error, Result};
use crate::space::SpaceHandle;
use crate::traits::{BucketSummary, ObjectStore};

/// Bucket probed to check credentials on connect
pub const AUTH_PROBE_BUCKET: &str = "auth-check";

/// An authenticated connection to a Spaces account
pub struct StorageService {
    store: Arc<dyn ObjectStore>,
}

impl StorageService {
    /// Wrap a store, probing it once to reject bad credentials early
    ///
    /// Only an authentication failure aborts; any other probe outcome (the
    /// probe bucket existing or not, a network hiccup) is logged and ignored.
    pub async fn new(store: Arc<dyn ObjectStore>) -> Result<Self> {
        match store.bucket_exists(AUTH_PROBE_BUCKET).await {
            Ok(_) => {}
            Err(e) if e.is_auth_failure() => {
                return Err(Error::AuthenticationFailed(e.to_string()));
            }
            Err(e) => {
                tracing::debug!(error = %e, "Credential probe failed, continuing");
            }
        }
        Ok(Self { store })
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Every space of the account, with creation dates
    pub async fn buckets(&self) -> Result<Vec<BucketSummary>> {
        self.store.list_buckets().await
    }

    /// Every space of the account
    pub async fn list(&self) -> Result<Vec<SpaceHandle>> {
        Ok(self
            .buckets()
            .await?
            .into_iter()
            .map(|bucket| SpaceHandle::new(bucket.name, self.store.clone()))
            .collect())
    }

    /// Create a new space
    pub async fn create(&self, name: &str, public: bool) -> Result<SpaceHandle> {
        let acl = CannedAcl::from_public(public);
        self.store
            .create_bucket(name, acl)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    Error::SpaceAlreadyExists(name.to_string())
                } else {
                    e
                }
            })?;
        tracing::info!(space = name, acl = acl.as_str(), "Space created");
        Ok(SpaceHandle::new(name, self.store.clone()))
    }

    /// Open an existing space
    pub async fn open(&self, name: &str) -> Result<SpaceHandle> {
        if !self.store.bucket_exists(name).await? {
            return Err(Error::SpaceNotFound(name.to_string()));
        }
        Ok(SpaceHandle::new(name, self.store.clone()))
    }
}
