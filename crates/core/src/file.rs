//! File handles
//!
//! A [`FileHandle`] names one key in one space. Its metadata is fetched
//! lazily: each slot starts out either seeded (from a listing entry or an
//! upload) or unfetched, and the first read of an unfetched slot performs a
//! single head request that fills every slot at once. A slot that was
//! fetched and came back empty stays empty; it is not fetched again.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::acl::{self, AclTarget};
use crate::error::{Error, Result};
use crate::expiry::Expiry;
use crate::space::{SpaceContext, SpaceHandle};
use crate::traits::ObjectMetadata;

/// One cached metadata value
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<T> {
    Unfetched,
    Known(Option<T>),
}

impl<T> Slot<T> {
    /// A seeded slot: a present value is trusted, an absent one is unfetched
    fn seeded(value: Option<T>) -> Self {
        match value {
            Some(value) => Slot::Known(Some(value)),
            None => Slot::Unfetched,
        }
    }

    fn is_known(&self) -> bool {
        matches!(self, Slot::Known(_))
    }
}

impl<T: Clone> Slot<T> {
    fn value(&self) -> Option<T> {
        match self {
            Slot::Known(value) => value.clone(),
            Slot::Unfetched => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedMetadata {
    e_tag: Slot<String>,
    last_modified: Slot<i64>,
    content_type: Slot<String>,
    content_length: Slot<i64>,
    expiration: Slot<i64>,
}

impl CachedMetadata {
    fn empty() -> Self {
        Self::seeded(ObjectMetadata::default())
    }

    fn seeded(meta: ObjectMetadata) -> Self {
        Self {
            e_tag: Slot::seeded(meta.e_tag),
            last_modified: Slot::seeded(meta.last_modified),
            content_type: Slot::seeded(meta.content_type),
            content_length: Slot::seeded(meta.content_length),
            expiration: Slot::seeded(meta.expiration),
        }
    }

    /// Every slot known, including the empty ones
    fn fetched(meta: ObjectMetadata) -> Self {
        Self {
            e_tag: Slot::Known(meta.e_tag),
            last_modified: Slot::Known(meta.last_modified),
            content_type: Slot::Known(meta.content_type),
            content_length: Slot::Known(meta.content_length),
            expiration: Slot::Known(meta.expiration),
        }
    }

    fn is_complete(&self) -> bool {
        self.e_tag.is_known()
            && self.last_modified.is_known()
            && self.content_type.is_known()
            && self.content_length.is_known()
            && self.expiration.is_known()
    }

    fn snapshot(&self) -> ObjectMetadata {
        ObjectMetadata {
            e_tag: self.e_tag.value(),
            last_modified: self.last_modified.value(),
            content_type: self.content_type.value(),
            content_length: self.content_length.value(),
            expiration: self.expiration.value(),
        }
    }
}

/// One file in a space
#[derive(Debug)]
pub struct FileHandle {
    space: Arc<SpaceContext>,
    key: String,
    metadata: Mutex<CachedMetadata>,
}

impl FileHandle {
    /// Open an existing file, failing with [`Error::FileNotFound`] if absent
    pub async fn open(space: &SpaceHandle, key: impl Into<String>) -> Result<Self> {
        let handle = Self::trusted(space, key);
        let exists = handle
            .space
            .store
            .object_exists(&handle.space.name, &handle.key)
            .await
            .map_err(|e| handle.not_found(e))?;

        if !exists {
            return Err(handle.missing());
        }
        Ok(handle)
    }

    /// Handle for a key the caller has just seen, seeding the cache
    ///
    /// No request is made. Absent fields stay unfetched.
    pub fn from_known(space: &SpaceHandle, key: impl Into<String>, metadata: ObjectMetadata) -> Self {
        Self {
            space: space.context(),
            key: key.into(),
            metadata: Mutex::new(CachedMetadata::seeded(metadata)),
        }
    }

    /// Handle for a key the caller has just written, with an empty cache
    pub fn trusted(space: &SpaceHandle, key: impl Into<String>) -> Self {
        Self {
            space: space.context(),
            key: key.into(),
            metadata: Mutex::new(CachedMetadata::empty()),
        }
    }

    /// Object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the owning space
    pub fn space_name(&self) -> &str {
        &self.space.name
    }

    pub async fn e_tag(&self) -> Result<Option<String>> {
        self.slot(|m| &m.e_tag).await
    }

    /// Last modified, epoch seconds
    pub async fn last_modified(&self) -> Result<Option<i64>> {
        self.slot(|m| &m.last_modified).await
    }

    pub async fn content_type(&self) -> Result<Option<String>> {
        self.slot(|m| &m.content_type).await
    }

    pub async fn content_length(&self) -> Result<Option<i64>> {
        self.slot(|m| &m.content_length).await
    }

    /// Lifecycle expiration, epoch seconds
    pub async fn expiration(&self) -> Result<Option<i64>> {
        self.slot(|m| &m.expiration).await
    }

    /// Every metadata field, fetching first if any slot is unfetched
    pub async fn metadata(&self) -> Result<ObjectMetadata> {
        let mut cache = self.metadata.lock().await;
        if !cache.is_complete() {
            *cache = CachedMetadata::fetched(self.head().await?);
        }
        Ok(cache.snapshot())
    }

    /// Refetch every metadata field
    pub async fn refresh(&self) -> Result<ObjectMetadata> {
        let mut cache = self.metadata.lock().await;
        let meta = self.head().await?;
        *cache = CachedMetadata::fetched(meta.clone());
        Ok(meta)
    }

    /// Whether anonymous users can read this file
    pub async fn is_public(&self) -> Result<bool> {
        acl::fetch_is_public(self.space.store.as_ref(), self.acl_target())
            .await
            .map_err(|e| self.not_found(e))
    }

    pub async fn make_public(&self) -> Result<()> {
        self.set_public(true).await
    }

    pub async fn make_private(&self) -> Result<()> {
        self.set_public(false).await
    }

    /// Download the whole object into memory
    pub async fn contents(&self) -> Result<Vec<u8>> {
        tracing::debug!(space = %self.space.name, key = %self.key, "Fetching contents");
        self.space
            .store
            .get_object(&self.space.name, &self.key)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Download the object as UTF-8 text
    pub async fn contents_string(&self) -> Result<String> {
        let bytes = self.contents().await?;
        String::from_utf8(bytes).map_err(|e| {
            Error::General(format!("{}/{} is not valid UTF-8: {e}", self.space.name, self.key))
        })
    }

    /// Stream the object to a local file
    pub async fn download(&self, local: &Path) -> Result<()> {
        tracing::debug!(space = %self.space.name, key = %self.key, path = %local.display(), "Downloading");
        self.space
            .store
            .download_object(&self.space.name, &self.key, local)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Server-side copy to `new_key` in the same space
    ///
    /// The returned handle has an empty cache; this handle's cache is untouched.
    pub async fn copy(&self, new_key: &str, public: bool) -> Result<FileHandle> {
        let acl = acl::CannedAcl::from_public(public);
        tracing::debug!(space = %self.space.name, from = %self.key, to = new_key, acl = acl.as_str(), "Copying");
        self.space
            .store
            .copy_object(&self.space.name, &self.key, new_key, acl)
            .await
            .map_err(|e| self.not_found(e))?;

        Ok(FileHandle {
            space: self.space.clone(),
            key: new_key.to_string(),
            metadata: Mutex::new(CachedMetadata::empty()),
        })
    }

    /// Unsigned URL; only works for public files
    pub fn url(&self) -> Result<String> {
        self.space.store.object_url(&self.space.name, &self.key)
    }

    /// Presigned GET URL valid for `expiry`
    pub async fn signed_url(&self, expiry: &Expiry) -> Result<String> {
        let valid_for = expiry.resolve()?;
        self.space
            .store
            .presigned_get_url(&self.space.name, &self.key, valid_for)
            .await
    }

    /// Delete the file
    pub async fn delete(self) -> Result<()> {
        tracing::debug!(space = %self.space.name, key = %self.key, "Deleting file");
        self.space
            .store
            .delete_object(&self.space.name, &self.key)
            .await
            .map_err(|e| self.not_found(e))
    }

    async fn slot<T: Clone>(&self, pick: impl Fn(&CachedMetadata) -> &Slot<T>) -> Result<Option<T>> {
        let mut cache = self.metadata.lock().await;
        if let Slot::Known(value) = pick(&*cache) {
            return Ok(value.clone());
        }
        *cache = CachedMetadata::fetched(self.head().await?);
        Ok(pick(&*cache).value())
    }

    async fn head(&self) -> Result<ObjectMetadata> {
        tracing::debug!(space = %self.space.name, key = %self.key, "Fetching metadata");
        self.space
            .store
            .head_object(&self.space.name, &self.key)
            .await
            .map_err(|e| self.not_found(e))
    }

    async fn set_public(&self, public: bool) -> Result<()> {
        acl::set_public(self.space.store.as_ref(), self.acl_target(), public)
            .await
            .map_err(|e| self.not_found(e))
    }

    fn acl_target(&self) -> AclTarget<'_> {
        AclTarget::File {
            space: &self.space.name,
            key: &self.key,
        }
    }

    fn missing(&self) -> Error {
        Error::FileNotFound(format!("{}/{}", self.space.name, self.key))
    }

    fn not_found(&self, err: Error) -> Error {
        if err.is_not_found() { self.missing() } else { err }
    }
}
