//! Space handles
//!
//! A [`SpaceHandle`] is a cheap, cloneable reference to one bucket. It holds
//! no mutable state: the name and the store live in a shared
//! [`SpaceContext`] that every [`FileHandle`] taken from the space also
//! points at.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::acl::{self, AclTarget, CannedAcl};
use crate::cors::{CorsMethod, CorsRule, CorsRuleSet};
use crate::error::{Error, Result};
use crate::file::FileHandle;
use crate::listing::ListingAggregator;
use crate::traits::{ObjectBody, ObjectMetadata, ObjectStore, PutObject};

/// Identity shared by a space and its files
pub struct SpaceContext {
    pub(crate) name: String,
    pub(crate) store: Arc<dyn ObjectStore>,
}

impl fmt::Debug for SpaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceContext")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Optional parameters of an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Upload with a `public-read` ACL instead of `private`
    pub public: bool,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    /// User metadata (`x-amz-meta-*`)
    pub metadata: BTreeMap<String, String>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    pub fn content_encoding(mut self, value: impl Into<String>) -> Self {
        self.content_encoding = Some(value.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn into_put(self, key: &str, body: ObjectBody) -> PutObject {
        PutObject {
            key: key.to_string(),
            body,
            acl: CannedAcl::from_public(self.public),
            content_type: self.content_type,
            cache_control: self.cache_control,
            content_disposition: self.content_disposition,
            content_encoding: self.content_encoding,
            metadata: self.metadata,
        }
    }
}

/// One space (bucket)
#[derive(Debug, Clone)]
pub struct SpaceHandle {
    inner: Arc<SpaceContext>,
}

impl SpaceHandle {
    /// Handle for `name` without checking that it exists
    ///
    /// Use [`crate::StorageService::open`] for a validated handle.
    pub fn new(name: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner: Arc::new(SpaceContext {
                name: name.into(),
                store,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn context(&self) -> Arc<SpaceContext> {
        self.inner.clone()
    }

    fn store(&self) -> &dyn ObjectStore {
        self.inner.store.as_ref()
    }

    /// Whether anonymous users can list and read this space
    pub async fn is_public(&self) -> Result<bool> {
        acl::fetch_is_public(self.store(), AclTarget::Space(self.name()))
            .await
            .map_err(|e| self.not_found(e))
    }

    pub async fn make_public(&self) -> Result<()> {
        self.set_public(true).await
    }

    pub async fn make_private(&self) -> Result<()> {
        self.set_public(false).await
    }

    async fn set_public(&self, public: bool) -> Result<()> {
        acl::set_public(self.store(), AclTarget::Space(self.name()), public)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Every file under `prefix`, keyed by object key
    ///
    /// Handles are seeded with the listing's size, ETag and modification time.
    pub async fn list_files(&self, prefix: &str) -> Result<BTreeMap<String, FileHandle>> {
        let items = ListingAggregator::new(self.store(), self.name())
            .list_all(prefix)
            .await
            .map_err(|e| self.not_found(e))?;

        Ok(items
            .into_iter()
            .map(|summary| {
                let file = FileHandle::from_known(self, summary.key.clone(), ObjectMetadata::from(&summary));
                (summary.key, file)
            })
            .collect())
    }

    /// Validated handle for an existing file
    pub async fn file(&self, key: &str) -> Result<FileHandle> {
        FileHandle::open(self, key).await
    }

    /// Upload `text` as the object `key`
    pub async fn upload_text(&self, text: &str, key: &str, options: UploadOptions) -> Result<FileHandle> {
        let body = ObjectBody::Bytes(text.as_bytes().to_vec());
        self.put(key, body, options).await
    }

    /// Upload a local file
    ///
    /// The key defaults to the file name and the content type to a guess from
    /// the extension.
    pub async fn upload_file(
        &self,
        local: &Path,
        key: Option<&str>,
        mut options: UploadOptions,
    ) -> Result<FileHandle> {
        let key = match key {
            Some(key) => key.to_string(),
            None => local
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidPath(format!("No file name in {}", local.display())))?,
        };

        if options.content_type.is_none() {
            options.content_type = mime_guess::from_path(local).first_raw().map(str::to_string);
        }

        self.put(&key, ObjectBody::File(local.to_path_buf()), options).await
    }

    async fn put(&self, key: &str, body: ObjectBody, options: UploadOptions) -> Result<FileHandle> {
        let request = options.into_put(key, body);
        let content_type = request.content_type.clone();
        tracing::debug!(space = self.name(), key, acl = request.acl.as_str(), "Uploading");

        let receipt = self
            .store()
            .put_object(self.name(), request)
            .await
            .map_err(|e| self.not_found(e))?;

        let seed = ObjectMetadata {
            e_tag: receipt.e_tag,
            content_type,
            ..Default::default()
        };
        Ok(FileHandle::from_known(self, key, seed))
    }

    /// Recursively upload `local` under `prefix`, returning the file count
    pub async fn upload_directory(&self, local: &Path, prefix: Option<&str>) -> Result<usize> {
        let prefix = prefix.unwrap_or_default();
        tracing::debug!(space = self.name(), prefix, path = %local.display(), "Uploading directory");
        self.store()
            .upload_directory(self.name(), local, prefix)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Recursively download every key under `prefix` into `local`
    ///
    /// The prefix is stripped, so `logs/a.txt` lands at `local/a.txt`.
    pub async fn download_directory(&self, local: &Path, prefix: Option<&str>) -> Result<usize> {
        let prefix = prefix.unwrap_or_default();
        tracing::debug!(space = self.name(), prefix, path = %local.display(), "Downloading directory");
        self.store()
            .download_directory(self.name(), local, prefix)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Delete every file under `prefix`, returning the count
    pub async fn delete_directory(&self, prefix: &str) -> Result<usize> {
        tracing::debug!(space = self.name(), prefix, "Deleting prefix");
        self.store()
            .delete_prefix(self.name(), prefix)
            .await
            .map_err(|e| self.not_found(e))
    }

    /// Delete every file, then the space itself
    pub async fn destroy(self) -> Result<()> {
        let deleted = self.delete_directory("").await?;
        self.store()
            .delete_bucket(self.name())
            .await
            .map_err(|e| self.not_found(e))?;
        tracing::info!(space = self.name(), files = deleted, "Space destroyed");
        Ok(())
    }

    /// CORS rules of this space
    pub fn cors(&self) -> CorsRuleSet<'_> {
        CorsRuleSet::new(self.store(), self.name())
    }

    /// Current CORS rules, `None` when none are configured
    pub async fn cors_rules(&self) -> Result<Option<Vec<CorsRule>>> {
        self.cors().get().await.map_err(|e| self.not_found(e))
    }

    pub async fn add_cors_origin(
        &self,
        origin: &str,
        methods: Vec<CorsMethod>,
        max_age_seconds: u32,
        headers: Vec<String>,
    ) -> Result<()> {
        self.cors()
            .add_origin(origin, methods, max_age_seconds, headers)
            .await
            .map_err(|e| self.not_found(e))
    }

    pub async fn remove_cors_origin(&self, origin: &str) -> Result<()> {
        self.cors()
            .remove_origin(origin)
            .await
            .map_err(|e| self.not_found(e))
    }

    pub async fn remove_all_cors_origins(&self) -> Result<()> {
        self.cors().remove_all().await.map_err(|e| self.not_found(e))
    }

    fn not_found(&self, err: Error) -> Error {
        if err.is_not_found() {
            Error::SpaceNotFound(self.name().to_string())
        } else {
            err
        }
    }
}
