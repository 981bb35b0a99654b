//! ObjectStore trait definition
//!
//! This trait is the contract between the domain layer and the signed-HTTP
//! object-storage client. The domain layer never touches the SDK directly:
//! every round trip goes through one of these methods and comes back as one
//! of the typed results below.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::acl::{CannedAcl, Grant};
use crate::cors::CorsRule;
use crate::error::Result;

/// Maximum number of keys a single listing call returns
pub const LIST_PAGE_SIZE: i32 = 1000;

/// A bucket as reported by the bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Bucket name
    pub name: String,

    /// Creation time, epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
}

/// One entry of an object listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size: i64,

    /// Last modified timestamp, epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    /// ETag with surrounding quotes removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectSummary {
    /// Create a summary for a key of the given size
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            e_tag: None,
            storage_class: None,
        }
    }
}

/// Object metadata as returned by a head request
///
/// Timestamps are epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<i64>,

    /// Lifecycle expiration, when a rule applies to the object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

impl From<&ObjectSummary> for ObjectMetadata {
    fn from(summary: &ObjectSummary) -> Self {
        Self {
            e_tag: summary.e_tag.clone(),
            last_modified: summary.last_modified,
            content_type: None,
            content_length: Some(summary.size),
            expiration: None,
        }
    }
}

/// Parameters of one list-objects-v2 call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsRequest {
    /// Key prefix to filter by (empty for the whole bucket)
    pub prefix: String,

    /// Maximum number of keys to return
    pub max_keys: i32,

    /// Cursor returned by the previous page
    pub continuation_token: Option<String>,

    /// Whether to include owner information
    pub fetch_owner: bool,
}

impl ListObjectsRequest {
    /// First-page request for a prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_keys: LIST_PAGE_SIZE,
            continuation_token: None,
            fetch_owner: false,
        }
    }
}

/// One page of an object listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Listed objects, in backend order
    pub items: Vec<ObjectSummary>,

    /// Cursor for the next page; absent or empty on the last page
    pub next_continuation_token: Option<String>,
}

/// Source of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// In-memory bytes
    Bytes(Vec<u8>),
    /// A local file, streamed by the client
    File(PathBuf),
}

/// A single put-object call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub key: String,
    pub body: ObjectBody,
    pub acl: CannedAcl,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    /// User metadata (`x-amz-meta-*`)
    pub metadata: BTreeMap<String, String>,
}

/// What a successful put reports back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutReceipt {
    pub e_tag: Option<String>,
}

/// Trait for S3-compatible storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
/// Implementations report failures as [`crate::Error::Service`] or
/// [`crate::Error::Network`]; the only translated condition is a bucket with
/// no CORS rules, reported as [`crate::Error::NoCorsConfiguration`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List buckets owned by the account
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>>;

    /// Check if a bucket exists
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket with a canned ACL
    async fn create_bucket(&self, bucket: &str, acl: CannedAcl) -> Result<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Check if an object exists
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Get object metadata
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Get object content as bytes
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Stream object content to a local file
    async fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<()>;

    /// Upload an object
    async fn put_object(&self, bucket: &str, request: PutObject) -> Result<PutReceipt>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Delete every object whose key starts with `prefix`, returning the count
    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize>;

    /// Server-side copy within one bucket
    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
        acl: CannedAcl,
    ) -> Result<()>;

    /// One list-objects-v2 call
    async fn list_objects(&self, bucket: &str, request: &ListObjectsRequest) -> Result<ListPage>;

    /// Get the bucket ACL grants
    async fn get_bucket_acl(&self, bucket: &str) -> Result<Vec<Grant>>;

    /// Replace the bucket ACL with a canned ACL
    async fn put_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<()>;

    /// Get the object ACL grants
    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Vec<Grant>>;

    /// Replace the object ACL with a canned ACL
    async fn put_object_acl(&self, bucket: &str, key: &str, acl: CannedAcl) -> Result<()>;

    /// Get the bucket CORS rules
    async fn get_bucket_cors(&self, bucket: &str) -> Result<Vec<CorsRule>>;

    /// Replace all bucket CORS rules
    async fn put_bucket_cors(&self, bucket: &str, rules: &[CorsRule]) -> Result<()>;

    /// Remove the bucket CORS configuration
    async fn delete_bucket_cors(&self, bucket: &str) -> Result<()>;

    /// Presign a GET request valid for `expires_in`
    async fn presigned_get_url(&self, bucket: &str, key: &str, expires_in: Duration)
    -> Result<String>;

    /// Unsigned URL of an object
    fn object_url(&self, bucket: &str, key: &str) -> Result<String>;

    /// Recursively upload a local directory under `prefix`, returning the file count
    async fn upload_directory(&self, bucket: &str, local: &Path, prefix: &str) -> Result<usize>;

    /// Recursively download every key under `prefix` into `local`, returning the file count
    async fn download_directory(&self, bucket: &str, local: &Path, prefix: &str)
    -> Result<usize>;
}
