//! spaces-core: domain layer for S3-compatible "Spaces" object storage
//!
//! This crate models an account ([`StorageService`]), its buckets
//! ([`SpaceHandle`]) and their objects ([`FileHandle`]) on top of the
//! [`ObjectStore`] trait. It also provides:
//! - public/private resolution from raw ACL grants
//! - aggregation of paginated listings
//! - add/remove-by-origin editing of CORS rules
//! - configuration, alias and path handling for the CLI
//!
//! Nothing here depends on a particular S3 SDK; `spaces-s3` provides the
//! production [`ObjectStore`].

pub mod acl;
pub mod alias;
pub mod config;
pub mod cors;
pub mod credentials;
pub mod error;
pub mod expiry;
pub mod file;
pub mod listing;
pub mod path;
pub mod service;
pub mod space;
pub mod timestamp;
pub mod traits;

pub use acl::{AclTarget, CannedAcl, Grant, Grantee, Permission};
pub use alias::{Alias, AliasManager};
pub use config::{Config, ConfigManager};
pub use cors::{CorsMethod, CorsRule, CorsRuleSet};
pub use credentials::{BucketLookup, Credentials, TimeoutConfig};
pub use error::{Error, Result};
pub use expiry::Expiry;
pub use file::FileHandle;
pub use listing::ListingAggregator;
pub use path::{ParsedPath, RemotePath, parse_path, parse_remote};
pub use service::StorageService;
pub use space::{SpaceHandle, UploadOptions};
pub use traits::{
    BucketSummary, ListObjectsRequest, ListPage, ObjectBody, ObjectMetadata, ObjectStore,
    ObjectSummary, PutObject, PutReceipt,
};
