//! spaces-s3: S3 SDK adapter for the spaces client
//!
//! This crate provides the implementation of the ObjectStore trait using
//! the aws-sdk-s3 crate. It is the only crate that directly depends on the
//! AWS SDK.

pub mod client;
mod convert;
pub mod transfer;

use std::sync::Arc;

use spaces_core::{Credentials, Result, StorageService};

pub use client::S3Client;

/// Build a signing client for `credentials` and open the account
///
/// Fails with [`spaces_core::Error::AuthenticationFailed`] when the service
/// rejects the credentials.
pub async fn connect(credentials: Credentials) -> Result<StorageService> {
    let client = S3Client::new(credentials).await?;
    StorageService::new(Arc::new(client)).await
}
