//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from spaces-core.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, CorsConfiguration, Delete, ObjectCannedAcl, ObjectIdentifier,
};
use tokio::io::AsyncWriteExt;
use url::Url;

use spaces_core::credentials::SIGNING_REGION;
use spaces_core::timestamp;
use spaces_core::{
    BucketSummary, CannedAcl, CorsRule, Credentials, Error, Grant, ListObjectsRequest,
    ListPage, ListingAggregator, ObjectBody, ObjectMetadata, ObjectStore, ObjectSummary,
    PutObject, PutReceipt, Result,
};

use crate::convert::{
    clean_etag, cors_error, cors_rule_from_sdk, cors_rule_to_sdk, delete_outcome, grant_from_sdk,
    sdk_error,
};
use crate::transfer;

/// Maximum number of keys per delete-objects request
const DELETE_BATCH_SIZE: usize = 1000;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    credentials: Credentials,
}

impl S3Client {
    /// Build a signing client for `credentials`
    pub async fn new(credentials: Credentials) -> Result<Self> {
        let endpoint = credentials.endpoint()?;

        let provider = aws_credential_types::Credentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None, // session token
            None, // expiry
            "spaces-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(provider)
            .region(aws_config::Region::new(SIGNING_REGION))
            .endpoint_url(endpoint.as_str().trim_end_matches('/'));

        if let Some(timeout) = credentials.timeout {
            loader = loader.timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .connect_timeout(Duration::from_millis(timeout.connect_ms))
                    .read_timeout(Duration::from_millis(timeout.read_ms))
                    .build(),
            );
        }

        let config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(credentials.path_style())
            .build();

        tracing::debug!(
            endpoint = %endpoint,
            path_style = credentials.path_style(),
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            credentials,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<usize> {
        let objects = keys
            .iter()
            .map(|key| {
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|e| Error::General(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(sdk_error)?;

        delete_outcome(bucket, &response)
    }
}

/// Run `delete` over `keys` in chunks of `batch_size`, summing the counts
///
/// Stops at the first failing batch.
async fn delete_in_batches<F, Fut>(keys: &[String], batch_size: usize, mut delete: F) -> Result<usize>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<usize>>,
{
    let mut deleted = 0;
    for batch in keys.chunks(batch_size.max(1)) {
        deleted += delete(batch.to_vec()).await?;
    }
    Ok(deleted)
}

/// Path-style copy source `bucket/key` with the key percent-encoded
fn copy_source(bucket: &str, key: &str) -> Result<String> {
    let mut url = Url::parse("https://copy-source.invalid/")?;
    url.path_segments_mut()
        .map_err(|_| Error::General("Cannot build copy source".into()))?
        .pop_if_empty()
        .push(bucket)
        .extend(key.split('/'));
    Ok(url.path().trim_start_matches('/').to_string())
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        let response = self.inner.list_buckets().send().await.map_err(sdk_error)?;

        Ok(response
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().map(|d| d.secs()),
            })
            .collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match sdk_error(e) {
                e if e.is_not_found() => Ok(false),
                e => Err(e),
            },
        }
    }

    async fn create_bucket(&self, bucket: &str, acl: CannedAcl) -> Result<()> {
        self.inner
            .create_bucket()
            .bucket(bucket)
            .acl(BucketCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.head_object(bucket, key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(ObjectMetadata {
            e_tag: response.e_tag().map(clean_etag),
            last_modified: response.last_modified().map(|d| d.secs()),
            content_type: response.content_type().map(str::to_string),
            content_length: response.content_length(),
            expiration: response
                .expiration()
                .and_then(timestamp::parse_expiration_header),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let mut response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        let partial = transfer::partial_path(dest);
        let written = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            while let Some(chunk) = response
                .body
                .try_next()
                .await
                .map_err(|e| Error::Network(e.to_string()))?
            {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<_, Error>(())
        }
        .await;

        transfer::finish_partial(&partial, dest, written).await
    }

    async fn put_object(&self, bucket: &str, request: PutObject) -> Result<PutReceipt> {
        let body = match &request.body {
            ObjectBody::Bytes(bytes) => ByteStream::from(bytes.clone()),
            ObjectBody::File(path) => ByteStream::from_path(path).await.map_err(|e| {
                Error::Io(std::io::Error::other(format!("{}: {e}", path.display())))
            })?,
        };

        let metadata = if request.metadata.is_empty() {
            None
        } else {
            Some(request.metadata.into_iter().collect::<HashMap<_, _>>())
        };

        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(&request.key)
            .body(body)
            .acl(ObjectCannedAcl::from(request.acl.as_str()))
            .set_content_type(request.content_type)
            .set_cache_control(request.cache_control)
            .set_content_disposition(request.content_disposition)
            .set_content_encoding(request.content_encoding)
            .set_metadata(metadata)
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(PutReceipt {
            e_tag: response.e_tag().map(clean_etag),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize> {
        let keys: Vec<String> = ListingAggregator::new(self, bucket)
            .list_all(prefix)
            .await?
            .into_iter()
            .map(|item| item.key)
            .collect();

        let deleted = delete_in_batches(&keys, DELETE_BATCH_SIZE, |batch| async move {
            self.delete_batch(bucket, &batch).await
        })
        .await?;
        tracing::debug!(bucket, prefix, deleted, "Deleted prefix");
        Ok(deleted)
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
        acl: CannedAcl,
    ) -> Result<()> {
        self.inner
            .copy_object()
            .copy_source(copy_source(bucket, source_key)?)
            .bucket(bucket)
            .key(dest_key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, request: &ListObjectsRequest) -> Result<ListPage> {
        let prefix = Some(request.prefix.clone()).filter(|p| !p.is_empty());

        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix)
            .max_keys(request.max_keys)
            .set_continuation_token(request.continuation_token.clone())
            .fetch_owner(request.fetch_owner)
            .send()
            .await
            .map_err(sdk_error)?;

        let items = response
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or(0),
                last_modified: object.last_modified().map(|d| d.secs()),
                e_tag: object.e_tag().map(clean_etag),
                storage_class: object.storage_class().map(|sc| sc.as_str().to_string()),
            })
            .collect();

        Ok(ListPage {
            items,
            next_continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_bucket_acl(&self, bucket: &str) -> Result<Vec<Grant>> {
        let response = self
            .inner
            .get_bucket_acl()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(response.grants().iter().filter_map(grant_from_sdk).collect())
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<()> {
        self.inner
            .put_bucket_acl()
            .bucket(bucket)
            .acl(BucketCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Vec<Grant>> {
        let response = self
            .inner
            .get_object_acl()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(response.grants().iter().filter_map(grant_from_sdk).collect())
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: CannedAcl) -> Result<()> {
        self.inner
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn get_bucket_cors(&self, bucket: &str) -> Result<Vec<CorsRule>> {
        let response = self
            .inner
            .get_bucket_cors()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| cors_error(bucket, e))?;
        Ok(response.cors_rules().iter().map(cors_rule_from_sdk).collect())
    }

    async fn put_bucket_cors(&self, bucket: &str, rules: &[CorsRule]) -> Result<()> {
        let rules = rules
            .iter()
            .map(cors_rule_to_sdk)
            .collect::<Result<Vec<_>>>()?;
        let configuration = CorsConfiguration::builder()
            .set_cors_rules(Some(rules))
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        self.inner
            .put_bucket_cors()
            .bucket(bucket)
            .cors_configuration(configuration)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_cors(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket_cors()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| Error::InvalidExpiry(e.to_string()))?;

        let request = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(sdk_error)?;
        Ok(request.uri().to_string())
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<String> {
        self.credentials.object_url(bucket, key)
    }

    async fn upload_directory(&self, bucket: &str, local: &Path, prefix: &str) -> Result<usize> {
        let files = transfer::walk_files(local).await?;
        for file in &files {
            let key = transfer::key_for(prefix, &file.relative);
            let request = PutObject {
                key,
                body: ObjectBody::File(file.path.clone()),
                acl: CannedAcl::Private,
                content_type: mime_guess::from_path(&file.path)
                    .first_raw()
                    .map(str::to_string),
                cache_control: None,
                content_disposition: None,
                content_encoding: None,
                metadata: Default::default(),
            };
            self.put_object(bucket, request).await?;
        }
        tracing::debug!(bucket, prefix, files = files.len(), "Uploaded directory");
        Ok(files.len())
    }

    async fn download_directory(&self, bucket: &str, local: &Path, prefix: &str) -> Result<usize> {
        let items = ListingAggregator::new(self, bucket).list_all(prefix).await?;

        let mut count = 0;
        for item in &items {
            let Some(dest) = transfer::local_path_for(local, prefix, &item.key) else {
                tracing::debug!(key = %item.key, "Skipping key with no local file name");
                continue;
            };
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            self.download_object(bucket, &item.key, &dest).await?;
            count += 1;
        }
        tracing::debug!(bucket, prefix, files = count, "Downloaded directory");
        Ok(count)
    }
}
