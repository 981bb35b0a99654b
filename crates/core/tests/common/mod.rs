//! In-memory ObjectStore for end-to-end tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use spaces_core::acl::ALL_USERS_URI;
use spaces_core::{
    BucketSummary, CannedAcl, CorsRule, Error, Grant, ListObjectsRequest, ListPage, ObjectBody,
    ObjectMetadata, ObjectStore, ObjectSummary, Permission, PutObject, PutReceipt, Result,
};

const NOW: i64 = 1_700_000_000;

#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: Option<String>,
    acl: CannedAcl,
    e_tag: String,
}

#[derive(Default)]
struct Bucket {
    objects: BTreeMap<String, StoredObject>,
    acl: CannedAcl,
    cors: Option<Vec<CorsRule>>,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    next_etag: u64,
}

/// A single-account object store held in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    deny_all: bool,
    list_calls: AtomicUsize,
    head_calls: AtomicUsize,
}

fn no_such_bucket(bucket: &str) -> Error {
    Error::service("NoSuchBucket", Some(404), format!("{bucket} does not exist"))
}

fn no_such_key(key: &str) -> Error {
    Error::service("NoSuchKey", Some(404), format!("{key} does not exist"))
}

fn grants(acl: CannedAcl) -> Vec<Grant> {
    let mut grants = vec![Grant::user("owner", Permission::FullControl)];
    if acl == CannedAcl::PublicRead {
        grants.push(Grant::group(ALL_USERS_URI, Permission::Read));
    }
    grants
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every request as unauthenticated
    pub fn denying() -> Self {
        Self {
            deny_all: true,
            ..Self::default()
        }
    }

    /// Number of list-objects calls served
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of head-object calls served
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    fn check_auth(&self) -> Result<()> {
        if self.deny_all {
            return Err(Error::service("InvalidAccessKeyId", Some(403), "unknown key"));
        }
        Ok(())
    }

    fn with_bucket<T>(&self, bucket: &str, f: impl FnOnce(&mut Bucket) -> Result<T>) -> Result<T> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        let bucket_state = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        f(bucket_state)
    }

    fn store(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: Option<String>, acl: CannedAcl) -> Result<String> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        state.next_etag += 1;
        let e_tag = format!("{:032x}", state.next_etag);
        let bucket_state = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        bucket_state.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type,
                acl,
                e_tag: e_tag.clone(),
            },
        );
        Ok(e_tag)
    }

    fn object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        self.with_bucket(bucket, |b| b.objects.get(key).cloned().ok_or_else(|| no_such_key(key)))
    }
}

fn collect_files(dir: &Path, base: &Path, out: &mut Vec<(String, std::path::PathBuf)>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, base, out)?;
        } else {
            let rel = path
                .strip_prefix(base)
                .map_err(|e| Error::General(e.to_string()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.push((rel, path));
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        self.check_auth()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .buckets
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: Some(NOW),
            })
            .collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.check_auth()?;
        Ok(self.state.lock().unwrap().buckets.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str, acl: CannedAcl) -> Result<()> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        if state.buckets.contains_key(bucket) {
            return Err(Error::service("BucketAlreadyExists", Some(409), bucket));
        }
        state.buckets.insert(
            bucket.to_string(),
            Bucket {
                acl,
                ..Bucket::default()
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        match state.buckets.get(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) if !b.objects.is_empty() => {
                Err(Error::service("BucketNotEmpty", Some(409), bucket))
            }
            Some(_) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.with_bucket(bucket, |b| Ok(b.objects.contains_key(key)))
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let object = self
            .object(bucket, key)
            .map_err(|_| Error::service("NotFound", Some(404), ""))?;
        Ok(ObjectMetadata {
            e_tag: Some(object.e_tag),
            last_modified: Some(NOW),
            content_type: object.content_type,
            content_length: Some(object.data.len() as i64),
            expiration: None,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        Ok(self.object(bucket, key)?.data)
    }

    async fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let object = self.object(bucket, key)?;
        std::fs::write(dest, object.data)?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, request: PutObject) -> Result<PutReceipt> {
        let data = match request.body {
            ObjectBody::Bytes(bytes) => bytes,
            ObjectBody::File(path) => std::fs::read(path)?,
        };
        let e_tag = self.store(bucket, &request.key, data, request.content_type, request.acl)?;
        Ok(PutReceipt { e_tag: Some(e_tag) })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.with_bucket(bucket, |b| {
            b.objects.remove(key);
            Ok(())
        })
    }

    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize> {
        self.with_bucket(bucket, |b| {
            let before = b.objects.len();
            b.objects.retain(|key, _| !key.starts_with(prefix));
            Ok(before - b.objects.len())
        })
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
        acl: CannedAcl,
    ) -> Result<()> {
        let source = self.object(bucket, source_key)?;
        self.store(bucket, dest_key, source.data, source.content_type, acl)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, request: &ListObjectsRequest) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.with_bucket(bucket, |b| {
            let mut matching = b
                .objects
                .iter()
                .filter(|(key, _)| key.starts_with(&request.prefix))
                .filter(|(key, _)| match &request.continuation_token {
                    Some(token) => key.as_str() > token.as_str(),
                    None => true,
                })
                .peekable();

            let mut items = Vec::new();
            while items.len() < request.max_keys as usize {
                let Some((key, object)) = matching.next() else {
                    break;
                };
                let mut summary = ObjectSummary::new(key.clone(), object.data.len() as i64);
                summary.e_tag = Some(object.e_tag.clone());
                summary.last_modified = Some(NOW);
                items.push(summary);
            }

            let next_continuation_token = match (matching.peek(), items.last()) {
                (Some(_), Some(last)) => Some(last.key.clone()),
                _ => None,
            };
            Ok(ListPage {
                items,
                next_continuation_token,
            })
        })
    }

    async fn get_bucket_acl(&self, bucket: &str) -> Result<Vec<Grant>> {
        self.with_bucket(bucket, |b| Ok(grants(b.acl)))
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<()> {
        self.with_bucket(bucket, |b| {
            b.acl = acl;
            Ok(())
        })
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Vec<Grant>> {
        Ok(grants(self.object(bucket, key)?.acl))
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: CannedAcl) -> Result<()> {
        self.with_bucket(bucket, |b| {
            let object = b.objects.get_mut(key).ok_or_else(|| no_such_key(key))?;
            object.acl = acl;
            Ok(())
        })
    }

    async fn get_bucket_cors(&self, bucket: &str) -> Result<Vec<CorsRule>> {
        self.with_bucket(bucket, |b| {
            b.cors
                .clone()
                .ok_or_else(|| Error::NoCorsConfiguration(bucket.to_string()))
        })
    }

    async fn put_bucket_cors(&self, bucket: &str, rules: &[CorsRule]) -> Result<()> {
        assert!(!rules.is_empty(), "empty CORS rule list written");
        self.with_bucket(bucket, |b| {
            b.cors = Some(rules.to_vec());
            Ok(())
        })
    }

    async fn delete_bucket_cors(&self, bucket: &str) -> Result<()> {
        self.with_bucket(bucket, |b| {
            b.cors = None;
            Ok(())
        })
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String> {
        self.check_auth()?;
        Ok(format!(
            "https://{bucket}.memory.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<String> {
        Ok(format!("https://{bucket}.memory.test/{key}"))
    }

    async fn upload_directory(&self, bucket: &str, local: &Path, prefix: &str) -> Result<usize> {
        let mut files = Vec::new();
        collect_files(local, local, &mut files)?;
        for (rel, path) in &files {
            let data = std::fs::read(path)?;
            self.store(bucket, &format!("{prefix}{rel}"), data, None, CannedAcl::Private)?;
        }
        Ok(files.len())
    }

    async fn download_directory(&self, bucket: &str, local: &Path, prefix: &str) -> Result<usize> {
        let objects: Vec<(String, Vec<u8>)> = self.with_bucket(bucket, |b| {
            Ok(b.objects
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, object)| (key[prefix.len()..].to_string(), object.data.clone()))
                .collect())
        })?;

        for (rel, data) in &objects {
            let dest = local.join(rel);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(dest, data)?;
        }
        Ok(objects.len())
    }
}
