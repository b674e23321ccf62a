// ABOUTME: Object store backed by directories, one per bucket.
// ABOUTME: Versions every put and reports provider-style error codes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::io_error;
use crate::provider::{ObjectStore, ProviderError, PutObjectRequest, PutObjectResponse};
use crate::types::VersionId;

const MAX_KEY_BYTES: usize = 1024;
const MAX_METADATA_BYTES: usize = 2048;
const MAX_TAGS: usize = 10;

/// Sidecar record kept next to every stored object.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ObjectRecord {
    versions: Vec<ObjectVersion>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectVersion {
    version_id: String,
    storage_class: String,
    acl: String,
    metadata: std::collections::BTreeMap<String, String>,
    tags: std::collections::BTreeMap<String, String>,
}

/// Object store writing into `<root>/<bucket>/<key>`.
///
/// Buckets must already exist as directories.
#[derive(Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    fn validate(request: &PutObjectRequest) -> Result<(), ProviderError> {
        if request.key.is_empty() || request.key.len() > MAX_KEY_BYTES {
            return Err(ProviderError::new(
                "KeyTooLongError",
                format!("Your key is too long: {} bytes", request.key.len()),
            ));
        }

        let escapes = Path::new(&request.key)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(ProviderError::new(
                "InvalidArgument",
                format!("Invalid object key: {}", request.key),
            ));
        }

        let metadata_size: usize = request
            .metadata
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum();
        if metadata_size > MAX_METADATA_BYTES {
            return Err(ProviderError::new(
                "MetadataTooLarge",
                format!("Your metadata headers exceed the maximum allowed metadata size: {metadata_size}"),
            ));
        }

        if request.tags.len() > MAX_TAGS {
            return Err(ProviderError::new(
                "InvalidArgument",
                format!("Object tags cannot be greater than {MAX_TAGS}"),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        request: &PutObjectRequest,
    ) -> Result<PutObjectResponse, ProviderError> {
        Self::validate(request)?;

        let bucket_dir = self.root.join(&request.bucket);
        if !bucket_dir.is_dir() {
            return Err(ProviderError::new(
                "NoSuchBucket",
                format!("The specified bucket does not exist: {}", request.bucket),
            ));
        }

        let _guard = self.lock.lock();
        let object_path = bucket_dir.join(&request.key);
        if let Some(parent) = object_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
        }
        std::fs::copy(&request.file_path, &object_path)
            .map_err(|e| io_error("copy", &request.file_path, e))?;

        let record_path = self
            .root
            .join(format!("{}.versions", request.bucket))
            .join(format!("{}.json", request.key));
        let mut record: ObjectRecord = if record_path.exists() {
            let content = std::fs::read_to_string(&record_path)
                .map_err(|e| io_error("read", &record_path, e))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            ObjectRecord::default()
        };

        let version_id = format!("v{}", record.versions.len() + 1);
        record.versions.push(ObjectVersion {
            version_id: version_id.clone(),
            storage_class: request.storage_class.to_string(),
            acl: request.acl.to_string(),
            metadata: request.metadata.clone(),
            tags: request.tags.clone(),
        });

        if let Some(parent) = record_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
        }
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| ProviderError::new("InternalFailure", e.to_string()))?;
        std::fs::write(&record_path, json).map_err(|e| io_error("write", &record_path, e))?;

        Ok(PutObjectResponse {
            version_id: Some(VersionId::new(version_id)),
            etag: None,
        })
    }
}
