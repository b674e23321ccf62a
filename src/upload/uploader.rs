// ABOUTME: Uploads each target in order, tolerating per-object failures.
// ABOUTME: Account-level denial or an unclassified provider error stops the batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{ObjectProperties, UploadError, UploadTarget};
use crate::context::{DeploymentContext, Variables};
use crate::diagnostics::{Diagnostics, Warning};
use crate::files;
use crate::provider::{
    Disposition, ErrorClass, ObjectStore, ProviderError, PutObjectRequest, PutObjectResponse, references,
};
use crate::substitution::FileSubstitution;

/// One attempted upload. `response` is `None` when the object failed in a way
/// the batch tolerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub request: PutObjectRequest,
    pub response: Option<PutObjectResponse>,
}

impl UploadResult {
    pub fn succeeded(&self) -> bool {
        self.response.is_some()
    }
}

/// A local file resolved from a target, with its destination key.
struct ResolvedFile {
    path: PathBuf,
    key: String,
}

pub struct BatchUploader<'a> {
    store: &'a dyn ObjectStore,
    substitutor: &'a dyn FileSubstitution,
    bucket: String,
    diagnostics: Diagnostics,
}

impl<'a> BatchUploader<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        substitutor: &'a dyn FileSubstitution,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            substitutor,
            bucket: bucket.into(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Per-object warnings raised so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Upload every target in order and publish `Output.Files[<key>]` for each
    /// stored object.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::AccessDenied` as soon as the store denies access;
    /// no later targets are attempted. A missing explicit file or package is
    /// also fatal.
    pub async fn upload(
        &mut self,
        targets: &[UploadTarget],
        context: &mut DeploymentContext,
    ) -> Result<Vec<UploadResult>, UploadError> {
        let mut results = Vec::new();

        for target in targets {
            let resolved = self.resolve(target, context)?;
            if resolved.is_empty() {
                tracing::info!("No files to upload for {}", target.describe());
                continue;
            }

            for file in resolved {
                let request = self.request(file, target.properties(), &context.variables);
                let result = self.put(request).await?;

                if let Some(response) = &result.response {
                    publish(target, &result.request, response, context);
                }
                results.push(result);
            }
        }

        let uploaded = results.iter().filter(|r| r.succeeded()).count();
        tracing::info!(
            "Uploaded {uploaded} of {} object(s) to {}",
            results.len(),
            self.bucket
        );
        Ok(results)
    }

    fn resolve(
        &self,
        target: &UploadTarget,
        context: &DeploymentContext,
    ) -> Result<Vec<ResolvedFile>, UploadError> {
        let variables = &context.variables;

        match target {
            UploadTarget::Package { key, .. } => {
                let path = context.package_path().ok_or(UploadError::NoPackage)?;
                require_file(path)?;
                let key = match key {
                    Some(key) => variables.evaluate(key),
                    None => file_name(path),
                };
                Ok(vec![ResolvedFile {
                    path: path.to_path_buf(),
                    key,
                }])
            }

            UploadTarget::File {
                path,
                key,
                substitute,
                ..
            } => {
                let path = context.resolve_path(variables.evaluate(&path.to_string_lossy()));
                require_file(&path)?;
                if *substitute {
                    self.substitutor.substitute(&path, variables)?;
                }
                let key = match key {
                    Some(key) => variables.evaluate(key),
                    None => file_name(&path),
                };
                Ok(vec![ResolvedFile { path, key }])
            }

            UploadTarget::FileSet {
                pattern,
                key_prefix,
                substitution_patterns,
                ..
            } => {
                let staging = context.staging_directory();
                let matched = files::glob_files(staging, &[variables.evaluate(pattern)])?;

                if let Some(patterns) = substitution_patterns
                    && !matched.is_empty()
                {
                    let patterns = files::split_patterns(&variables.evaluate(patterns));
                    let selected = files::glob_files(staging, &patterns)?;
                    for path in matched.iter().filter(|p| selected.contains(p)) {
                        self.substitutor.substitute(path, variables)?;
                    }
                }

                let prefix = variables.evaluate(key_prefix);
                Ok(matched
                    .into_iter()
                    .map(|path| {
                        let key = format!("{prefix}{}", relative_key(staging, &path));
                        ResolvedFile { path, key }
                    })
                    .collect())
            }
        }
    }

    fn request(
        &self,
        file: ResolvedFile,
        properties: &ObjectProperties,
        variables: &Variables,
    ) -> PutObjectRequest {
        let evaluate_all = |map: &BTreeMap<String, String>| {
            map.iter()
                .map(|(k, v)| (k.clone(), variables.evaluate(v)))
                .collect()
        };

        PutObjectRequest {
            bucket: self.bucket.clone(),
            key: file.key,
            file_path: file.path,
            storage_class: properties.storage_class,
            acl: properties.acl,
            metadata: evaluate_all(&properties.metadata),
            tags: evaluate_all(&properties.tags),
        }
    }

    async fn put(&mut self, request: PutObjectRequest) -> Result<UploadResult, UploadError> {
        tracing::info!(
            "Uploading {} to {}/{}",
            request.file_path.display(),
            request.bucket,
            request.key
        );

        match self.store.put_object(&request).await {
            Ok(response) => {
                tracing::debug!(
                    "Stored {} as version {}",
                    request.key,
                    response
                        .version_id
                        .as_ref()
                        .map(|v| v.as_str())
                        .unwrap_or("null")
                );
                Ok(UploadResult {
                    request,
                    response: Some(response),
                })
            }
            Err(error) => self.handle_failure(request, error),
        }
    }

    fn handle_failure(
        &mut self,
        request: PutObjectRequest,
        error: ProviderError,
    ) -> Result<UploadResult, UploadError> {
        let class = error.class();
        match (class, class.disposition()) {
            (ErrorClass::AccessDenied, _) => Err(UploadError::AccessDenied {
                key: request.key,
                source: error,
            }),
            (_, Disposition::Ignorable) => {
                self.diagnostics.warn(Warning::new(
                    references::UPLOAD_OBJECT_FAILED,
                    format!(
                        "could not upload {} to {}: {error}",
                        request.file_path.display(),
                        request.key
                    ),
                ));
                Ok(UploadResult {
                    request,
                    response: None,
                })
            }
            _ => Err(UploadError::Provider {
                key: request.key,
                source: error,
            }),
        }
    }
}

/// Publish outputs for one stored object.
fn publish(
    target: &UploadTarget,
    request: &PutObjectRequest,
    response: &PutObjectResponse,
    context: &mut DeploymentContext,
) {
    let version = response
        .version_id
        .as_ref()
        .map(|v| v.as_str().to_string())
        .unwrap_or_else(|| "null".to_string());

    let variables = &mut context.variables;
    variables.set_output(&format!("Files[{}]", request.key), version.clone());

    if matches!(target, UploadTarget::Package { .. }) {
        variables.set_output("Package.Key", request.key.clone());
        variables.set_output(
            "Package.S3Uri",
            format!("s3://{}/{}", request.bucket, request.key),
        );
        variables.set_output("Package.ObjectVersion", version);
    }
}

fn require_file(path: &Path) -> Result<(), UploadError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(UploadError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Staging-relative path with `/` separators.
fn relative_key(staging: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(staging).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
