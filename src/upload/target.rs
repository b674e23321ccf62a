// ABOUTME: Upload target kinds read from the deployment file.
// ABOUTME: Whole package, one explicit file, or a glob-matched file set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::provider::{CannedAcl, StorageClass};

/// Object settings shared by every target kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectProperties {
    #[serde(default)]
    pub storage_class: StorageClass,
    #[serde(default)]
    pub acl: CannedAcl,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// One thing to upload.
///
/// Keys, paths and patterns may contain `#{Name}` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UploadTarget {
    /// The deployment's package file.
    Package {
        /// Defaults to the package file name.
        #[serde(default)]
        key: Option<String>,
        #[serde(flatten)]
        properties: ObjectProperties,
    },

    /// A single file, which must exist.
    File {
        path: PathBuf,
        /// Defaults to the file name.
        #[serde(default)]
        key: Option<String>,
        /// Substitute variables in the file before uploading it.
        #[serde(default)]
        substitute: bool,
        #[serde(flatten)]
        properties: ObjectProperties,
    },

    /// Every staged file matching a glob; keys are `key_prefix` plus the path
    /// relative to the staging directory.
    FileSet {
        pattern: String,
        #[serde(default)]
        key_prefix: String,
        /// Newline-delimited patterns selecting which matched files get
        /// variable substitution.
        #[serde(default)]
        substitution_patterns: Option<String>,
        #[serde(flatten)]
        properties: ObjectProperties,
    },
}

impl UploadTarget {
    pub fn properties(&self) -> &ObjectProperties {
        match self {
            UploadTarget::Package { properties, .. }
            | UploadTarget::File { properties, .. }
            | UploadTarget::FileSet { properties, .. } => properties,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            UploadTarget::Package { .. } => "package".to_string(),
            UploadTarget::File { path, .. } => format!("file {}", path.display()),
            UploadTarget::FileSet { pattern, .. } => format!("files matching {pattern}"),
        }
    }
}
