// ABOUTME: Batch upload of package and staged files to an object store.
// ABOUTME: Target kinds, the uploader, its errors, and the upload convention.

mod convention;
mod error;
mod target;
mod uploader;

pub use convention::UploadObjects;
pub use error::UploadError;
pub use target::{ObjectProperties, UploadTarget};
pub use uploader::{BatchUploader, UploadResult};
