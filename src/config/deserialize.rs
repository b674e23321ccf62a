// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Rejects empty upload target lists at parse time.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::upload::UploadTarget;

pub fn deserialize_targets<'de, D>(deserializer: D) -> Result<NonEmpty<UploadTarget>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let targets: Vec<UploadTarget> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(targets)
        .ok_or_else(|| serde::de::Error::custom("at least one upload target is required"))
}
