// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent stack and object version ID confusion.

mod id;
mod stack_name;

pub use id::{Id, StackId, VersionId};
pub use stack_name::{StackName, StackNameError};
