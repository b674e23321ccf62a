// ABOUTME: Infrastructure stack lifecycle: status model, descriptor, reconciler, conventions.
// ABOUTME: The reconciler is the only place that talks to a stack provider.

mod convention;
mod descriptor;
mod error;
mod reconciler;
pub mod status;

pub use convention::{DeleteStack, DeployStack, STACK_ID_OUTPUT, StackSettings};
pub use descriptor::{StackDescriptor, load_parameters_file};
pub use error::StackError;
pub use reconciler::{
    DEFAULT_POLL_INTERVAL, ReconcileOutcome, StackAction, StackReconciler, WaitOptions,
};
pub use status::{StackStatus, StatusOutcome};
