// ABOUTME: Maps provider error codes and messages onto the engine's error taxonomy.
// ABOUTME: Shared by the stack reconciler and the batch uploader.

use std::fmt;

use super::ProviderError;

/// Codes meaning the caller's account or credentials were refused outright.
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AllAccessDisabled",
    "AccountProblem",
    "UnauthorizedOperation",
];

/// Object store codes that only concern the object being written.
const PER_OBJECT_CODES: &[&str] = &[
    "MalformedPOSTRequest",
    "UnexpectedContent",
    "MetadataTooLarge",
    "MaxMessageLengthExceeded",
    "KeyTooLongError",
    "SignatureDoesNotMatch",
    "InvalidStorageClass",
    "InvalidArgument",
];

/// Message the stack provider uses for an update with nothing to change. It has
/// no dedicated error code.
const NO_UPDATES_MESSAGE: &str = "no updates are to be performed";

/// Taxonomy bucket for a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Access to the account or operation was denied.
    AccessDenied,
    /// An update was rejected because the stack already matches.
    NothingToUpdate,
    /// The named stack does not exist.
    StackMissing,
    /// A recognised failure scoped to a single uploaded object.
    PerObject,
    /// Anything else.
    Unclassified,
}

/// What a caller should do with an error of a given class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Abort the step.
    Fatal,
    /// Treat as success.
    Recoverable,
    /// Warn and carry on with the remaining work.
    Ignorable,
}

impl ErrorClass {
    pub fn disposition(self) -> Disposition {
        match self {
            ErrorClass::AccessDenied | ErrorClass::Unclassified => Disposition::Fatal,
            ErrorClass::NothingToUpdate | ErrorClass::StackMissing => Disposition::Recoverable,
            ErrorClass::PerObject => Disposition::Ignorable,
        }
    }
}

/// Classify a provider error.
pub fn classify(error: &ProviderError) -> ErrorClass {
    let code = error.code.as_str();
    let message = error.message.to_ascii_lowercase();

    if ACCESS_DENIED_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        ErrorClass::AccessDenied
    } else if message.contains(NO_UPDATES_MESSAGE) {
        ErrorClass::NothingToUpdate
    } else if code.eq_ignore_ascii_case("ValidationError") && message.contains("does not exist") {
        ErrorClass::StackMissing
    } else if PER_OBJECT_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        ErrorClass::PerObject
    } else {
        ErrorClass::Unclassified
    }
}

/// Stable identifier attached to user-visible failures and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorReference(&'static str);

impl ErrorReference {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Every reference code the engine emits.
pub mod references {
    use super::ErrorReference;

    pub const STACK_STATUS_ACCESS_DENIED: ErrorReference = ErrorReference::new("STACK-0001");
    pub const STACK_EVENTS_ACCESS_DENIED: ErrorReference = ErrorReference::new("STACK-0002");
    pub const STACK_OUTPUTS_ACCESS_DENIED: ErrorReference = ErrorReference::new("STACK-0003");
    pub const STACK_FAILED: ErrorReference = ErrorReference::new("STACK-0004");
    pub const STACK_ACCESS_DENIED: ErrorReference = ErrorReference::new("STACK-0005");
    pub const STACK_MISSING: ErrorReference = ErrorReference::new("STACK-0006");
    pub const STACK_WAIT_TIMED_OUT: ErrorReference = ErrorReference::new("STACK-0007");
    pub const STACK_PROVIDER_ERROR: ErrorReference = ErrorReference::new("STACK-0008");
    pub const STACK_TEMPLATE_UNREADABLE: ErrorReference = ErrorReference::new("STACK-0009");

    pub const UPLOAD_ACCESS_DENIED: ErrorReference = ErrorReference::new("UPLOAD-0001");
    pub const UPLOAD_OBJECT_FAILED: ErrorReference = ErrorReference::new("UPLOAD-0002");
    pub const UPLOAD_FILE_NOT_FOUND: ErrorReference = ErrorReference::new("UPLOAD-0003");
    pub const UPLOAD_PROVIDER_ERROR: ErrorReference = ErrorReference::new("UPLOAD-0004");
}
