// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Doubles as a warning ledger that shows each reference code once.

use std::collections::HashSet;

use crate::provider::ErrorReference;

/// Collects non-fatal warnings raised while a convention runs.
///
/// `warn` always records; `warn_once` records only the first warning per
/// reference code so repeated polls do not repeat the same guidance.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    shown: HashSet<ErrorReference>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.shown.insert(warning.reference);
        self.warnings.push(warning);
    }

    /// Record a warning unless one with the same reference was already shown.
    ///
    /// Returns whether the warning was displayed.
    pub fn warn_once(&mut self, warning: Warning) -> bool {
        if self.shown.contains(&warning.reference) {
            tracing::debug!("{}", warning);
            return false;
        }
        self.warn(warning);
        true
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning with the reference code operators can search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub reference: ErrorReference,
    pub message: String,
}

impl Warning {
    pub fn new(reference: ErrorReference, message: impl Into<String>) -> Self {
        Self {
            reference,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reference, self.message)
    }
}
