// ABOUTME: Diagnostics accumulator for non-fatal warnings during stack operations.
// ABOUTME: Collects warnings that shouldn't fail a sequence but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during coordinator sequences.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during an operation.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A bucket was already deleted when teardown reached it.
    pub fn bucket_already_gone(bucket: &str) -> Self {
        Self {
            kind: WarningKind::BucketAlreadyGone,
            message: format!("bucket {bucket} no longer exists, skipping"),
        }
    }

    /// A bucket was left for its lifecycle rule to expire.
    pub fn bucket_deletion_scheduled(bucket: &str) -> Self {
        Self {
            kind: WarningKind::BucketDeletionScheduled,
            message: format!("bucket {bucket} scheduled for deletion; it is retained by the stack"),
        }
    }

    /// An update carried no changes.
    pub fn no_updates(stack: &str) -> Self {
        Self {
            kind: WarningKind::NoUpdates,
            message: format!("{stack} is already up to date"),
        }
    }
}

/// Categories of warnings that can occur during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    BucketAlreadyGone,
    BucketDeletionScheduled,
    NoUpdates,
}
