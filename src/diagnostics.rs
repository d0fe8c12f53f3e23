// ABOUTME: Diagnostics accumulator for non-fatal warnings during provisioning.
// ABOUTME: Collects tolerated failures that shouldn't abort setup but should be shown to users.

/// Collects non-fatal warnings during provisioning.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
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

    /// Check whether a warning of `kind` was recorded.
    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A non-fatal warning collected during provisioning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a certificate generation or export warning.
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Certificate, message)
    }

    /// Create a temporary-file cleanup warning.
    pub fn cleanup(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Cleanup, message)
    }

    /// Create a file permission warning.
    pub fn permissions(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Permissions, message)
    }

    /// Create a pod definition warning.
    pub fn pod_definition(message: impl Into<String>) -> Self {
        Self::new(WarningKind::PodDefinition, message)
    }
}

/// Categories of warnings that can occur during provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Certificate could not be generated or exported.
    Certificate,
    /// Temporary certificate material could not be removed.
    Cleanup,
    /// Certificate permissions could not be normalized.
    Permissions,
    /// Pod definition missing or without usable ports.
    PodDefinition,
}
