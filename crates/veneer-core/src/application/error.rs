//! Application layer errors.
//!
//! These errors represent failures while building or executing the template
//! tree. Setup-phase configuration violations are `DomainError` from
//! `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while building or executing templates.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The virtual filesystem has no entry for the path.
    #[error("template source not found: {path}")]
    SourceNotFound { path: String },

    /// The source exists but could not be read as template text.
    #[error("failed to read template source {path}: {reason}")]
    SourceRead { path: String, reason: String },

    /// The recursive walk during pre-registration failed.
    #[error("template walk failed: {reason}")]
    WalkFailed { reason: String },

    /// The engine rejected a template's syntax at compile time.
    #[error("failed to parse template '{name}': {reason}")]
    TemplateParse { name: String, reason: String },

    /// No compiled template exists under the requested name.
    #[error("no template named '{name}'")]
    TemplateNotFound { name: String },

    /// The engine failed while executing a compiled template.
    #[error("failed to render template '{name}': {reason}")]
    RenderFailed { name: String, reason: String },

    /// Markdown post-processing of a rendered template failed.
    #[error("failed to convert markdown output of '{name}': {reason}")]
    MarkdownConversion { name: String, reason: String },

    /// The Markdown renderer rejected its input.
    #[error("markdown rendering failed: {reason}")]
    MarkdownRender { reason: String },

    /// The data context could not be serialized for the engine.
    #[error("data context is not serializable: {reason}")]
    InvalidData { reason: String },

    /// Writing rendered output to the sink failed.
    #[error("failed to write to output sink: {reason}")]
    SinkWrite { reason: String },

    /// Setup state access failed (lock poisoned).
    #[error("templater setup state is poisoned")]
    SetupLockError,
}

impl ApplicationError {
    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. } | Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::SourceRead { .. } | Self::WalkFailed { .. } | Self::SinkWrite { .. } => {
                ErrorCategory::Io
            }
            Self::TemplateParse { .. } => ErrorCategory::Configuration,
            Self::RenderFailed { .. }
            | Self::MarkdownConversion { .. }
            | Self::MarkdownRender { .. }
            | Self::InvalidData { .. } => ErrorCategory::Render,
            Self::SetupLockError => ErrorCategory::Internal,
        }
    }

    /// Whether this error belongs to the fatal setup/build half of the
    /// taxonomy (see [`crate::error::VeneerError::is_fatal`]).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::SourceRead { .. }
                | Self::WalkFailed { .. }
                | Self::TemplateParse { .. }
                | Self::SetupLockError
        )
    }
}
