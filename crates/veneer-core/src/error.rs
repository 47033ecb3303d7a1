//! Unified error handling for Veneer Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with classification into the fatal (broken deployment) and
//! recoverable (render-time) halves of the error taxonomy.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Veneer Core operations.
///
/// This enum wraps all possible errors that can occur when using veneer-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum VeneerError {
    /// Errors from the domain layer (configuration rule violations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (build and render failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),
}

impl VeneerError {
    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
        }
    }

    /// Whether this error is a fatal setup/build defect.
    ///
    /// Fatal errors indicate a broken deployment (malformed template syntax,
    /// unreadable sources, duplicate function registration) rather than a
    /// recoverable render-time condition. Callers doing quick setup typically
    /// abort on these; render-time errors are returned to the request path
    /// and optionally routed through the render-failure hook.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Domain(_) => true,
            Self::Application(e) => e.is_fatal(),
        }
    }
}

/// Error categories for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    NotFound,
    Render,
    Io,
    Internal,
}

/// Convenient result type alias.
pub type VeneerResult<T> = Result<T, VeneerError>;
