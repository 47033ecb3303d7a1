//! Core domain layer for Veneer.
//!
//! This module contains pure template-naming and function-table logic with
//! ZERO external dependencies beyond serde_json values. All I/O, engine, and
//! Markdown concerns are handled via ports (traits) defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable values**: Extension lists and derived names are value-like

pub mod error;
pub mod extensions;
pub mod functions;

// Re-exports for convenience
pub use error::DomainError;
pub use extensions::{MARKDOWN_EXTENSION, TemplateExtensions, extension, template_name};
pub use functions::{FunctionTable, TemplateFunction};
