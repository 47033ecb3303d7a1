//! Application layer for Veneer.
//!
//! This layer contains:
//! - **Services**: The `Templater` (registry, tree builder, execution pipeline)
//! - **Ports**: Interface definitions (traits) for the filesystem, the host
//!   templating engine, and the optional Markdown post-processor
//! - **Fs combinators**: override / extension-filter / scoping adapters that
//!   compose any two `TemplateFs` ports
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! naming rules itself. Those live in `crate::domain`.

pub mod error;
pub mod fs;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main services
pub use services::{FailureContext, Subtemplate, Templater, TemplaterConfig};

// Re-export port traits (for adapter implementation)
pub use ports::{CompiledTemplates, MarkdownRenderer, TemplateEngine, TemplateFs};

pub use error::ApplicationError;
