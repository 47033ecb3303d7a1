//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `veneer-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `TemplateFs`: Read-only virtual filesystem lookup and walking
//!   - `TemplateEngine` / `CompiledTemplates`: Host templating engine
//!   - `MarkdownRenderer`: Optional Markdown → HTML post-processor
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (The `Templater` service itself — this is a library, not a server)

pub mod output;

pub use output::{
    CompiledTemplates, MarkdownRenderer, NamedSource, SourceFile, TemplateEngine, TemplateFs,
};
