//! Veneer Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Veneer, a lazy,
//! concurrency-safe template-tree layer over a host templating engine,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Host application (server)        │
//! │     (register, preload, execute)        │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │           Templater Service             │
//! │   (Registry, Tree Builder, Pipeline)    │
//! │       Orchestrates Template Use         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  (Driven: TemplateFs, Engine, Markdown) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    veneer-adapters (Infrastructure)     │
//! │  (MemoryFs, DirFs, MiniJinjaEngine, …)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (TemplateExtensions, FunctionTable, …)  │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use veneer_core::application::services::Templater;
//!
//! // 1. Create a templater over a virtual filesystem and an engine adapter
//! let templater = Templater::new(filesystem, engine);
//!
//! // 2. Configure it (single-threaded setup phase)
//! templater.preregister().unwrap();
//! let index = templater.register("index", "pages/index.html").unwrap();
//!
//! // 3. Execute — the tree compiles lazily on first use
//! let mut out = Vec::new();
//! index.execute(&mut out, &serde_json::json!({ "title": "Home" })).unwrap();
//! ```
//!
//! The compiled tree is shared by arbitrarily many concurrent executions
//! without locking; setup must complete before the first execution (a
//! documented contract, mirrored by `Templater`'s API docs).

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        fs::{ExtensionFilterFs, OverrideFs, ScopedFs},
        ports::{
            CompiledTemplates, MarkdownRenderer, NamedSource, SourceFile, TemplateEngine,
            TemplateFs,
        },
        services::{
            CompiledTree, FailureContext, RenderFailHook, Subtemplate, Templater, TemplaterConfig,
        },
    };
    pub use crate::domain::{
        FunctionTable, MARKDOWN_EXTENSION, TemplateExtensions, TemplateFunction, template_name,
    };
    pub use crate::error::{VeneerError, VeneerResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
