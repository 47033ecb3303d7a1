//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the template pipeline needs from external
//! systems. The `veneer-adapters` crate provides implementations.

use std::io::Write;

use serde_json::Value;

use crate::domain::FunctionTable;
use crate::error::VeneerResult;

/// A resolved virtual-filesystem entry.
///
/// `name` is the name the filesystem itself reports for the entry, not an
/// echo of the requested path. Filtering adapters inspect this resolved name
/// so an inner filesystem cannot smuggle a disallowed file past them by
/// rewriting paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// One named template source handed to the engine for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSource {
    pub name: String,
    pub source: String,
}

/// Port for read-only virtual filesystem access.
///
/// Implemented by:
/// - `veneer_adapters::filesystem::DirFs` (production, local directory)
/// - `veneer_adapters::filesystem::MemoryFs` (testing, embedded sources)
///
/// ## Design Notes
///
/// - Paths are `/`-separated virtual paths; adapters normalize platform
///   separators before reporting them
/// - Traversal order of [`TemplateFs::walk`] is adapter-dependent and NOT
///   part of the contract (both shipped adapters happen to walk
///   lexicographically); pre-registration resolves name collisions by
///   first-registered-wins
pub trait TemplateFs: Send + Sync {
    /// Look up a path, returning the resolved entry or a not-found error.
    fn open(&self, path: &str) -> VeneerResult<SourceFile>;

    /// Recursively list every file path in the filesystem.
    fn walk(&self) -> VeneerResult<Vec<String>>;
}

/// Port for the host templating engine.
///
/// Implemented by:
/// - `veneer_adapters::engine::MiniJinjaEngine` (production)
pub trait TemplateEngine: Send + Sync {
    /// Compile all named sources plus the shared function table into one
    /// merged tree.
    ///
    /// Compilation is all-or-nothing: a syntax error in any member fails the
    /// whole build, reported per failing template name.
    fn compile(
        &self,
        sources: Vec<NamedSource>,
        functions: &FunctionTable,
    ) -> VeneerResult<Box<dyn CompiledTemplates>>;
}

/// The merged, immutable result of a successful compilation.
///
/// A compiled tree is shared by arbitrarily many concurrent renders; the
/// trait is intentionally read-only.
pub trait CompiledTemplates: Send + Sync {
    /// Execute the named member against `data`, writing output to `sink`.
    fn render(&self, name: &str, data: &Value, sink: &mut dyn Write) -> VeneerResult<()>;

    /// The set of compiled member names, sorted.
    fn template_names(&self) -> Vec<String>;
}

/// Port for Markdown → HTML conversion.
///
/// Implemented by:
/// - `veneer_adapters::markdown::CmarkRenderer` (pulldown-cmark)
pub trait MarkdownRenderer: Send + Sync {
    /// Convert a buffer of Markdown source to HTML, writing to `sink`.
    fn convert(&self, markdown: &[u8], sink: &mut dyn Write) -> VeneerResult<()>;
}
