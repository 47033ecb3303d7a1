//! Application services - the template pipeline.
//!
//! `Templater` owns the registry, the lazy tree builder, and the execution
//! pipeline; `Subtemplate` is a lightweight name-bound handle onto it, and
//! `FailureContext` is the surface the render-failure hook works through.

pub mod failure;
pub mod subtemplate;
pub mod templater;

pub use failure::{FailureContext, RenderFailHook};
pub use subtemplate::Subtemplate;
pub use templater::{CompiledTree, Templater, TemplaterConfig};
