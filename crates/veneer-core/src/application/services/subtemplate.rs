//! Name-bound template handles.

use std::io::Write;

use serde::Serialize;

use crate::application::services::templater::Templater;
use crate::error::VeneerResult;

/// A lightweight handle binding a template name to its owning [`Templater`].
///
/// The handle carries no state of its own — it is a back-reference plus a
/// name. Holding a handle for a name that was never registered is valid;
/// executing it fails with the engine's not-found error.
#[derive(Clone)]
pub struct Subtemplate<'t> {
    templater: &'t Templater,
    name: String,
}

impl<'t> Subtemplate<'t> {
    pub(crate) fn new(templater: &'t Templater, name: String) -> Self {
        Self { templater, name }
    }

    /// The owning templater.
    pub fn templater(&self) -> &'t Templater {
        self.templater
    }

    /// The bound template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the bound template — identical contract to
    /// [`Templater::execute`].
    pub fn execute<S: Serialize + ?Sized>(
        &self,
        sink: &mut dyn Write,
        data: &S,
    ) -> VeneerResult<()> {
        self.templater.execute(sink, &self.name, data)
    }
}

impl std::fmt::Debug for Subtemplate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
