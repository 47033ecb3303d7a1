//! Render-failure interception.
//!
//! A failing render notifies the installed hook exactly once per top-level
//! execute. The hook commonly re-renders an error page into the same sink;
//! to keep a broken error page from notifying the hook again (and looping),
//! hook-side renders run under an explicit failure scope instead of relying
//! on runtime inspection of the sink.

use std::io::Write;

use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::services::subtemplate::Subtemplate;
use crate::application::services::templater::Templater;
use crate::error::{VeneerError, VeneerResult};

/// Hook invoked when a template render fails. Refer to
/// [`Templater::on_render_fail`].
pub type RenderFailHook = Box<dyn Fn(&mut FailureContext<'_>) + Send + Sync>;

/// Whether a render was started by the application or from inside the
/// render-failure hook. Failures in hook scope never re-notify the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderScope {
    Top,
    FailureHook,
}

/// The surface a render-failure hook works through: the failed template,
/// the error, and guarded access to the output sink.
pub struct FailureContext<'a> {
    templater: &'a Templater,
    sink: &'a mut dyn Write,
    name: &'a str,
    error: &'a VeneerError,
}

impl<'a> FailureContext<'a> {
    pub(crate) fn new(
        templater: &'a Templater,
        sink: &'a mut dyn Write,
        name: &'a str,
        error: &'a VeneerError,
    ) -> Self {
        Self {
            templater,
            sink,
            name,
            error,
        }
    }

    /// The name of the template whose render failed.
    pub fn template_name(&self) -> &str {
        self.name
    }

    /// The failure being reported.
    pub fn error(&self) -> &VeneerError {
        self.error
    }

    /// A handle for the failed template.
    pub fn subtemplate(&self) -> Subtemplate<'_> {
        self.templater.subtemplate(self.name)
    }

    /// Direct access to the output sink, for writing a literal fallback.
    pub fn sink(&mut self) -> &mut dyn Write {
        &mut *self.sink
    }

    /// Render a fallback template into the sink.
    ///
    /// Runs in failure scope: if the fallback itself fails, the error is
    /// returned here but the hook is NOT notified again.
    pub fn render<S: Serialize + ?Sized>(&mut self, name: &str, data: &S) -> VeneerResult<()> {
        let value = serde_json::to_value(data).map_err(|e| ApplicationError::InvalidData {
            reason: e.to_string(),
        })?;
        self.templater
            .execute_scoped(&mut *self.sink, name, &value, RenderScope::FailureHook)
    }
}
