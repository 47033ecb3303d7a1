//! Composable virtual-filesystem combinators.
//!
//! Each combinator wraps `Arc<dyn TemplateFs>` ports and is itself a
//! `TemplateFs`, so layers stack freely: a scoped base overridden by a user
//! directory, filtered down to template extensions.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{SourceFile, TemplateFs};
use crate::domain::TemplateExtensions;
use crate::error::VeneerResult;

/// Layers an overlay filesystem over a base filesystem.
///
/// Lookups try the overlay first and fall back to the base on any overlay
/// error, so the overlay always wins when it has the entry and the base is
/// otherwise authoritative. Nothing is cached — every `open` re-resolves,
/// which is what makes the hot-reload workflow see overlay edits.
pub struct OverrideFs {
    base: Arc<dyn TemplateFs>,
    overlay: Arc<dyn TemplateFs>,
}

impl OverrideFs {
    /// Layer `overlay` over `base`. This is useful for letting the user
    /// override certain template files.
    pub fn new(base: Arc<dyn TemplateFs>, overlay: Arc<dyn TemplateFs>) -> Self {
        Self { base, overlay }
    }
}

impl TemplateFs for OverrideFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        match self.overlay.open(path) {
            Ok(file) => Ok(file),
            Err(_) => self.base.open(path),
        }
    }

    fn walk(&self) -> VeneerResult<Vec<String>> {
        // Deduplicated union; overlay entries shadow base entries.
        let mut paths: BTreeSet<String> = self.overlay.walk()?.into_iter().collect();
        paths.extend(self.base.walk()?);
        Ok(paths.into_iter().collect())
    }
}

/// Rejects entries whose extension is not in the allow-list.
///
/// The check runs against the *resolved* entry name reported by the inner
/// filesystem, not the requested path, so path rewriting inside the inner
/// layer cannot bypass the filter.
pub struct ExtensionFilterFs {
    inner: Arc<dyn TemplateFs>,
    allow: TemplateExtensions,
}

impl ExtensionFilterFs {
    pub fn new(inner: Arc<dyn TemplateFs>, allow: TemplateExtensions) -> Self {
        Self { inner, allow }
    }
}

impl TemplateFs for ExtensionFilterFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        let file = self.inner.open(path)?;
        if !self.allow.matches(&file.name) {
            return Err(ApplicationError::SourceNotFound {
                path: path.to_owned(),
            }
            .into());
        }
        Ok(file)
    }

    fn walk(&self) -> VeneerResult<Vec<String>> {
        let paths = self.inner.walk()?;
        Ok(paths
            .into_iter()
            .filter(|path| self.allow.matches(path))
            .collect())
    }
}

/// Scopes every lookup under a subdirectory prefix.
pub struct ScopedFs {
    inner: Arc<dyn TemplateFs>,
    root: String,
}

impl ScopedFs {
    pub fn new(inner: Arc<dyn TemplateFs>, root: impl Into<String>) -> Self {
        let root = root.into();
        let root = root.trim_matches('/').to_owned();
        Self { inner, root }
    }

    fn qualify(&self, path: &str) -> String {
        if self.root.is_empty() {
            path.to_owned()
        } else {
            format!("{}/{}", self.root, path)
        }
    }
}

impl TemplateFs for ScopedFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        self.inner.open(&self.qualify(path))
    }

    fn walk(&self) -> VeneerResult<Vec<String>> {
        let paths = self.inner.walk()?;
        if self.root.is_empty() {
            return Ok(paths);
        }
        let prefix = format!("{}/", self.root);
        Ok(paths
            .into_iter()
            .filter_map(|path| path.strip_prefix(&prefix).map(str::to_owned))
            .collect())
    }
}
