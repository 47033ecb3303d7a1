//! In-memory filesystem adapter for testing and embedded template sets.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use veneer_core::{
    application::{
        ApplicationError,
        ports::{SourceFile, TemplateFs},
    },
    error::VeneerResult,
};

/// Thread-safe in-memory filesystem.
///
/// Handles are cheap clones over shared storage, so a test (or a hot-reload
/// demo) can keep one handle for edits while a `Templater` reads through
/// another. Walk order is lexicographic, courtesy of the `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    inner: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFs {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem pre-populated from `(path, contents)` pairs.
    pub fn from_entries<I, P, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        Self {
            inner: Arc::new(RwLock::new(
                entries
                    .into_iter()
                    .map(|(path, contents)| (path.into(), contents.into()))
                    .collect(),
            )),
        }
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        let mut inner = self.inner.write().unwrap();
        inner.insert(path.into(), contents.into());
    }

    /// Remove a file.
    pub fn remove(&self, path: &str) {
        let mut inner = self.inner.write().unwrap();
        inner.remove(path);
    }

    /// Check if a file exists.
    pub fn contains(&self, path: &str) -> bool {
        let inner = self.inner.read().unwrap();
        inner.contains_key(path)
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if the filesystem is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateFs for MemoryFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::SetupLockError)?;
        match inner.get_key_value(path) {
            Some((name, contents)) => Ok(SourceFile {
                name: name.clone(),
                contents: contents.clone(),
            }),
            None => Err(ApplicationError::SourceNotFound {
                path: path.to_owned(),
            }
            .into()),
        }
    }

    fn walk(&self) -> VeneerResult<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::SetupLockError)?;
        Ok(inner.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_returns_stored_contents_and_name() {
        let fs = MemoryFs::from_entries([("pages/index.html", "<h1>hi</h1>")]);
        let file = fs.open("pages/index.html").unwrap();
        assert_eq!(file.name, "pages/index.html");
        assert_eq!(file.contents, b"<h1>hi</h1>");
    }

    #[test]
    fn open_missing_is_not_found() {
        let fs = MemoryFs::new();
        assert!(fs.open("nope.html").is_err());
    }

    #[test]
    fn walk_is_lexicographic() {
        let fs = MemoryFs::from_entries([("b.html", ""), ("a/z.html", ""), ("a/a.html", "")]);
        assert_eq!(fs.walk().unwrap(), vec!["a/a.html", "a/z.html", "b.html"]);
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFs::new();
        let editor = fs.clone();
        editor.insert("index.html", "v1");

        assert!(fs.contains("index.html"));
        editor.insert("index.html", "v2");
        assert_eq!(fs.open("index.html").unwrap().contents, b"v2");

        editor.remove("index.html");
        assert!(fs.is_empty());
    }
}
