//! Shared test doubles for the application layer.
//!
//! The stub engine renders a member's source text verbatim, which is all the
//! pipeline tests need; magic markers in source text force parse, render, or
//! conversion failures on demand.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    CompiledTemplates, MarkdownRenderer, NamedSource, SourceFile, TemplateEngine, TemplateFs,
};
use crate::domain::FunctionTable;
use crate::error::VeneerResult;

pub(crate) const PARSE_ERROR_MARKER: &str = "!parse-error";
pub(crate) const RENDER_ERROR_MARKER: &str = "!render-error";
pub(crate) const MD_ERROR_MARKER: &str = "!md-error";

/// In-memory filesystem stub with an open counter.
#[derive(Default)]
pub(crate) struct StubFs {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    pub(crate) opens: AtomicUsize,
}

impl StubFs {
    pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            files: RwLock::new(
                entries
                    .iter()
                    .map(|(path, contents)| ((*path).to_owned(), contents.as_bytes().to_vec()))
                    .collect(),
            ),
            opens: AtomicUsize::new(0),
        }
    }

    pub(crate) fn insert(&self, path: &str, contents: &str) {
        self.files
            .write()
            .unwrap()
            .insert(path.to_owned(), contents.as_bytes().to_vec());
    }
}

impl TemplateFs for StubFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.files.read().unwrap().get(path) {
            Some(contents) => Ok(SourceFile {
                name: path.to_owned(),
                contents: contents.clone(),
            }),
            None => Err(ApplicationError::SourceNotFound {
                path: path.to_owned(),
            }
            .into()),
        }
    }

    fn walk(&self) -> VeneerResult<Vec<String>> {
        Ok(self.files.read().unwrap().keys().cloned().collect())
    }
}

/// Engine stub that "compiles" sources by storing them and renders them
/// verbatim.
#[derive(Default)]
pub(crate) struct StubEngine {
    pub(crate) compiles: AtomicUsize,
}

impl TemplateEngine for StubEngine {
    fn compile(
        &self,
        sources: Vec<NamedSource>,
        _functions: &FunctionTable,
    ) -> VeneerResult<Box<dyn CompiledTemplates>> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        for source in &sources {
            if source.source.contains(PARSE_ERROR_MARKER) {
                return Err(ApplicationError::TemplateParse {
                    name: source.name.clone(),
                    reason: "forced parse failure".into(),
                }
                .into());
            }
        }
        Ok(Box::new(StubTree {
            sources: sources
                .into_iter()
                .map(|source| (source.name, source.source))
                .collect(),
        }))
    }
}

struct StubTree {
    sources: HashMap<String, String>,
}

impl CompiledTemplates for StubTree {
    fn render(&self, name: &str, _data: &Value, sink: &mut dyn Write) -> VeneerResult<()> {
        let Some(source) = self.sources.get(name) else {
            return Err(ApplicationError::TemplateNotFound {
                name: name.to_owned(),
            }
            .into());
        };
        if source.contains(RENDER_ERROR_MARKER) {
            return Err(ApplicationError::RenderFailed {
                name: name.to_owned(),
                reason: "forced render failure".into(),
            }
            .into());
        }
        sink.write_all(source.as_bytes())
            .map_err(|e| ApplicationError::SinkWrite {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// Markdown stub that wraps its input in `<md>` tags.
#[derive(Default)]
pub(crate) struct StubMarkdown {
    pub(crate) conversions: AtomicUsize,
}

impl MarkdownRenderer for StubMarkdown {
    fn convert(&self, markdown: &[u8], sink: &mut dyn Write) -> VeneerResult<()> {
        if String::from_utf8_lossy(markdown).contains(MD_ERROR_MARKER) {
            return Err(ApplicationError::MarkdownRender {
                reason: "forced conversion failure".into(),
            }
            .into());
        }
        self.conversions.fetch_add(1, Ordering::SeqCst);
        let write = |sink: &mut dyn Write| -> std::io::Result<()> {
            sink.write_all(b"<md>")?;
            sink.write_all(markdown)?;
            sink.write_all(b"</md>")
        };
        write(sink).map_err(|e| ApplicationError::SinkWrite {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
