//! Templater - registry, lazy tree builder, and execution pipeline.
//!
//! The service coordinates the whole template workflow:
//! 1. Register template names against virtual-filesystem paths
//! 2. Compile the registry lazily into one merged tree (exactly once)
//! 3. Execute named members against data contexts and output sinks
//!
//! The compiled tree sits in an [`ArcSwapOption`] slot: readers are
//! wait-free, first-time compilers race to CAS-install exactly one winning
//! tree, and losers discard their redundant build and adopt the winner.
//! Setup state (registry, functions, filesystem) lives behind `RwLock`s
//! that the post-warmup execute fast path never touches.
//!
//! Setup methods must complete before the first `load`/`execute` — a
//! documented contract enforced by caller discipline, not by locks. Mutating
//! the registry after the tree has compiled does not corrupt memory (this is
//! Rust), but the installed tree will not reflect it until [`Templater::reset`].

use std::collections::{HashMap, HashSet};
use std::env;
use std::io::Write;
use std::sync::{Arc, OnceLock, RwLock};

use arc_swap::ArcSwapOption;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::error::ApplicationError;
use crate::application::fs::OverrideFs;
use crate::application::ports::{
    CompiledTemplates, MarkdownRenderer, NamedSource, TemplateEngine, TemplateFs,
};
use crate::application::services::failure::{FailureContext, RenderFailHook, RenderScope};
use crate::application::services::subtemplate::Subtemplate;
use crate::domain::extensions::validate_name;
use crate::domain::{
    FunctionTable, MARKDOWN_EXTENSION, TemplateExtensions, extension, template_name,
};
use crate::error::{VeneerError, VeneerResult};

/// Construction-time configuration, read once and immutable thereafter.
#[derive(Default)]
pub struct TemplaterConfig {
    /// Rebuild the tree on every load instead of caching it. Enables the
    /// edit-reload workflow at the cost of performance.
    pub hot_reload: bool,
    /// Extensions that mark a walked file as a template during
    /// pre-registration.
    pub extensions: TemplateExtensions,
    /// Optional Markdown post-processor for templates registered under a
    /// `.md` source path.
    pub markdown: Option<Arc<dyn MarkdownRenderer>>,
}

impl TemplaterConfig {
    /// Environment toggle for hot-reload mode, honored by [`Self::from_env`].
    pub const HOT_RELOAD_ENV: &str = "VENEER_HOT_RELOAD";

    /// Defaults, with hot-reload taken from the `VENEER_HOT_RELOAD`
    /// environment variable (any non-empty value enables it). The variable
    /// is read here, once — never re-read at render time.
    pub fn from_env() -> Self {
        Self {
            hot_reload: env::var_os(Self::HOT_RELOAD_ENV).is_some_and(|v| !v.is_empty()),
            ..Self::default()
        }
    }
}

/// One immutable snapshot of the compiled template tree.
///
/// Shared by every in-flight execution; also records which member names were
/// registered under Markdown source paths, so the execute fast path never
/// has to consult the (locked) registry.
pub struct CompiledTree {
    templates: Box<dyn CompiledTemplates>,
    markdown_names: HashSet<String>,
}

impl CompiledTree {
    /// The compiled engine tree.
    pub fn templates(&self) -> &dyn CompiledTemplates {
        self.templates.as_ref()
    }

    /// The compiled member names, sorted.
    pub fn template_names(&self) -> Vec<String> {
        self.templates.template_names()
    }

    /// Whether the member's registered source path carried the Markdown
    /// extension at build time.
    pub fn is_markdown(&self, name: &str) -> bool {
        self.markdown_names.contains(name)
    }
}

/// The template registry, tree builder, and execution pipeline.
///
/// Lifecycle: construct → configure (`register`, `preregister`, `func`,
/// `override_fs`, `on_render_fail` — single-threaded setup phase) → the tree
/// compiles on first `load`/`execute` → optionally `reset` to force a
/// rebuild (e.g. after `override_fs`).
pub struct Templater {
    fs: RwLock<Arc<dyn TemplateFs>>,
    engine: Arc<dyn TemplateEngine>,
    markdown: Option<Arc<dyn MarkdownRenderer>>,
    extensions: TemplateExtensions,
    hot_reload: bool,
    includes: RwLock<HashMap<String, String>>,
    functions: RwLock<FunctionTable>,
    render_fail_hook: OnceLock<RenderFailHook>,
    compiled: ArcSwapOption<CompiledTree>,
}

impl Templater {
    /// Create a templater with default configuration.
    pub fn new(fs: Arc<dyn TemplateFs>, engine: Arc<dyn TemplateEngine>) -> Self {
        Self::with_config(fs, engine, TemplaterConfig::default())
    }

    /// Create a templater with explicit configuration.
    pub fn with_config(
        fs: Arc<dyn TemplateFs>,
        engine: Arc<dyn TemplateEngine>,
        config: TemplaterConfig,
    ) -> Self {
        Self {
            fs: RwLock::new(fs),
            engine,
            markdown: config.markdown,
            extensions: config.extensions,
            hot_reload: config.hot_reload,
            includes: RwLock::new(HashMap::new()),
            functions: RwLock::new(FunctionTable::new()),
            render_fail_hook: OnceLock::new(),
            compiled: ArcSwapOption::from(None),
        }
    }

    /// Whether this templater rebuilds the tree on every load.
    pub fn is_hot_reload(&self) -> bool {
        self.hot_reload
    }

    // -------------------------------------------------------------------------
    // Setup surface
    // -------------------------------------------------------------------------

    /// Register a template under `name`, sourced from `path`.
    ///
    /// If `name` is already present (explicitly registered or discovered by
    /// [`Self::preregister`]), the existing mapping is left untouched. A
    /// [`Subtemplate`] handle for `name` is returned regardless.
    pub fn register(
        &self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> VeneerResult<Subtemplate<'_>> {
        let name = name.into();
        validate_name(&name)?;
        {
            let mut includes = self.write_includes()?;
            if !includes.contains_key(&name) {
                let path = path.into();
                debug!(template = %name, path = %path, "registering template");
                includes.insert(name.clone(), path);
            }
        }
        Ok(Subtemplate::new(self, name))
    }

    /// Walk the virtual filesystem and register every template-extension
    /// file under its derived name (basename minus extension).
    ///
    /// Existing names win — explicit registration beats discovery, and the
    /// first discovery of a derived name beats later ones. Walk order is an
    /// adapter property, not a contract; collisions across directories are
    /// resolved first-wins in whatever order the filesystem reports.
    ///
    /// A walk failure is a fatal setup error: it means the template source
    /// itself is broken.
    #[instrument(skip_all)]
    pub fn preregister(&self) -> VeneerResult<()> {
        let fs = self.current_fs()?;
        let paths = fs.walk()?;

        let mut includes = self.write_includes()?;
        for path in paths {
            if !self.extensions.matches(&path) {
                continue;
            }
            let Some(name) = template_name(&path) else {
                warn!(path = %path, "skipping template with empty derived name");
                continue;
            };
            if includes.contains_key(name) {
                continue;
            }
            debug!(template = %name, path = %path, "pre-registering template");
            includes.insert(name.to_owned(), path.clone());
        }
        Ok(())
    }

    /// Register a template function shared by the whole tree.
    ///
    /// Registering two functions under one name is a fatal configuration
    /// error, detected eagerly here — never at render time.
    pub fn func<F>(&self, name: impl Into<String>, function: F) -> VeneerResult<()>
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let mut functions = self
            .functions
            .write()
            .map_err(|_| ApplicationError::SetupLockError)?;
        functions.insert(name.into(), Arc::new(function))?;
        Ok(())
    }

    /// Layer an overlay filesystem over the current one (new-over-old).
    ///
    /// Does NOT recompile: an already-installed tree keeps serving until
    /// [`Self::reset`] is called.
    pub fn override_fs(&self, overlay: Arc<dyn TemplateFs>) -> VeneerResult<()> {
        let mut fs = self
            .fs
            .write()
            .map_err(|_| ApplicationError::SetupLockError)?;
        let base = Arc::clone(&fs);
        *fs = Arc::new(OverrideFs::new(base, overlay));
        Ok(())
    }

    /// Install the render-failure hook. At most one hook may be installed.
    pub fn on_render_fail<F>(&self, hook: F) -> VeneerResult<()>
    where
        F: Fn(&mut FailureContext<'_>) + Send + Sync + 'static,
    {
        self.render_fail_hook
            .set(Box::new(hook))
            .map_err(|_| crate::domain::DomainError::HookAlreadyInstalled.into())
    }

    /// A handle for `name`, registered or not. Executing a handle for an
    /// unregistered name fails at render, not here.
    pub fn subtemplate(&self, name: impl Into<String>) -> Subtemplate<'_> {
        Subtemplate::new(self, name.into())
    }

    /// The registered source path for `name`, if any.
    pub fn source_path(&self, name: &str) -> VeneerResult<Option<String>> {
        Ok(self.read_includes()?.get(name).cloned())
    }

    // -------------------------------------------------------------------------
    // Tree builder
    // -------------------------------------------------------------------------

    /// Compile-or-fetch the template tree.
    ///
    /// Fast path: a wait-free load of the shared slot. Cold path: build a
    /// fresh tree from the current registry and filesystem, then CAS it into
    /// the slot; a loser of the install race discards its build and adopts
    /// the winner's tree. In hot-reload mode every call rebuilds and nothing
    /// is ever installed.
    pub fn load(&self) -> VeneerResult<Arc<CompiledTree>> {
        loop {
            let current = self.compiled.load();
            if let Some(tree) = current.as_ref() {
                return Ok(Arc::clone(tree));
            }

            let fresh = Arc::new(self.build()?);

            if self.hot_reload {
                // Never stored: the next load recompiles from scratch.
                return Ok(fresh);
            }

            let previous = self
                .compiled
                .compare_and_swap(&*current, Some(Arc::clone(&fresh)));
            if previous.is_none() {
                return Ok(fresh);
            }
            // Another thread installed first; drop our build and re-read.
            debug!("discarding redundant template tree build");
        }
    }

    /// Force eager compilation outside a request path.
    pub fn preload(&self) -> VeneerResult<()> {
        self.load().map(|_| ())
    }

    /// Like [`Self::preload`], but aborts on a broken deployment.
    ///
    /// Convenience for binaries that treat template defects as startup
    /// failures; library callers handle the error from `preload` instead.
    pub fn must_preload(&self) {
        if let Err(error) = self.preload() {
            panic!("template preload failed: {error}");
        }
    }

    /// Clear the compiled tree so the next load rebuilds from the current
    /// registry and filesystem. In-flight executions holding the previous
    /// tree are unaffected.
    pub fn reset(&self) {
        self.compiled.store(None);
    }

    fn build(&self) -> VeneerResult<CompiledTree> {
        let fs = self.current_fs()?;
        let includes = self.read_includes()?.clone();
        let functions = self
            .functions
            .read()
            .map_err(|_| ApplicationError::SetupLockError)?
            .clone();

        // Compile in name order so diagnostics are deterministic.
        let mut names: Vec<&String> = includes.keys().collect();
        names.sort_unstable();

        let mut sources = Vec::with_capacity(names.len());
        for name in names {
            let path = &includes[name];
            let file = fs.open(path)?;
            let source = String::from_utf8(file.contents).map_err(|_| {
                ApplicationError::SourceRead {
                    path: path.clone(),
                    reason: "source is not valid UTF-8".into(),
                }
            })?;
            sources.push(NamedSource {
                name: name.clone(),
                source,
            });
        }

        let count = sources.len();
        let templates = self.engine.compile(sources, &functions)?;

        let markdown_names = includes
            .into_iter()
            .filter(|(_, path)| extension(path) == Some(MARKDOWN_EXTENSION))
            .map(|(name, _)| name)
            .collect();

        debug!(templates = count, "compiled template tree");
        Ok(CompiledTree {
            templates,
            markdown_names,
        })
    }

    // -------------------------------------------------------------------------
    // Execution pipeline
    // -------------------------------------------------------------------------

    /// Execute the named template against `data`, writing to `sink`.
    ///
    /// Ensures the tree is loaded first. A render failure notifies the
    /// installed hook (once per top-level execute) and is then returned —
    /// errors are never swallowed. Load failures are fatal setup errors and
    /// bypass the hook.
    #[instrument(skip_all, fields(template = %name))]
    pub fn execute<S: Serialize + ?Sized>(
        &self,
        sink: &mut dyn Write,
        name: &str,
        data: &S,
    ) -> VeneerResult<()> {
        let value = serde_json::to_value(data).map_err(|e| ApplicationError::InvalidData {
            reason: e.to_string(),
        })?;
        self.execute_scoped(sink, name, &value, RenderScope::Top)
    }

    pub(crate) fn execute_scoped(
        &self,
        sink: &mut dyn Write,
        name: &str,
        data: &Value,
        scope: RenderScope,
    ) -> VeneerResult<()> {
        let tree = self.load()?;

        if let Some(markdown) = &self.markdown {
            if tree.is_markdown(name) {
                return self.execute_markdown(&tree, markdown.as_ref(), sink, name, data, scope);
            }
        }

        if let Err(error) = tree.templates().render(name, data, sink) {
            self.handle_failure(sink, name, &error, scope);
            return Err(error);
        }
        Ok(())
    }

    /// Render into a buffer first, then convert the buffer through the
    /// Markdown port into the real sink. Nothing reaches the real sink until
    /// conversion succeeds; a template-stage failure (and anything the hook
    /// writes for it) stays in the discarded buffer.
    fn execute_markdown(
        &self,
        tree: &CompiledTree,
        markdown: &dyn MarkdownRenderer,
        sink: &mut dyn Write,
        name: &str,
        data: &Value,
        scope: RenderScope,
    ) -> VeneerResult<()> {
        let mut buffer = Vec::new();
        if let Err(error) = tree.templates().render(name, data, &mut buffer) {
            self.handle_failure(&mut buffer, name, &error, scope);
            return Err(error);
        }

        if let Err(source) = markdown.convert(&buffer, sink) {
            let error = VeneerError::from(ApplicationError::MarkdownConversion {
                name: name.to_owned(),
                reason: source.to_string(),
            });
            self.handle_failure(sink, name, &error, scope);
            return Err(error);
        }
        Ok(())
    }

    fn handle_failure(
        &self,
        sink: &mut dyn Write,
        name: &str,
        error: &VeneerError,
        scope: RenderScope,
    ) {
        debug!(template = %name, %error, "template render failed");
        if scope == RenderScope::FailureHook {
            // Already inside the hook; break the chain instead of recursing.
            return;
        }
        if let Some(hook) = self.render_fail_hook.get() {
            let mut ctx = FailureContext::new(self, sink, name, error);
            hook(&mut ctx);
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn current_fs(&self) -> VeneerResult<Arc<dyn TemplateFs>> {
        Ok(Arc::clone(
            &*self
                .fs
                .read()
                .map_err(|_| ApplicationError::SetupLockError)?,
        ))
    }

    fn read_includes(
        &self,
    ) -> VeneerResult<std::sync::RwLockReadGuard<'_, HashMap<String, String>>> {
        self.includes
            .read()
            .map_err(|_| ApplicationError::SetupLockError.into())
    }

    fn write_includes(
        &self,
    ) -> VeneerResult<std::sync::RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.includes
            .write()
            .map_err(|_| ApplicationError::SetupLockError.into())
    }
}
