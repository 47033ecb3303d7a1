//! Template path classification and name derivation.
//!
//! # Design
//!
//! Virtual paths are plain `/`-separated strings; adapters normalize any
//! platform separators before they reach this layer. This file's only job is
//! to define the extension allow-list and the basename/extension/name
//! derivation rules used by pre-registration and the Markdown redirect.

use crate::domain::error::DomainError;

/// The file extension that routes a template's output through the Markdown
/// post-processor (when one is configured).
pub const MARKDOWN_EXTENSION: &str = "md";

/// The allow-list of file extensions that mark a virtual-filesystem entry as
/// a template.
///
/// The default list is `html`, `htm`, `md`. Matching is a case-sensitive
/// exact comparison against the final `.`-separated segment of the basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExtensions(Vec<String>);

impl TemplateExtensions {
    /// Build an allow-list from extension strings.
    ///
    /// Leading dots are stripped, so `".html"` and `"html"` are equivalent.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| {
                    let ext = ext.into();
                    ext.strip_prefix('.').map(str::to_owned).unwrap_or(ext)
                })
                .collect(),
        )
    }

    /// Whether `ext` (without a leading dot) is in the allow-list.
    pub fn contains(&self, ext: &str) -> bool {
        self.0.iter().any(|allowed| allowed == ext)
    }

    /// Whether the path's extension is in the allow-list.
    pub fn matches(&self, path: &str) -> bool {
        extension(path).is_some_and(|ext| self.contains(ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for TemplateExtensions {
    fn default() -> Self {
        Self::new(["html", "htm", MARKDOWN_EXTENSION])
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The extension of a virtual path's basename, without the leading dot.
///
/// Dotfiles report their suffix as an extension (`".html"` → `"html"`),
/// mirroring the lookup behavior of the original walk; `extension` returns
/// `None` only when the basename contains no dot at all.
pub fn extension(path: &str) -> Option<&str> {
    basename(path).rsplit_once('.').map(|(_, ext)| ext)
}

/// Derive a template name from a virtual path: the basename with its final
/// extension stripped (`pages/index.html` → `index`).
///
/// Returns `None` when the derived name would be empty (a basename that is
/// only an extension, such as `".html"`) — such entries are not registrable.
pub fn template_name(path: &str) -> Option<&str> {
    let base = basename(path);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    (!stem.is_empty()).then_some(stem)
}

/// Validate an explicitly supplied template name.
pub(crate) fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::EmptyTemplateName);
    }
    Ok(())
}
