//! Local directory adapter using std::fs and walkdir.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::instrument;
use walkdir::WalkDir;

use veneer_core::{
    application::{
        ApplicationError,
        ports::{SourceFile, TemplateFs},
    },
    error::VeneerResult,
};

/// Production filesystem rooted at a local directory.
///
/// Virtual paths are `/`-separated and resolved strictly inside the root:
/// absolute paths and `..` traversal are reported as not-found rather than
/// escaping the directory.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Create a filesystem rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateFs for DirFs {
    fn open(&self, path: &str) -> VeneerResult<SourceFile> {
        let relative = sanitize(path).ok_or_else(|| ApplicationError::SourceNotFound {
            path: path.to_owned(),
        })?;
        let full = self.root.join(&relative);

        let contents = std::fs::read(&full).map_err(|e| map_read_error(path, e))?;
        Ok(SourceFile {
            name: normalize(&relative),
            contents,
        })
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn walk(&self) -> VeneerResult<Vec<String>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::WalkFailed {
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative =
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .map_err(|e| ApplicationError::WalkFailed {
                        reason: e.to_string(),
                    })?;
            paths.push(normalize(relative));
        }
        Ok(paths)
    }
}

/// Resolve a virtual path to a safe relative path, or `None` if it is
/// absolute or tries to traverse out of the root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return None;
    }

    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!clean.as_os_str().is_empty()).then_some(clean)
}

/// Normalise a filesystem path to forward slashes so Windows and Unix paths
/// compare identically throughout the pipeline.
fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn map_read_error(path: &str, e: io::Error) -> ApplicationError {
    if e.kind() == io::ErrorKind::NotFound {
        ApplicationError::SourceNotFound {
            path: path.to_owned(),
        }
    } else {
        ApplicationError::SourceRead {
            path: path.to_owned(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populated() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("pages")).unwrap();
        fs::write(temp.path().join("pages/index.html"), "<h1>index</h1>").unwrap();
        fs::write(temp.path().join("about.md"), "# about").unwrap();
        temp
    }

    #[test]
    fn open_reads_file_contents() {
        let temp = populated();
        let fs = DirFs::new(temp.path());

        let file = fs.open("pages/index.html").unwrap();
        assert_eq!(file.name, "pages/index.html");
        assert_eq!(file.contents, b"<h1>index</h1>");
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let temp = populated();
        let fs = DirFs::new(temp.path());

        let err = fs.open("nope.html").unwrap_err();
        assert!(matches!(
            err,
            veneer_core::error::VeneerError::Application(ApplicationError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn open_rejects_traversal_attempts() {
        let temp = populated();
        let fs = DirFs::new(temp.path().join("pages"));

        assert!(fs.open("../about.md").is_err());
        assert!(fs.open("/etc/passwd").is_err());
        assert!(fs.open("").is_err());
    }

    #[test]
    fn walk_lists_files_recursively_in_order() {
        let temp = populated();
        let fs = DirFs::new(temp.path());

        assert_eq!(fs.walk().unwrap(), vec!["about.md", "pages/index.html"]);
    }

    #[test]
    fn sanitize_allows_curdir_segments() {
        assert_eq!(sanitize("./a/b.html"), Some(PathBuf::from("a/b.html")));
        assert_eq!(sanitize("a/../b.html"), None);
    }
}
