//! Path utilities
//!
//! Stateless helpers for normalizing and decomposing resource paths.
//! All paths handled by the asset pipeline go through [`normalize`] first so
//! that index lookups never depend on separator style or `.`/`..` noise.

use std::path::{Component, Path, PathBuf};

/// A path split into directory, stem and extension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitPath {
    /// Directory containing the file (no trailing separator)
    pub dir: PathBuf,
    /// File name without extension
    pub stem: String,
    /// Lowercased extension without the leading dot, empty if none
    pub ext: String,
}

impl SplitPath {
    /// File name including the extension
    pub fn file_name(&self) -> String {
        if self.ext.is_empty() {
            self.stem.clone()
        } else {
            format!("{}.{}", self.stem, self.ext)
        }
    }
}

/// Lexically normalize a path.
///
/// `.` components are dropped and `..` pops the previous component. The
/// file system is never consulted and file names are kept byte for byte:
/// `\` only separates components where the platform says so.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Split a path into directory, stem and lowercased extension.
pub fn split_path(path: impl AsRef<Path>) -> SplitPath {
    let path = path.as_ref();
    SplitPath {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        stem: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ext: extension(path).unwrap_or_default(),
    }
}

/// Final path component as a string, empty for roots.
pub fn file_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension without the dot.
pub fn extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Append a trailing `/` if missing.
pub fn add_trailing_slash(path: &str) -> String {
    if path.ends_with('/') || path.ends_with('\\') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Append `.suffix` to the full file name (`wood.material` -> `wood.material.asset`).
pub fn with_appended_extension(path: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let mut os = path.as_ref().as_os_str().to_os_string();
    os.push(".");
    os.push(suffix);
    PathBuf::from(os)
}

/// True if `child` lies directly inside `parent` (one level, not recursive).
pub fn is_direct_child(parent: impl AsRef<Path>, child: impl AsRef<Path>) -> bool {
    child.as_ref().parent() == Some(parent.as_ref())
}

/// True if the file name starts with a dot.
pub fn is_hidden(path: impl AsRef<Path>) -> bool {
    file_name(path).starts_with('.')
}

/// Number of normal components, used to order paths parents-first.
pub fn depth(path: impl AsRef<Path>) -> usize {
    path.as_ref()
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

/// Replace the `from` prefix of `path` with `to`.
///
/// Returns `None` if `path` does not start with `from`.
pub fn rebase(path: impl AsRef<Path>, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Option<PathBuf> {
    let rest = path.as_ref().strip_prefix(from.as_ref()).ok()?;
    if rest.as_os_str().is_empty() {
        Some(to.as_ref().to_path_buf())
    } else {
        Some(to.as_ref().join(rest))
    }
}
