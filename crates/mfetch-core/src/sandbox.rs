//! Destination path resolution confined to the target directory.
//!
//! Entry names come from a remote manifest and are untrusted: `../` segments or
//! absolute names must never place a file outside the target directory.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and let `..` pop the
/// previous normal component. Does not touch the filesystem or follow symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let after_normal = matches!(last, Some(Component::Normal(_)));
                // `..` at the root stays at the root.
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if after_normal {
                    out.pop();
                } else if !at_root {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, normalized form of the target directory. Relative paths are taken
/// relative to the current working directory.
pub fn absolute_target(dir: &Path) -> io::Result<PathBuf> {
    let abs = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    Ok(normalize(&abs))
}

/// Resolve `name` under `target_dir` (which must already be absolute and
/// normalized, see [`absolute_target`]).
///
/// Returns `None` when the resolved path escapes the target directory or is
/// the target directory itself. Containment is checked per path component, so
/// `/data/dl2/x` is not considered inside `/data/dl`.
pub fn resolve(target_dir: &Path, name: &str) -> Option<PathBuf> {
    let resolved = normalize(&target_dir.join(name));
    if resolved == target_dir || !resolved.starts_with(target_dir) {
        return None;
    }
    Some(resolved)
}

/// Create all missing parent directories of `path`.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
