//! Lexical path helpers
//!
//! Playlists store paths relative to their folder with `/` separators no
//! matter the host. None of these helpers touch the filesystem except
//! [`absolutize`], which needs the working directory.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into the preceding component
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }
    out.iter().collect()
}

/// Make `path` absolute against the working directory, then normalize it
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Express `path` relative to `base`, climbing with `..` where needed
///
/// Returns `None` when the two paths do not share a root (one relative and
/// one absolute, or different drive prefixes).
pub fn relativize(base: &Path, path: &Path) -> Option<PathBuf> {
    let base = normalize(base);
    let path = normalize(path);
    let base_parts: Vec<Component> = base.components().collect();
    let path_parts: Vec<Component> = path.components().collect();

    let is_root = |c: &&Component| matches!(c, Component::Prefix(_) | Component::RootDir);
    let base_root: Vec<&Component> = base_parts.iter().take_while(is_root).collect();
    let path_root: Vec<&Component> = path_parts.iter().take_while(is_root).collect();
    if base_root != path_root {
        return None;
    }

    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    Some(relative)
}

/// Render a path with `/` separators
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Byte offset of the first differing character of `a` and `b`
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}
