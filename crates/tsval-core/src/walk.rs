//! Recursive directory walking.
//!
//! Every file under the root is visited, hidden files and gitignored paths
//! included, except inside `node_modules/` and `.git/`. Entries are sorted
//! by file name so the first match for a name is stable across platforms.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Build a sorted, unfiltered walker over `root`.
#[must_use]
pub fn build_walker(root: &Path) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false);
    builder.hidden(false);
    builder.sort_by_file_name(|a, b| a.cmp(b));
    builder.filter_entry(|entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        !(is_dir && SKIPPED_DIRS.iter().any(|d| entry.file_name() == *d))
    });
    builder.build()
}

/// All files under `root` accepted by `keep`, in walk order.
pub fn find_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    build_walker(root)
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| keep(path))
        .collect()
}

/// First file under `root` whose file name equals `name`.
#[must_use]
pub fn find_file_named(root: &Path, name: &str) -> Option<PathBuf> {
    build_walker(root)
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .find(|e| e.file_name() == name)
        .map(ignore::DirEntry::into_path)
}
