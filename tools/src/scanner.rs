//! Directory scanner.
//!
//! A manual stack-based walk over `std::fs::read_dir` — no `walkdir`
//! dependency. Every directory and file entry is checked with
//! `fs::symlink_metadata` before being read or descended into; a symlink
//! anywhere in the tree is skipped, never followed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ToolsError, ToolsResult};

/// Default per-file size cap: 1 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// One scanned file: its canonicalized-relative path and its decoded
/// contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recursive: bool,
    /// File extensions to include, without the leading dot. Empty means
    /// every file matches.
    pub extensions: Vec<String>,
    pub max_file_bytes: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            recursive: true,
            extensions: vec!["pine".to_string()],
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Walk `root`, returning matching files in stable lexicographic path order.
pub fn scan(root: &Path, opts: &ScanOptions) -> ToolsResult<Vec<FileItem>> {
    let root = fs::canonicalize(root).map_err(|e| ToolsError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;

    let root_meta = fs::symlink_metadata(&root).map_err(|e| ToolsError::Io {
        path: root.clone(),
        source: e,
    })?;
    if root_meta.file_type().is_symlink() {
        return Err(ToolsError::SymlinkRefused(root));
    }
    if !root_meta.is_dir() {
        return Err(ToolsError::RootNotADirectory(root));
    }

    let mut matched_paths = collect_paths(&root, opts)?;
    matched_paths.sort();

    let mut items = Vec::with_capacity(matched_paths.len());
    for path in matched_paths {
        match read_file(&path) {
            Some(contents) => items.push(FileItem { path, contents }),
            None => continue,
        }
    }
    Ok(items)
}

fn collect_paths(root: &Path, opts: &ScanOptions) -> ToolsResult<Vec<PathBuf>> {
    let mut matched = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| ToolsError::Io {
            path: dir.clone(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| ToolsError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();

            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable entry");
                    continue;
                }
            };

            if meta.file_type().is_symlink() {
                tracing::warn!(path = %path.display(), "refusing to follow symlink");
                continue;
            }

            if meta.is_dir() {
                if opts.recursive {
                    stack.push(path);
                }
                continue;
            }

            if !has_matching_extension(&path, &opts.extensions) {
                continue;
            }

            if meta.len() > opts.max_file_bytes {
                tracing::warn!(path = %path.display(), size = meta.len(), cap = opts.max_file_bytes, "skipping file over size cap");
                continue;
            }

            matched.push(path);
        }
    }

    Ok(matched)
}

fn has_matching_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Reads and decodes a single file, logging and skipping rather than failing
/// the whole scan on non-UTF-8 content.
fn read_file(path: &Path) -> Option<String> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read file");
            return None;
        }
    };
    match String::from_utf8(raw) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::warn!(path = %path.display(), "skipping non-UTF-8 file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(path: &Path, contents: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn scans_matching_extensions_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("b.pine"), "indicator(\"B\")");
        write_file(&dir.path().join("a.pine"), "indicator(\"A\")");
        write_file(&dir.path().join("ignore.txt"), "not pine");

        let items = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].path.ends_with("a.pine"));
        assert!(items[1].path.ends_with("b.pine"));
    }

    #[test]
    fn recursive_flag_controls_descent() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        write_file(&sub.join("nested.pine"), "indicator(\"N\")");
        write_file(&dir.path().join("top.pine"), "indicator(\"T\")");

        let mut opts = ScanOptions::default();
        opts.recursive = false;
        let shallow = scan(dir.path(), &opts).unwrap();
        assert_eq!(shallow.len(), 1);

        opts.recursive = true;
        let deep = scan(dir.path(), &opts).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn oversized_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("big.pine"), &"x".repeat(100));

        let mut opts = ScanOptions::default();
        opts.max_file_bytes = 10;
        let items = scan(dir.path(), &opts).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn nonexistent_root_is_an_error() {
        let missing = Path::new("/nonexistent/pinelint/root/path");
        assert!(scan(missing, &ScanOptions::default()).is_err());
    }
}
