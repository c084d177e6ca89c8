//! Filesystem abstractions used to collect sources for analysis.

use std::path::{Path, PathBuf};

use crate::error::{LitmusError, Result};

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Whether the path names a regular file.
    fn is_file(&self, path: &Path) -> bool;
    /// List all files reachable from the root path.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
    /// Read a file as UTF-8 source text.
    fn read_source(&self, path: &Path) -> Result<String>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if is_hidden(&path) {
                    continue;
                }
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn read_source(&self, path: &Path) -> Result<String> {
        decode_source(std::fs::read(path)?)
    }
}

/// Decode uploaded or on-disk bytes as UTF-8 source text.
pub fn decode_source(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| LitmusError::Encoding(err.utf8_error()))
}

/// Collect the Python sources under `root`, or `root` itself when it is a file.
pub fn collect_python_sources<F: FileSystem>(fs: &F, root: &Path) -> Result<Vec<PathBuf>> {
    if fs.is_file(root) {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut sources: Vec<PathBuf> = fs
        .list_files(root)?
        .into_iter()
        .filter(|path| is_python_file(path))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Whether the path looks like a Python module.
pub fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("py") || ext.eq_ignore_ascii_case("pyw"))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
