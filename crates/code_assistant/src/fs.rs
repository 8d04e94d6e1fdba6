//! Filesystem collaborator interface and its std-backed implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Write ceiling applied by [`LocalFs`]; larger payloads are refused.
pub const MAX_WRITE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("content for {path} is {size} bytes, above the {limit} byte write ceiling")]
    SizeExceeded {
        path: PathBuf,
        size: usize,
        limit: usize,
    },

    #[error("file {path} is not valid UTF-8 text")]
    NotUtf8 { path: PathBuf },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                operation,
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Narrow filesystem surface the dispatcher executes against.
pub trait Filesystem {
    fn read(&self, path: &Path) -> Result<String, FsError>;
    fn write(&mut self, path: &Path, content: &str) -> Result<(), FsError>;
    fn list(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError>;
}

/// `std::fs`-backed filesystem with parent-directory creation and a write
/// size ceiling.
#[derive(Debug, Clone)]
pub struct LocalFs {
    max_write_bytes: usize,
}

impl LocalFs {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_write_bytes: MAX_WRITE_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_write_bytes(max_write_bytes: usize) -> Self {
        Self { max_write_bytes }
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFs {
    fn read(&self, path: &Path) -> Result<String, FsError> {
        let bytes =
            fs::read(path).map_err(|source| FsError::io("reading file", path, source))?;

        String::from_utf8(bytes).map_err(|_| FsError::NotUtf8 {
            path: path.to_path_buf(),
        })
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), FsError> {
        if content.len() > self.max_write_bytes {
            return Err(FsError::SizeExceeded {
                path: path.to_path_buf(),
                size: content.len(),
                limit: self.max_write_bytes,
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|source| FsError::io("creating parent directories", parent, source))?;
            }
        }

        fs::write(path, content).map_err(|source| FsError::io("writing file", path, source))
    }

    fn list(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        if path.is_file() {
            return Err(FsError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        let reader =
            fs::read_dir(path).map_err(|source| FsError::io("listing directory", path, source))?;

        let mut entries = Vec::new();
        for item in reader {
            let item =
                item.map_err(|source| FsError::io("listing directory", path, source))?;
            entries.push(DirectoryEntry {
                name: item.file_name().to_string_lossy().to_string(),
                is_dir: item.path().is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
