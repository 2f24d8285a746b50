//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// Options controlling a recursive tree walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub max_depth: usize,
    /// Directory names skipped at any depth (e.g. `node_modules`)
    pub excluded_dirs: Vec<String>,
    /// Absolute paths skipped entirely (e.g. an output directory nested in the source)
    pub excluded_paths: Vec<PathBuf>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            excluded_dirs: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

/// A non-directory entry found during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// `/`-separated path relative to the walk root
    pub relative: String,
    pub depth: usize,
}

/// An entry the walker could not visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    pub path: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Entries sorted by relative path
    pub entries: Vec<WalkEntry>,
    pub failures: Vec<WalkFailure>,
}

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Read at most `max_bytes` bytes of a file
    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>>;

    /// Canonicalize a path
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Recursively list every non-directory entry below `root`
    fn walk(&self, root: &Path, options: &WalkOptions) -> Result<WalkOutput>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Write a file, replacing any existing content
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// Joins path components with `/` regardless of host separator
pub fn relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
