//! Configuration management for liberator
//!
//! Settings are loaded from environment variables with defaults by
//! `LiberatorConfig::default()` and checked with `validate()`.
//!
//! # Environment Variables
//!
//! - `LIBERATOR_MAX_FILE_SIZE`: largest file read, in bytes - default: 5 MiB
//! - `LIBERATOR_WORKERS`: traversal/parsing worker threads - default: available
//!   parallelism, capped at 8
//! - `LIBERATOR_MAX_DEPTH`: maximum directory depth walked - default: 64
//! - `LIBERATOR_EXCLUDE_DIRS`: comma-separated directory names skipped in
//!   addition to the built-in list
//! - `LIBERATOR_LOG_LEVEL`: logging level - default: "info"

use crate::fs::WalkOptions;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
const MIN_MAX_FILE_SIZE: u64 = 1024;
const MAX_MAX_FILE_SIZE: u64 = 512 * 1024 * 1024;
const DEFAULT_MAX_WORKERS: usize = 8;
const MAX_WORKERS: usize = 64;
const DEFAULT_MAX_DEPTH: usize = 64;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Directories never worth extracting: VCS metadata, installed dependencies,
/// interpreter caches and build output.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    ".pythonlibs",
    ".upm",
    ".cache",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiberatorConfig {
    /// Files larger than this are skipped with a warning
    pub max_file_size: u64,

    /// Size of the worker pool used for reads and parsing
    pub worker_threads: usize,

    pub max_depth: usize,

    /// Directory names skipped wherever they appear in the tree
    pub excluded_dirs: Vec<String>,

    pub log_level: String,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_MAX_WORKERS)
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl Default for LiberatorConfig {
    /// Loads from `LIBERATOR_*` environment variables, ignoring values that
    /// fail to parse. Use `from_env` to surface those instead.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|_| Self::builtin())
    }
}

impl LiberatorConfig {
    /// Defaults without consulting the environment
    pub fn builtin() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            worker_threads: default_workers(),
            max_depth: DEFAULT_MAX_DEPTH,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::builtin();

        if let Some(size) = parse_env::<u64>("LIBERATOR_MAX_FILE_SIZE")? {
            config.max_file_size = size;
        }
        if let Some(workers) = parse_env::<usize>("LIBERATOR_WORKERS")? {
            config.worker_threads = workers;
        }
        if let Some(depth) = parse_env::<usize>("LIBERATOR_MAX_DEPTH")? {
            config.max_depth = depth;
        }
        if let Ok(extra) = env::var("LIBERATOR_EXCLUDE_DIRS") {
            for dir in extra.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                if !config.excluded_dirs.iter().any(|d| d == dir) {
                    config.excluded_dirs.push(dir.to_string());
                }
            }
        }
        if let Ok(level) = env::var("LIBERATOR_LOG_LEVEL") {
            config.log_level = level.trim().to_lowercase();
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size < MIN_MAX_FILE_SIZE {
            return Err(ConfigError::ValidationFailed(
                "Max file size must be at least 1KiB".to_string(),
            ));
        }
        if self.max_file_size > MAX_MAX_FILE_SIZE {
            return Err(ConfigError::ValidationFailed(
                "Max file size cannot exceed 512MiB".to_string(),
            ));
        }

        if self.worker_threads == 0 || self.worker_threads > MAX_WORKERS {
            return Err(ConfigError::ValidationFailed(format!(
                "Worker threads must be between 1 and {}",
                MAX_WORKERS
            )));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max depth must be at least 1".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Walk options for a traversal; `excluded_paths` is filled in per run
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: self.max_depth,
            excluded_dirs: self.excluded_dirs.clone(),
            excluded_paths: Vec::new(),
        }
    }
}

impl fmt::Display for LiberatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Liberator Configuration:")?;
        writeln!(f, "  Max File Size: {} bytes", self.max_file_size)?;
        writeln!(f, "  Worker Threads: {}", self.worker_threads)?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Excluded Dirs: {}", self.excluded_dirs.join(", "))?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
