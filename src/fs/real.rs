use super::r#trait::relative_string;
use super::{FileSystem, WalkEntry, WalkFailure, WalkOptions, WalkOutput};
use anyhow::{Context, Result};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let file = fs::File::open(path).context(format!("Failed to open file {:?}", path))?;
        let mut buffer = Vec::new();
        file.take(max_bytes as u64)
            .read_to_end(&mut buffer)
            .context(format!("Failed to read bytes from {:?}", path))?;
        Ok(buffer)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .context(format!("Failed to canonicalize path {:?}", path))
    }

    fn walk(&self, root: &Path, options: &WalkOptions) -> Result<WalkOutput> {
        let mut override_builder = OverrideBuilder::new(root);
        for excluded in &options.excluded_dirs {
            override_builder
                .add(&format!("!{}/", excluded))
                .context(format!("Invalid excluded directory pattern {:?}", excluded))?;
        }
        let overrides = override_builder
            .build()
            .context("Failed to build walk overrides")?;

        let excluded_paths = options.excluded_paths.clone();
        let mut output = WalkOutput::default();

        for result in WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(options.max_depth))
            .overrides(overrides)
            .filter_entry(move |entry| !excluded_paths.iter().any(|p| entry.path() == p))
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    output.failures.push(WalkFailure {
                        path: None,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let is_dir = match entry.file_type() {
                Some(ft) if ft.is_dir() => true,
                // Symlinks are not followed; a link to a directory is skipped, a
                // dangling link is kept so the read failure surfaces as a warning.
                Some(ft) if ft.is_symlink() => fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false),
                _ => false,
            };
            if is_dir {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            output.entries.push(WalkEntry {
                path: path.to_path_buf(),
                relative: relative_string(relative),
                depth: entry.depth(),
            });
        }

        output.entries.sort_by(|a, b| a.relative.cmp(&b.relative));
        debug!(
            root = %root.display(),
            entries = output.entries.len(),
            failures = output.failures.len(),
            "Walk completed"
        );
        Ok(output)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).context(format!("Failed to write file {:?}", path))
    }
}
