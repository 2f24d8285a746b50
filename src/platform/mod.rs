//! Platform fingerprinting and per-platform extraction
//!
//! Every extractor shares one bounded, parallel tree walk ([`collect_tree`])
//! and layers its own marker-file handling on top of the result.

mod base44;
pub mod detector;
mod generic;
mod replit;
mod walk;

pub use base44::Base44Extractor;
pub use detector::PlatformDetector;
pub use generic::GenericExtractor;
pub use replit::ReplitExtractor;
pub use walk::collect_tree;

use crate::error::Result;
use crate::extraction::{ExtractionResult, Platform};
use crate::fs::{FileSystem, WalkOptions};
use crate::util::CancellationToken;
use rayon::ThreadPool;
use std::path::Path;

/// Everything an extractor needs for one run
pub struct ExtractContext<'a> {
    pub fs: &'a dyn FileSystem,
    /// Canonical source root
    pub root: &'a Path,
    pub walk: WalkOptions,
    pub max_file_size: u64,
    pub pool: &'a ThreadPool,
    pub cancel: &'a CancellationToken,
}

/// A hosting platform's marker predicates and extraction behavior
pub trait PlatformExtractor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Whether the tree at `root` carries this platform's markers
    fn detect(&self, fs: &dyn FileSystem, root: &Path) -> bool;

    fn extract(&self, ctx: &ExtractContext<'_>) -> Result<ExtractionResult>;
}

/// First marker from `markers` that exists below `root`
pub(crate) fn find_marker<'m>(
    fs: &dyn FileSystem,
    root: &Path,
    markers: &[&'m str],
) -> Option<&'m str> {
    markers.iter().copied().find(|m| fs.exists(&root.join(m)))
}
