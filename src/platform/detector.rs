//! Ordered platform detection

use super::{Base44Extractor, GenericExtractor, PlatformExtractor, ReplitExtractor};
use crate::extraction::Platform;
use crate::fs::FileSystem;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Extractors in priority order. Generic is always last and always matches,
/// so detection never fails.
pub struct PlatformDetector {
    extractors: Vec<Arc<dyn PlatformExtractor>>,
}

impl PlatformDetector {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Arc::new(Base44Extractor),
                Arc::new(ReplitExtractor),
                Arc::new(GenericExtractor),
            ],
        }
    }

    pub fn extractors(&self) -> &[Arc<dyn PlatformExtractor>] {
        &self.extractors
    }

    pub fn extractor_for(&self, platform: Platform) -> Arc<dyn PlatformExtractor> {
        self.extractors
            .iter()
            .find(|e| e.platform() == platform)
            .cloned()
            .unwrap_or_else(|| Arc::new(GenericExtractor))
    }

    /// Pick the extractor for `root`. An explicit `platform_override` wins;
    /// otherwise the first extractor whose markers match.
    pub fn detect(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
        platform_override: Option<Platform>,
    ) -> Arc<dyn PlatformExtractor> {
        if let Some(platform) = platform_override {
            info!(platform = %platform, "Using platform override");
            return self.extractor_for(platform);
        }

        let matches: Vec<Platform> = self
            .extractors
            .iter()
            .filter(|e| e.platform() != Platform::Generic && e.detect(fs, root))
            .map(|e| e.platform())
            .collect();
        if matches.len() > 1 {
            debug!(?matches, chosen = %matches[0], "Markers of several platforms present");
        }

        let chosen = self
            .extractors
            .iter()
            .find(|e| e.detect(fs, root))
            .cloned()
            .unwrap_or_else(|| Arc::new(GenericExtractor));
        info!(platform = %chosen.platform(), root = %root.display(), "Platform detected");
        chosen
    }
}

impl Default for PlatformDetector {
    fn default() -> Self {
        Self::new()
    }
}
