use super::{collect_tree, ExtractContext, PlatformExtractor};
use crate::error::Result;
use crate::extraction::{ExtractionResult, Platform};
use crate::fs::FileSystem;
use std::path::Path;

/// Fallback for trees without platform markers
pub struct GenericExtractor;

impl PlatformExtractor for GenericExtractor {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn detect(&self, _fs: &dyn FileSystem, _root: &Path) -> bool {
        true
    }

    fn extract(&self, ctx: &ExtractContext<'_>) -> Result<ExtractionResult> {
        collect_tree(ctx, Platform::Generic)
    }
}
