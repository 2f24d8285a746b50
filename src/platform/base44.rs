use super::{collect_tree, find_marker, ExtractContext, PlatformExtractor};
use crate::error::Result;
use crate::extraction::{ExtractionResult, Platform, Warning, WarningKind};
use crate::fs::FileSystem;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

const MARKERS: &[&str] = &[".base44", "base44.json", "base44.config", ".base44config"];

/// Keys copied from the Base44 config into result metadata: (metadata key, config keys in preference order)
const LIFTED_KEYS: &[(&str, &[&str])] = &[
    ("app_name", &["name"]),
    ("language", &["language"]),
    ("framework", &["framework"]),
    ("entrypoint", &["entrypoint", "main"]),
];

pub struct Base44Extractor;

impl Base44Extractor {
    fn apply_config(result: &mut ExtractionResult, marker: &str) {
        let Some(text) = result.file(marker).and_then(|f| f.text()).map(str::to_string) else {
            return;
        };

        let config: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(marker, error = %e, "Base44 config is not valid JSON");
                result.warn(Warning::for_path(
                    WarningKind::MarkerUnparsable,
                    marker,
                    format!("Invalid JSON: {}", e),
                ));
                return;
            }
        };

        for (meta_key, config_keys) in LIFTED_KEYS {
            let value = config_keys
                .iter()
                .find_map(|k| config.get(*k).and_then(Value::as_str));
            if let Some(value) = value {
                result.set_metadata(meta_key, value);
            }
        }
        debug!(marker, "Base44 config parsed");
        result.set_metadata("base44_config", config);
    }
}

impl PlatformExtractor for Base44Extractor {
    fn platform(&self) -> Platform {
        Platform::Base44
    }

    fn detect(&self, fs: &dyn FileSystem, root: &Path) -> bool {
        if find_marker(fs, root, MARKERS).is_some() {
            return true;
        }
        fs.read_to_string(&root.join("package.json"))
            .map(|content| content.to_lowercase().contains("base44"))
            .unwrap_or(false)
    }

    fn extract(&self, ctx: &ExtractContext<'_>) -> Result<ExtractionResult> {
        let mut result = collect_tree(ctx, Platform::Base44)?;

        // `.base44` may be a directory; only a readable marker file carries config
        let marker = MARKERS.iter().copied().find(|m| result.has_file(m));
        match marker {
            Some(marker) => {
                result.set_metadata("marker_file", marker);
                Self::apply_config(&mut result, marker);
            }
            None if result.has_file("package.json") => {
                result.set_metadata("marker_file", "package.json");
            }
            None => {}
        }

        Ok(result)
    }
}
