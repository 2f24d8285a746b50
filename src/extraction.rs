//! The artifact produced by one extractor run and consumed by analysis and export

use crate::ecosystem::Ecosystem;
use crate::languages::{detect_language, Language};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Hosting platform a source tree was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Base44,
    Replit,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Base44 => "base44",
            Platform::Replit => "replit",
            Platform::Generic => "generic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Base44 => "Base44",
            Platform::Replit => "Replit",
            Platform::Generic => "Generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base44" => Ok(Platform::Base44),
            "replit" => Ok(Platform::Replit),
            "generic" => Ok(Platform::Generic),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// One file copied out of the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Path relative to the source root, `/`-separated
    pub path: String,
    pub content: Vec<u8>,
    pub size: u64,
}

impl ExtractedFile {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        Self {
            path: path.into(),
            content,
            size,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of path components, 1 for files at the root
    pub fn depth(&self) -> usize {
        self.path.split('/').count()
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Raw text of a dependency manifest found in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDeclaration {
    pub path: String,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    FileSkipped,
    ManifestUnparsable,
    MarkerUnparsable,
    ParseDegraded,
    Cancelled,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::FileSkipped => "file_skipped",
            WarningKind::ManifestUnparsable => "manifest_unparsable",
            WarningKind::MarkerUnparsable => "marker_unparsable",
            WarningKind::ParseDegraded => "parse_degraded",
            WarningKind::Cancelled => "cancelled",
        }
    }
}

/// A recoverable problem encountered during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    pub fn for_path(kind: WarningKind, path: &str, message: impl Into<String>) -> Self {
        Self::new(kind, Some(path.to_string()), message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {}: {}", self.kind.as_str(), path, self.message),
            None => write!(f, "[{}] {}", self.kind.as_str(), self.message),
        }
    }
}

/// Files, manifest declarations and metadata gathered from one source tree
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub platform: Platform,
    /// Last component of the source root
    pub project_name: String,
    /// Ordered by relative path, paths unique
    pub files: Vec<ExtractedFile>,
    /// Per ecosystem, ordered by depth then path
    pub manifests: BTreeMap<Ecosystem, Vec<ManifestDeclaration>>,
    pub metadata: BTreeMap<String, Value>,
    pub warnings: Vec<Warning>,
    pub cancelled: bool,
}

impl ExtractionResult {
    pub fn new(platform: Platform, project_name: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "platform".to_string(),
            Value::String(platform.as_str().to_string()),
        );
        Self {
            platform,
            project_name: project_name.into(),
            files: Vec::new(),
            manifests: BTreeMap::new(),
            metadata,
            warnings: Vec::new(),
            cancelled: false,
        }
    }

    pub fn file(&self, path: &str) -> Option<&ExtractedFile> {
        self.files
            .binary_search_by(|f| f.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.files[i])
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    pub fn file_paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Root-level manifest of an ecosystem, if the tree has one
    pub fn root_manifest(&self, ecosystem: Ecosystem) -> Option<&ManifestDeclaration> {
        self.manifests
            .get(&ecosystem)?
            .iter()
            .find(|m| !m.path.contains('/') && Some(m.file_name.as_str()) == ecosystem.manifest_file())
    }

    /// Total number of bytes across extracted files
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Number of source files per detected language
    pub fn language_counts(&self) -> BTreeMap<Language, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            let language = detect_language(&file.path, Some(&file.content));
            if language.is_source() {
                *counts.entry(language).or_insert(0) += 1;
            }
        }
        counts
    }
}
