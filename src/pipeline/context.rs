//! Inputs and outputs of one pipeline run

use crate::dependencies::MergedDependencies;
use crate::exporter::{ExportOptions, ExportSummary};
use crate::extraction::{ExtractionResult, Platform, Warning};
use crate::parser::CodeStructuralSummary;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What to run: a source tree, an optional export destination and the
/// platform override, if any
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    /// `None` lets the detector choose
    pub platform: Option<Platform>,
    pub export: ExportOptions,
}

impl RunRequest {
    /// Analysis only, nothing is written
    pub fn analyze(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: None,
            platform: None,
            export: ExportOptions::default(),
        }
    }

    pub fn export_to(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::analyze(source)
        }
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export = options;
        self
    }
}

/// Extraction plus everything derived from it. All recoverable problems of
/// the run end up in `extraction.warnings`.
#[derive(Debug, Clone)]
pub struct ProjectAnalysis {
    pub extraction: ExtractionResult,
    /// One per parsed source file, in path order
    pub summaries: Vec<CodeStructuralSummary>,
    pub dependencies: MergedDependencies,
}

impl ProjectAnalysis {
    pub fn warnings(&self) -> &[Warning] {
        &self.extraction.warnings
    }

    /// Source files per language, keyed by language name
    pub fn language_names(&self) -> BTreeMap<String, usize> {
        self.extraction
            .language_counts()
            .into_iter()
            .map(|(language, count)| (language.as_str().to_string(), count))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub analysis: ProjectAnalysis,
    /// Set when the request had an output and the run was not cancelled
    pub export: Option<ExportSummary>,
}
