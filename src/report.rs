//! JSON analysis report written by `analyze --output`
//!
//! Field order is part of the format: `platform`, `file_count`, `languages`,
//! `dependencies`, `files`, `warnings`. Maps are `BTreeMap`s and dependency
//! lists are sorted by name, so the same tree always serializes identically.

use crate::dependencies::Dependency;
use crate::ecosystem::Ecosystem;
use crate::error::{LiberatorError, Result};
use crate::extraction::{Platform, Warning};
use crate::parser::CodeStructuralSummary;
use crate::pipeline::ProjectAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub platform: Platform,
    pub file_count: usize,
    /// Source files per language name
    pub languages: BTreeMap<String, usize>,
    pub dependencies: BTreeMap<Ecosystem, Vec<Dependency>>,
    pub files: Vec<CodeStructuralSummary>,
    pub warnings: Vec<Warning>,
}

impl AnalysisReport {
    pub fn from_analysis(analysis: &ProjectAnalysis) -> Self {
        let dependencies = analysis
            .dependencies
            .iter()
            .map(|(ecosystem, _)| {
                let sorted = analysis
                    .dependencies
                    .sorted_by_name(ecosystem)
                    .into_iter()
                    .cloned()
                    .collect();
                (ecosystem, sorted)
            })
            .collect();

        Self {
            platform: analysis.extraction.platform,
            file_count: analysis.extraction.files.len(),
            languages: analysis.language_names(),
            dependencies,
            files: analysis.summaries.clone(),
            warnings: analysis.extraction.warnings.clone(),
        }
    }

    pub fn dependency_counts(&self) -> BTreeMap<Ecosystem, usize> {
        self.dependencies
            .iter()
            .map(|(ecosystem, deps)| (*ecosystem, deps.len()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| LiberatorError::Serialization {
                what: "analysis report".to_string(),
                reason: e.to_string(),
            })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LiberatorError::Serialization {
            what: "analysis report".to_string(),
            reason: e.to_string(),
        })
    }
}
