//! Per-file structural summaries: imports, functions, classes and exports

mod pattern;
mod python;
mod registry;

pub use pattern::PatternParser;
pub use python::PythonGrammarParser;
pub use registry::{ParsedFile, ParserRegistry, StructureAnalysis};

use crate::languages::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStructuralSummary {
    pub path: String,
    pub language: Language,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub exports: Vec<String>,
}

impl CodeStructuralSummary {
    pub fn empty(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
            && self.exports.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Grammar for {language} could not be loaded: {reason}")]
    Grammar { language: Language, reason: String },

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Source contains syntax errors; structure was partially recovered")]
    Syntax { partial: CodeStructuralSummary },

    #[error("No parser supports {0}")]
    Unsupported(Language),
}

/// A strategy producing a structural summary for the languages it supports
pub trait StructureParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, language: Language) -> bool;

    /// Summary with an empty `path`; the caller fills it in
    fn parse(&self, content: &str, language: Language)
        -> Result<CodeStructuralSummary, ParseError>;
}

/// Append `item` unless already present, keeping first-seen order
pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !item.is_empty() && !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}
