use super::{CodeStructuralSummary, ParseError, PatternParser, PythonGrammarParser, StructureParser};
use crate::extraction::{ExtractedFile, Warning, WarningKind};
use crate::languages::{detect_language, Language};
use crate::util::CancellationToken;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Summary of one file plus the warning raised while producing it, if any
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub summary: CodeStructuralSummary,
    pub warning: Option<Warning>,
}

/// Summaries for every source file of a tree, in path order
#[derive(Debug, Clone, Default)]
pub struct StructureAnalysis {
    pub summaries: Vec<CodeStructuralSummary>,
    pub warnings: Vec<Warning>,
}

/// Ordered list of parsers; the first one supporting a language handles it
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn StructureParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PythonGrammarParser::new()));
        registry.register(Arc::new(PatternParser::new()));
        registry
    }

    pub fn register(&mut self, parser: Arc<dyn StructureParser>) {
        self.parsers.push(parser);
    }

    pub fn parser_for(&self, language: Language) -> Option<&dyn StructureParser> {
        self.parsers
            .iter()
            .find(|p| p.supports(language))
            .map(|p| p.as_ref())
    }

    /// Parse `content` as `language`. Never fails: errors degrade to an empty
    /// (or partially recovered) summary and a `ParseDegraded` warning.
    pub fn parse(&self, path: &str, content: &[u8], language: Language) -> ParsedFile {
        let degraded = |summary: CodeStructuralSummary, message: String| ParsedFile {
            summary,
            warning: Some(Warning::for_path(WarningKind::ParseDegraded, path, message)),
        };

        let Ok(text) = std::str::from_utf8(content) else {
            return degraded(
                CodeStructuralSummary::empty(path, language),
                "Content is not valid UTF-8".to_string(),
            );
        };

        let Some(parser) = self.parser_for(language) else {
            return degraded(
                CodeStructuralSummary::empty(path, language),
                ParseError::Unsupported(language).to_string(),
            );
        };

        match parser.parse(text, language) {
            Ok(mut summary) => {
                summary.path = path.to_string();
                ParsedFile {
                    summary,
                    warning: None,
                }
            }
            Err(ParseError::Syntax { mut partial }) => {
                partial.path = path.to_string();
                degraded(
                    partial,
                    format!("{} parser recovered from syntax errors", parser.name()),
                )
            }
            Err(e) => {
                debug!(path, parser = parser.name(), error = %e, "Parse failed");
                degraded(CodeStructuralSummary::empty(path, language), e.to_string())
            }
        }
    }

    /// Detect the language of a file and parse it; non-source files yield `None`
    pub fn parse_file(&self, file: &ExtractedFile) -> Option<ParsedFile> {
        let language = detect_language(&file.path, Some(&file.content));
        if !language.is_source() {
            return None;
        }
        Some(self.parse(&file.path, &file.content, language))
    }

    /// Parse all files on the current rayon pool, stopping at file boundaries
    /// once `cancel` fires.
    pub fn parse_all(&self, files: &[ExtractedFile], cancel: &CancellationToken) -> StructureAnalysis {
        let parsed: Vec<Option<ParsedFile>> = files
            .par_iter()
            .map(|file| {
                if cancel.is_cancelled() {
                    return None;
                }
                self.parse_file(file)
            })
            .collect();

        let mut analysis = StructureAnalysis::default();
        for outcome in parsed.into_iter().flatten() {
            if let Some(warning) = outcome.warning {
                analysis.warnings.push(warning);
            }
            analysis.summaries.push(outcome.summary);
        }
        debug!(
            summaries = analysis.summaries.len(),
            warnings = analysis.warnings.len(),
            "Structure analysis completed"
        );
        analysis
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_order() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.parser_for(Language::Python).unwrap().name(), "python-grammar");
        assert_eq!(registry.parser_for(Language::Go).unwrap().name(), "pattern");
        assert!(registry.parser_for(Language::Unknown).is_none());
    }

    #[test]
    fn test_parse_sets_path() {
        let registry = ParserRegistry::with_defaults();
        let parsed = registry.parse("app/main.py", b"import flask\n", Language::Python);
        assert_eq!(parsed.summary.path, "app/main.py");
        assert_eq!(parsed.summary.imports, vec!["flask"]);
        assert!(parsed.warning.is_none());
    }

    #[test]
    fn test_non_utf8_degrades() {
        let registry = ParserRegistry::with_defaults();
        let parsed = registry.parse("bad.js", &[0xff, 0xfe, 0x00], Language::JavaScript);
        assert!(parsed.summary.is_empty());
        assert_eq!(parsed.warning.unwrap().kind, WarningKind::ParseDegraded);
    }

    #[test]
    fn test_missing_parser_degrades() {
        let registry = ParserRegistry::new();
        let parsed = registry.parse("main.go", b"package main\n", Language::Go);
        assert!(parsed.summary.is_empty());
        assert!(parsed.warning.unwrap().message.contains("No parser supports go"));
    }

    #[test]
    fn test_syntax_error_keeps_partial_summary() {
        let registry = ParserRegistry::with_defaults();
        let parsed = registry.parse("broken.py", b"import yaml\ndef f(:\n", Language::Python);
        assert_eq!(parsed.summary.imports, vec!["yaml"]);
        assert_eq!(parsed.warning.unwrap().kind, WarningKind::ParseDegraded);
    }

    #[test]
    fn test_parse_all_skips_non_source_and_keeps_order() {
        let registry = ParserRegistry::with_defaults();
        let files = vec![
            ExtractedFile::new("README.md", b"# Demo\n".to_vec()),
            ExtractedFile::new("a.py", b"import os\n".to_vec()),
            ExtractedFile::new("b.js", b"const x = require('express');\n".to_vec()),
        ];
        let analysis = registry.parse_all(&files, &CancellationToken::new());
        let paths: Vec<&str> = analysis.summaries.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.js"]);
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_parse_all_honors_cancellation() {
        let registry = ParserRegistry::with_defaults();
        let files = vec![ExtractedFile::new("a.py", b"import os\n".to_vec())];
        let token = CancellationToken::new();
        token.cancel();
        assert!(registry.parse_all(&files, &token).summaries.is_empty());
    }
}
