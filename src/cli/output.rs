//! Console output for the `extract`, `analyze` and `export` commands
//!
//! Everything here is plain text for stdout. The machine-readable form of an
//! analysis is [`crate::report::AnalysisReport`].

use crate::dependencies::{Dependency, Provenance};
use crate::exporter::ExportSummary;
use crate::extraction::Warning;
use crate::pipeline::ProjectAnalysis;
use std::fmt::Write;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

fn connector(is_last: bool) -> &'static str {
    if is_last {
        "\u{2514}\u{2500}"
    } else {
        "\u{251C}\u{2500}"
    }
}

pub struct ConsoleFormatter {
    /// Also list per-file structure
    verbose: bool,
}

impl ConsoleFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Platform, languages and dependencies of an analysis
    pub fn format_analysis(&self, analysis: &ProjectAnalysis) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_analysis(&mut out, analysis);
        out
    }

    fn write_analysis(&self, out: &mut String, analysis: &ProjectAnalysis) -> std::fmt::Result {
        let extraction = &analysis.extraction;
        writeln!(out, "\u{2713} Project Analysis: {}", extraction.project_name)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out)?;
        writeln!(out, "Platform:  {}", extraction.platform.display_name())?;
        writeln!(out, "Files:     {}", extraction.files.len())?;
        if let Some(run) = extraction.metadata_str("run_command") {
            writeln!(out, "Run:       {}", run)?;
        }
        writeln!(out)?;

        let languages = analysis.language_names();
        writeln!(out, "Languages:")?;
        if languages.is_empty() {
            writeln!(out, "\u{2514}\u{2500} (none detected)")?;
        }
        for (i, (language, count)) in languages.iter().enumerate() {
            writeln!(
                out,
                "{} {}: {}",
                connector(i == languages.len() - 1),
                language,
                count
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Dependencies:")?;
        if analysis.dependencies.is_empty() {
            writeln!(out, "\u{2514}\u{2500} (none found)")?;
        }
        let ecosystems = analysis.dependencies.ecosystems();
        for (i, ecosystem) in ecosystems.iter().enumerate() {
            let is_last = i == ecosystems.len() - 1;
            let deps = analysis.dependencies.sorted_by_name(*ecosystem);
            writeln!(out, "{} {}: {}", connector(is_last), ecosystem, deps.len())?;
            let indent = if is_last { "   " } else { "\u{2502}  " };
            for dep in deps {
                writeln!(out, "{}  - {}", indent, describe(dep))?;
            }
        }

        if self.verbose && !analysis.summaries.is_empty() {
            writeln!(out)?;
            writeln!(out, "Structure:")?;
            for summary in &analysis.summaries {
                writeln!(
                    out,
                    "  {} ({}): {} imports, {} functions, {} classes, {} exports",
                    summary.path,
                    summary.language,
                    summary.imports.len(),
                    summary.functions.len(),
                    summary.classes.len(),
                    summary.exports.len()
                )?;
            }
        }
        Ok(())
    }

    /// Files written by an export
    pub fn format_export(&self, summary: &ExportSummary) -> String {
        let mut out = String::new();
        let _ = self.write_export(&mut out, summary);
        out
    }

    fn write_export(&self, out: &mut String, summary: &ExportSummary) -> std::fmt::Result {
        writeln!(out, "\u{2713} Exported to {}", summary.output_dir.display())?;
        writeln!(out, "{}", RULE)?;
        writeln!(out)?;
        writeln!(out, "Copied:     {} file(s)", summary.copied)?;
        writeln!(out, "Generated:  {}", summary.generated.join(", "))?;
        if let Some(language) = summary.primary_language {
            writeln!(out, "Container:  {}", language)?;
        }
        if !summary.withheld.is_empty() {
            writeln!(out, "Withheld:   {}", summary.withheld.join(", "))?;
        }
        Ok(())
    }

    /// Count and list; printed last so it is visible after long output
    pub fn format_warnings(&self, warnings: &[Warning]) -> String {
        if warnings.is_empty() {
            return "\nWarnings: 0\n".to_string();
        }
        let mut out = format!("\n\u{26A0} Warnings: {}\n", warnings.len());
        for warning in warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
        out
    }
}

fn describe(dep: &Dependency) -> String {
    match (&dep.version, &dep.provenance) {
        (Some(version), _) => format!("{} {}", dep.name, version),
        (None, Provenance::Inferred { file }) => format!("{} (imported in {})", dep.name, file),
        (None, Provenance::Declared { .. }) => dep.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::MergedDependencies;
    use crate::ecosystem::Ecosystem;
    use crate::extraction::{ExtractedFile, ExtractionResult, Platform, WarningKind};
    use std::path::PathBuf;

    fn analysis() -> ProjectAnalysis {
        let mut extraction = ExtractionResult::new(Platform::Base44, "crm");
        extraction.files = vec![
            ExtractedFile::new("package.json", b"{}".to_vec()),
            ExtractedFile::new("src/App.jsx", b"import _ from 'lodash';\n".to_vec()),
        ];
        ProjectAnalysis {
            extraction,
            summaries: Vec::new(),
            dependencies: MergedDependencies::merge(
                vec![Dependency::declared(
                    Ecosystem::Npm,
                    "react",
                    Some("^18.2.0".into()),
                    "package.json",
                )],
                vec![Dependency::inferred(Ecosystem::Npm, "lodash", "src/App.jsx")],
            ),
        }
    }

    #[test]
    fn test_format_analysis() {
        let output = ConsoleFormatter::new(false).format_analysis(&analysis());
        assert!(output.starts_with("\u{2713} Project Analysis: crm\n"));
        assert!(output.contains("Platform:  Base44\n"));
        assert!(output.contains("Files:     2\n"));
        assert!(output.contains("\u{2514}\u{2500} javascript: 1\n"));
        assert!(output.contains("\u{2514}\u{2500} npm: 2\n"));
        assert!(output.contains("- lodash (imported in src/App.jsx)\n"));
        assert!(output.contains("- react ^18.2.0\n"));
        assert!(!output.contains("Structure:"));
    }

    #[test]
    fn test_format_empty_analysis() {
        let empty = ProjectAnalysis {
            extraction: ExtractionResult::new(Platform::Generic, "empty"),
            summaries: Vec::new(),
            dependencies: MergedDependencies::default(),
        };
        let output = ConsoleFormatter::new(true).format_analysis(&empty);
        assert!(output.contains("(none detected)"));
        assert!(output.contains("(none found)"));
    }

    #[test]
    fn test_format_export() {
        let summary = ExportSummary {
            output_dir: PathBuf::from("/tmp/out"),
            copied: 3,
            withheld: vec![".env".to_string()],
            generated: vec!["package.json".to_string(), "Dockerfile".to_string()],
            primary_language: None,
        };
        let output = ConsoleFormatter::new(false).format_export(&summary);
        assert!(output.contains("Copied:     3 file(s)\n"));
        assert!(output.contains("Generated:  package.json, Dockerfile\n"));
        assert!(output.contains("Withheld:   .env\n"));
        assert!(!output.contains("Container:"));
    }

    #[test]
    fn test_format_warnings() {
        let formatter = ConsoleFormatter::new(false);
        assert_eq!(formatter.format_warnings(&[]), "\nWarnings: 0\n");

        let warnings = vec![Warning::for_path(
            WarningKind::FileSkipped,
            "secret.key",
            "Permission denied",
        )];
        let output = formatter.format_warnings(&warnings);
        assert!(output.contains("Warnings: 1\n"));
        assert!(output.contains("  - [file_skipped] secret.key: Permission denied\n"));
    }
}
