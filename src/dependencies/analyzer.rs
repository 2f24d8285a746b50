//! Resolve declared and import-inferred dependencies for an extracted tree

use super::manifests::ManifestParsers;
use super::{Dependency, MergedDependencies};
use crate::catalog;
use crate::ecosystem::Ecosystem;
use crate::extraction::{ExtractionResult, Warning, WarningKind};
use crate::languages::{detect_language_from_path, Language};
use crate::parser::CodeStructuralSummary;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Go hosts whose module paths are `host/owner/repo`
const GO_THREE_SEGMENT_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org", "golang.org"];

#[derive(Debug, Clone, Default)]
pub struct DependencyAnalysis {
    pub dependencies: MergedDependencies,
    pub warnings: Vec<Warning>,
}

/// Names that refer to the project itself and must never become dependencies
#[derive(Debug, Default)]
struct LocalNames {
    python_modules: HashSet<String>,
    rust_modules: HashSet<String>,
    go_modules: Vec<String>,
    npm_packages: HashSet<String>,
}

fn rust_mod_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)").expect("valid regex")
    })
}

impl LocalNames {
    fn from_files(result: &ExtractionResult) -> Self {
        let mut names = LocalNames::default();
        for file in &result.files {
            let path = file.path.as_str();
            match detect_language_from_path(path) {
                Some(Language::Python) => {
                    let mut segments: Vec<&str> = path.split('/').collect();
                    if let Some(last) = segments.pop() {
                        let stem = last.rsplit_once('.').map(|(s, _)| s).unwrap_or(last);
                        names.python_modules.insert(stem.to_string());
                    }
                    for dir in segments {
                        names.python_modules.insert(dir.to_string());
                    }
                }
                Some(Language::Rust) => {
                    let file_name = file.file_name();
                    if let Some(stem) = file_name.strip_suffix(".rs") {
                        names.rust_modules.insert(stem.to_string());
                    }
                    if let Some(text) = file.text() {
                        for caps in rust_mod_regex().captures_iter(text) {
                            names.rust_modules.insert(caps[1].to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        for keyword in ["crate", "self", "super", "Self"] {
            names.rust_modules.insert(keyword.to_string());
        }
        names
    }

    fn add_manifest_names(&mut self, ecosystem: Ecosystem, local: &[String]) {
        for name in local {
            match ecosystem {
                Ecosystem::Npm => {
                    self.npm_packages.insert(name.clone());
                }
                Ecosystem::Pip => {
                    self.python_modules.insert(name.replace('-', "_"));
                }
                Ecosystem::GoModules => self.go_modules.push(name.clone()),
                Ecosystem::Cargo => {
                    self.rust_modules.insert(name.replace('-', "_"));
                }
                Ecosystem::Unknown => {}
            }
        }
    }
}

fn is_relative_import(import: &str) -> bool {
    import.starts_with('.')
        || import.starts_with('/')
        || import.starts_with("@/")
        || import.starts_with("~/")
        || import.starts_with('#')
}

fn npm_package_name(import: &str) -> Option<String> {
    let import = import.strip_prefix("npm:").unwrap_or(import);
    // URL and protocol imports (`https://`, `jsr:`, `virtual:`) are not npm packages
    if import.contains(':') {
        return None;
    }
    let mut segments = import.split('/');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }
    if first.starts_with('@') {
        let second = segments.next().filter(|s| !s.is_empty())?;
        return Some(format!("{}/{}", first, second));
    }
    Some(first.to_string())
}

fn go_module_for_import(import: &str, declared: &[String]) -> String {
    if let Some(module) = declared
        .iter()
        .filter(|m| import == m.as_str() || import.starts_with(&format!("{}/", m)))
        .max_by_key(|m| m.len())
    {
        return module.clone();
    }

    let segments: Vec<&str> = import.split('/').collect();
    let take = if GO_THREE_SEGMENT_HOSTS.contains(&segments[0]) {
        match segments.get(3) {
            Some(suffix) if is_major_version_suffix(suffix) => 4,
            _ => 3,
        }
    } else {
        segments.len()
    };
    segments[..take.min(segments.len())].join("/")
}

/// `v2`, `v9`: Go modules at major version 2+ carry it as a path element
fn is_major_version_suffix(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

pub struct DependencyAnalyzer {
    parsers: ManifestParsers,
}

impl DependencyAnalyzer {
    pub fn new(parsers: ManifestParsers) -> Self {
        Self { parsers }
    }

    pub fn with_defaults() -> Self {
        Self::new(ManifestParsers::with_defaults())
    }

    pub fn analyze(
        &self,
        result: &ExtractionResult,
        summaries: &[CodeStructuralSummary],
    ) -> DependencyAnalysis {
        let mut warnings = Vec::new();
        let mut locals = LocalNames::from_files(result);
        let mut declared = Vec::new();

        for (ecosystem, manifests) in &result.manifests {
            for manifest in manifests {
                let Some(parser) = self.parsers.parser_for(&manifest.file_name) else {
                    continue;
                };
                match parser.parse(&manifest.content) {
                    Ok(contents) => {
                        locals.add_manifest_names(*ecosystem, &contents.local_names);
                        for dep in contents.dependencies {
                            declared.push(Dependency::declared(
                                *ecosystem,
                                &dep.name,
                                dep.version,
                                &manifest.path,
                            ));
                        }
                    }
                    Err(e) => {
                        warn!(manifest = %manifest.path, error = %e, "Manifest unparsable, falling back to import inference");
                        warnings.push(Warning::for_path(
                            WarningKind::ManifestUnparsable,
                            &manifest.path,
                            e.to_string(),
                        ));
                    }
                }
            }
        }

        let declared_go: Vec<String> = declared
            .iter()
            .filter(|d| d.ecosystem == Ecosystem::GoModules)
            .map(|d| d.name.clone())
            .collect();

        let mut inferred = Vec::new();
        for summary in summaries {
            let ecosystem = summary.language.ecosystem();
            if ecosystem == Ecosystem::Unknown {
                continue;
            }
            let mut seen = BTreeSet::new();
            for import in &summary.imports {
                let Some(package) =
                    self.package_for_import(summary.language, import, &locals, &declared_go)
                else {
                    continue;
                };
                if seen.insert(package.clone()) {
                    inferred.push(Dependency::inferred(ecosystem, &package, &summary.path));
                }
            }
        }

        debug!(
            declared = declared.len(),
            inferred = inferred.len(),
            "Merging dependency records"
        );
        let dependencies = MergedDependencies::merge(declared, inferred);
        info!(
            total = dependencies.total(),
            ecosystems = dependencies.ecosystems().len(),
            "Dependency analysis completed"
        );

        DependencyAnalysis {
            dependencies,
            warnings,
        }
    }

    /// External package an import refers to, or `None` for standard-library,
    /// relative and project-local imports.
    fn package_for_import(
        &self,
        language: Language,
        import: &str,
        locals: &LocalNames,
        declared_go: &[String],
    ) -> Option<String> {
        let import = import.trim();
        if import.is_empty() || is_relative_import(import) || catalog::is_stdlib(language, import) {
            return None;
        }

        match language {
            Language::Python => {
                let root = import.split('.').next()?;
                if locals.python_modules.contains(root) {
                    return None;
                }
                Some(catalog::python_package_for_import(import))
            }
            Language::JavaScript | Language::TypeScript => {
                let package = npm_package_name(import)?;
                if locals.npm_packages.contains(&package) {
                    return None;
                }
                Some(package)
            }
            Language::Go => {
                let own = locals
                    .go_modules
                    .iter()
                    .any(|m| import == m.as_str() || import.starts_with(&format!("{}/", m)));
                if own {
                    return None;
                }
                Some(go_module_for_import(import, declared_go))
            }
            Language::Rust => {
                let root = import.split("::").next()?;
                if locals.rust_modules.contains(root) {
                    return None;
                }
                Some(root.to_string())
            }
            _ => None,
        }
    }
}

impl Default for DependencyAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::Provenance;
    use crate::extraction::{ExtractedFile, ManifestDeclaration, Platform};
    use crate::parser::ParserRegistry;
    use crate::util::CancellationToken;

    fn build(files: &[(&str, &str)]) -> ExtractionResult {
        let mut result = ExtractionResult::new(Platform::Generic, "demo");
        let mut sorted: Vec<_> = files.to_vec();
        sorted.sort();
        for (path, content) in sorted {
            result
                .files
                .push(ExtractedFile::new(path, content.as_bytes().to_vec()));
            let file_name = path.rsplit('/').next().unwrap_or(path);
            if let Some(eco) = crate::dependencies::ecosystem_for_manifest(file_name) {
                result.manifests.entry(eco).or_default().push(ManifestDeclaration {
                    path: path.to_string(),
                    file_name: file_name.to_string(),
                    content: content.to_string(),
                });
            }
        }
        result
    }

    fn analyze(files: &[(&str, &str)]) -> DependencyAnalysis {
        let result = build(files);
        let summaries = ParserRegistry::with_defaults()
            .parse_all(&result.files, &CancellationToken::new())
            .summaries;
        DependencyAnalyzer::with_defaults().analyze(&result, &summaries)
    }

    #[test]
    fn test_requirements_pin_with_stdlib_imports() {
        let analysis = analyze(&[
            ("main.py", "import os\nimport sys\nfrom flask import Flask\n"),
            ("requirements.txt", "flask==2.0\n"),
        ]);
        let pip = analysis.dependencies.get(Ecosystem::Pip);
        assert_eq!(pip.len(), 1);
        assert_eq!(pip[0].name, "flask");
        assert_eq!(pip[0].version.as_deref(), Some("==2.0"));
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_declared_and_inferred_npm() {
        let analysis = analyze(&[
            ("package.json", r#"{"name":"web","dependencies":{"react":"^18.2.0"}}"#),
            (
                "src/App.jsx",
                "import React from 'react';\nimport _ from 'lodash';\nimport './App.css';\nimport fs from 'fs';\n",
            ),
        ]);
        let npm = analysis.dependencies.get(Ecosystem::Npm);
        let names: Vec<&str> = npm.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["react", "lodash"]);
        assert_eq!(npm[0].version.as_deref(), Some("^18.2.0"));
        assert_eq!(
            npm[1].provenance,
            Provenance::Inferred {
                file: "src/App.jsx".to_string()
            }
        );
        assert!(npm[1].version.is_none());
    }

    #[test]
    fn test_scoped_and_subpath_npm_imports() {
        let analysis = analyze(&[(
            "index.ts",
            "import { z } from 'zod';\nimport x from '@tanstack/react-query/devtools';\nimport y from 'date-fns/format';\nimport s from 'node:path';\nimport a from '@/lib/a';\nimport d from 'https://deno.land/x/mod.ts';\n",
        )]);
        let names: Vec<&str> = analysis
            .dependencies
            .get(Ecosystem::Npm)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["zod", "@tanstack/react-query", "date-fns"]);
    }

    #[test]
    fn test_python_local_modules_and_aliases() {
        let analysis = analyze(&[
            ("app.py", "import utils\nfrom models.user import User\nimport yaml\nfrom PIL import Image\nfrom . import helpers\n"),
            ("utils.py", ""),
            ("models/user.py", "import sqlalchemy\n"),
        ]);
        let names: Vec<&str> = analysis
            .dependencies
            .get(Ecosystem::Pip)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["PyYAML", "Pillow", "sqlalchemy"]);
    }

    #[test]
    fn test_go_module_mapping() {
        let analysis = analyze(&[
            (
                "go.mod",
                "module github.com/acme/api\n\ngo 1.21\n\nrequire github.com/gin-gonic/gin v1.9.1\n",
            ),
            (
                "main.go",
                "package main\n\nimport (\n\t\"fmt\"\n\t\"github.com/gin-gonic/gin/binding\"\n\t\"github.com/acme/api/internal/db\"\n\t\"github.com/redis/go-redis/v9\"\n\t\"gopkg.in/yaml.v3\"\n)\n",
            ),
        ]);
        let go = analysis.dependencies.get(Ecosystem::GoModules);
        let names: Vec<&str> = go.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["github.com/gin-gonic/gin", "github.com/redis/go-redis/v9", "gopkg.in/yaml.v3"]
        );
        assert_eq!(go[0].version.as_deref(), Some("v1.9.1"));
    }

    #[test]
    fn test_go_major_version_suffix_kept() {
        assert_eq!(
            go_module_for_import("github.com/redis/go-redis/v9", &[]),
            "github.com/redis/go-redis/v9"
        );
        assert_eq!(
            go_module_for_import("github.com/jackc/pgx/v5/pgxpool", &[]),
            "github.com/jackc/pgx/v5"
        );
        assert_eq!(
            go_module_for_import("github.com/spf13/cobra/vendor", &[]),
            "github.com/spf13/cobra"
        );
        assert_eq!(
            go_module_for_import("github.com/acme/tool/v", &[]),
            "github.com/acme/tool"
        );
    }

    #[test]
    fn test_rust_local_crates_excluded() {
        let analysis = analyze(&[
            (
                "Cargo.toml",
                "[package]\nname = \"my-tool\"\n\n[dependencies]\nserde = \"1\"\n",
            ),
            (
                "src/main.rs",
                "mod config;\nuse std::fs;\nuse crate::config::Config;\nuse my_tool::run;\nuse serde::Deserialize;\nuse clap::Parser;\nuse config::Loader;\n",
            ),
            ("src/config.rs", "pub struct Config;\n"),
        ]);
        let names: Vec<&str> = analysis
            .dependencies
            .get(Ecosystem::Cargo)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["serde", "clap"]);
    }

    #[test]
    fn test_unparsable_manifest_degrades_to_inference() {
        let analysis = analyze(&[
            ("package.json", "{ \"dependencies\": "),
            ("index.js", "const express = require('express');\n"),
        ]);
        assert_eq!(analysis.warnings.len(), 1);
        assert_eq!(analysis.warnings[0].kind, WarningKind::ManifestUnparsable);
        let npm = analysis.dependencies.get(Ecosystem::Npm);
        assert_eq!(npm.len(), 1);
        assert_eq!(npm[0].name, "express");
    }

    #[test]
    fn test_stdlib_never_inferred() {
        for language in [Language::Python, Language::JavaScript, Language::Rust, Language::Go] {
            let analyzer = DependencyAnalyzer::with_defaults();
            let locals = LocalNames::default();
            for module in catalog::stdlib_modules(language) {
                assert!(
                    analyzer
                        .package_for_import(language, module, &locals, &[])
                        .is_none(),
                    "{} {} was inferred",
                    language,
                    module
                );
            }
        }
    }

    #[test]
    fn test_unknown_language_imports_ignored() {
        let analysis = analyze(&[("app.rb", "require 'sinatra'\n")]);
        assert!(analysis.dependencies.is_empty());
    }
}
