//! Portable project output
//!
//! Export happens in two steps. [`PortableExporter::plan`] renders every output
//! file into an ordered map of relative path to bytes, and
//! [`PortableExporter::export`] writes that map below the output root. Both are
//! deterministic, so exporting the same analysis twice yields identical trees.

mod compose;
mod dockerfile;
mod env;
pub mod manifests;
mod readme;

pub use dockerfile::{BuildStage, ContainerPlan, RuntimeStage};
pub use env::{collect_env_keys, dotenv_keys, is_dotenv_secret};
pub use readme::ReadmeContext;

use crate::dependencies::MergedDependencies;
use crate::ecosystem::Ecosystem;
use crate::error::{LiberatorError, Result};
use crate::extraction::ExtractionResult;
use crate::fs::FileSystem;
use crate::languages::{Language, LanguageRegistry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Generated files that displace a source file of the same name; the source
/// copy is kept next to them under an `.original` name.
const DISPLACED: &[&str] = &["README.md", "Dockerfile", "docker-compose.yml"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Also write `docker-compose.yml`
    pub compose: bool,
}

/// Rendered output tree, not yet written
#[derive(Debug, Clone, Default)]
pub struct ExportPlan {
    pub files: BTreeMap<String, Vec<u8>>,
    /// Source files carried over unchanged
    pub copied: usize,
    /// Dotenv files left out of the output
    pub withheld: Vec<String>,
    pub generated: Vec<String>,
    pub primary_language: Option<Language>,
}

impl ExportPlan {
    fn keep_original(&mut self, name: &str) {
        if let Some(original) = self.files.remove(name) {
            self.files.insert(original_name(name), original);
        }
    }

    fn add_generated(&mut self, name: &str, content: String) {
        if DISPLACED.contains(&name) {
            self.keep_original(name);
        }
        self.files.insert(name.to_string(), content.into_bytes());
        self.generated.push(name.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub copied: usize,
    pub withheld: Vec<String>,
    pub generated: Vec<String>,
    pub primary_language: Option<Language>,
}

/// `README.md` → `README.original.md`, `Dockerfile` → `Dockerfile.original`,
/// `package.json` → `package.original.json`
fn original_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.original.{}", stem, ext),
        _ => format!("{}.original", name),
    }
}

pub struct PortableExporter {
    languages: LanguageRegistry,
}

impl PortableExporter {
    pub fn new(languages: LanguageRegistry) -> Self {
        Self { languages }
    }

    pub fn with_defaults() -> Self {
        Self::new(LanguageRegistry::with_defaults())
    }

    /// Language the container is built for: the one the platform declared if
    /// it is packageable, else the packageable language with the most files.
    pub fn primary_language(
        &self,
        result: &ExtractionResult,
        counts: &BTreeMap<Language, usize>,
    ) -> Option<Language> {
        let declared = result
            .metadata_str("language")
            .and_then(Language::from_platform_name)
            .filter(|l| self.languages.get(*l).is_some());
        if declared.is_some() {
            return declared;
        }

        counts
            .iter()
            .filter(|(language, _)| self.languages.get(**language).is_some())
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(language, _)| *language)
    }

    fn cargo_package_name(result: &ExtractionResult) -> Option<String> {
        let manifest = result.root_manifest(Ecosystem::Cargo)?;
        let doc: toml::Table = toml::from_str(&manifest.content).ok()?;
        doc.get("package")?
            .get("name")?
            .as_str()
            .map(str::to_string)
    }

    fn container_plan(
        &self,
        result: &ExtractionResult,
        language: Option<Language>,
        files: &BTreeMap<String, Vec<u8>>,
    ) -> ContainerPlan {
        let declared_run = result
            .metadata_str("run_command")
            .map(|run| vec!["sh".to_string(), "-c".to_string(), run.to_string()]);

        let Some((language, definition)) =
            language.and_then(|l| self.languages.get(l).map(|d| (l, d)))
        else {
            return ContainerPlan::fallback(declared_run.unwrap_or_default());
        };

        let command = declared_run.unwrap_or_else(|| {
            let paths = result.file_paths();
            let name = match language {
                Language::Rust => Self::cargo_package_name(result)
                    .unwrap_or_else(|| manifests::package_name(&result.project_name)),
                _ => result.project_name.clone(),
            };
            definition.default_run_command(&paths, &name)
        });

        ContainerPlan::from_template(
            language,
            definition.build_template(),
            |m| files.contains_key(m),
            command,
        )
    }

    /// Render the complete output tree
    pub fn plan(
        &self,
        result: &ExtractionResult,
        deps: &MergedDependencies,
        options: &ExportOptions,
    ) -> Result<ExportPlan> {
        let mut plan = ExportPlan::default();

        for file in &result.files {
            if is_dotenv_secret(file.file_name()) {
                debug!(path = %file.path, "Withholding dotenv file");
                plan.withheld.push(file.path.clone());
                continue;
            }
            plan.files.insert(file.path.clone(), file.content.clone());
            plan.copied += 1;
        }

        for ecosystem in deps.ecosystems() {
            if let Some((name, content)) = manifests::render_manifest(ecosystem, result, deps)? {
                let unmergeable = plan
                    .files
                    .get(name)
                    .is_some_and(|source| !manifests::merges_into_source(name, source));
                if unmergeable {
                    warn!(
                        file = name,
                        "Source manifest could not be parsed, keeping it as {}",
                        original_name(name)
                    );
                    plan.keep_original(name);
                }
                plan.add_generated(name, content);
            }
        }

        let counts = result.language_counts();
        let language = self.primary_language(result, &counts);
        plan.primary_language = language;
        let container = self.container_plan(result, language, &plan.files);
        plan.add_generated("Dockerfile", container.to_string());

        let env_keys = collect_env_keys(result);
        if options.compose {
            let service = manifests::package_name(&result.project_name);
            let compose = compose::render_compose(&service, container.port, &env_keys)?;
            plan.add_generated("docker-compose.yml", compose);
        }

        let language_names: BTreeMap<String, usize> = counts
            .iter()
            .map(|(language, count)| (language.as_str().to_string(), *count))
            .collect();
        let readme = readme::render_readme(&ReadmeContext {
            project_name: &result.project_name,
            platform: result.platform,
            file_count: result.files.len(),
            languages: &language_names,
            dependencies: deps,
            run_command: (!container.command.is_empty()).then(|| {
                match container.command.as_slice() {
                    [sh, flag, run] if sh == "sh" && flag == "-c" => run.clone(),
                    command => command.join(" "),
                }
            }),
            port: container.port,
            warning_count: result.warnings.len(),
        });
        plan.add_generated("README.md", readme);

        plan.add_generated(
            ".env.example",
            env::render_env_example(&result.project_name, &env_keys),
        );

        if !result.has_file(".gitignore") {
            plan.add_generated(".gitignore", env::render_gitignore());
        }

        Ok(plan)
    }

    /// Render and write the output tree below `output_root`
    pub fn export(
        &self,
        fs: &dyn FileSystem,
        result: &ExtractionResult,
        deps: &MergedDependencies,
        output_root: &Path,
        options: &ExportOptions,
    ) -> Result<ExportSummary> {
        let plan = self.plan(result, deps, options)?;

        fs.create_dir_all(output_root)
            .map_err(|e| LiberatorError::output_write(output_root, format!("{:#}", e)))?;

        for (relative, content) in &plan.files {
            let target = output_root.join(relative);
            if let Some(parent) = target.parent() {
                fs.create_dir_all(parent)
                    .map_err(|e| LiberatorError::output_write(parent, format!("{:#}", e)))?;
            }
            fs.write(&target, content)
                .map_err(|e| LiberatorError::output_write(&target, format!("{:#}", e)))?;
        }

        info!(
            output = %output_root.display(),
            copied = plan.copied,
            generated = plan.generated.len(),
            withheld = plan.withheld.len(),
            "Export completed"
        );

        Ok(ExportSummary {
            output_dir: output_root.to_path_buf(),
            copied: plan.copied,
            withheld: plan.withheld,
            generated: plan.generated,
            primary_language: plan.primary_language,
        })
    }
}

impl Default for PortableExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::Dependency;
    use crate::extraction::{ExtractedFile, ManifestDeclaration, Platform};
    use crate::fs::MockFileSystem;

    fn result_with(platform: Platform, files: &[(&str, &str)]) -> ExtractionResult {
        let mut result = ExtractionResult::new(platform, "demo");
        let mut sorted = files.to_vec();
        sorted.sort();
        for (path, content) in sorted {
            result
                .files
                .push(ExtractedFile::new(path, content.as_bytes().to_vec()));
            let name = path.rsplit('/').next().unwrap_or(path);
            if let Some(eco) = crate::dependencies::ecosystem_for_manifest(name) {
                result.manifests.entry(eco).or_default().push(ManifestDeclaration {
                    path: path.to_string(),
                    file_name: name.to_string(),
                    content: content.to_string(),
                });
            }
        }
        result
    }

    fn text(plan: &ExportPlan, path: &str) -> String {
        String::from_utf8(plan.files[path].clone()).unwrap()
    }

    #[test]
    fn test_python_project_plan() {
        let result = result_with(
            Platform::Generic,
            &[
                ("main.py", "import os\nfrom flask import Flask\n"),
                ("requirements.txt", "flask==2.0\n"),
                (".env", "SECRET_KEY=hunter2\n"),
            ],
        );
        let deps = MergedDependencies::merge(
            vec![Dependency::declared(Ecosystem::Pip, "flask", Some("==2.0".into()), "requirements.txt")],
            vec![],
        );

        let plan = PortableExporter::with_defaults()
            .plan(&result, &deps, &ExportOptions::default())
            .unwrap();

        assert_eq!(text(&plan, "requirements.txt"), "flask==2.0\n");
        assert_eq!(plan.primary_language, Some(Language::Python));
        let dockerfile = text(&plan, "Dockerfile");
        assert!(dockerfile.starts_with("# python application\nFROM python:3.11-slim\n"));
        assert!(dockerfile.contains("CMD [\"python\",\"main.py\"]"));
        assert!(!plan.files.contains_key(".env"));
        assert_eq!(plan.withheld, vec![".env"]);
        assert_eq!(text(&plan, ".env.example"), "# Environment variables for demo\nSECRET_KEY=\n");
        assert!(!plan.files.contains_key("docker-compose.yml"));
        assert!(plan.files.contains_key(".gitignore"));
        assert!(plan.files.values().all(|c| !String::from_utf8_lossy(c).contains("hunter2")));
    }

    #[test]
    fn test_replit_run_command_wins() {
        let mut result = result_with(
            Platform::Replit,
            &[("main.py", "print(1)\n"), ("package.json", "{\"name\":\"x\"}")],
        );
        result.set_metadata("run_command", "python3 main.py --port 8080");
        result.set_metadata("language", "python");

        let plan = PortableExporter::with_defaults()
            .plan(&result, &MergedDependencies::default(), &ExportOptions { compose: true })
            .unwrap();

        assert!(text(&plan, "Dockerfile")
            .contains("CMD [\"sh\",\"-c\",\"python3 main.py --port 8080\"]"));
        assert!(text(&plan, "README.md").contains("- Run command: `python3 main.py --port 8080`"));
        assert!(text(&plan, "docker-compose.yml").contains("8000:8000"));
    }

    #[test]
    fn test_source_readme_and_dockerfile_preserved() {
        let result = result_with(
            Platform::Generic,
            &[
                ("README.md", "# Original\n"),
                ("Dockerfile", "FROM scratch\n"),
                (".gitignore", "dist/\n"),
                ("index.js", "require('express')\n"),
            ],
        );
        let plan = PortableExporter::with_defaults()
            .plan(&result, &MergedDependencies::default(), &ExportOptions::default())
            .unwrap();

        assert_eq!(text(&plan, "README.original.md"), "# Original\n");
        assert_eq!(text(&plan, "Dockerfile.original"), "FROM scratch\n");
        assert!(text(&plan, "README.md").starts_with("# demo\n"));
        assert_eq!(text(&plan, ".gitignore"), "dist/\n");
        assert!(!plan.generated.contains(&".gitignore".to_string()));
    }

    #[test]
    fn test_unparsable_source_manifest_preserved() {
        let broken = "{\n  \"name\": \"crm\",\n  \"dependencies\": {\n";
        let result = result_with(
            Platform::Generic,
            &[("package.json", broken), ("index.js", "require('express')\n")],
        );
        let deps = MergedDependencies::merge(
            vec![],
            vec![Dependency::declared(Ecosystem::Npm, "express", None, "index.js")],
        );

        let plan = PortableExporter::with_defaults()
            .plan(&result, &deps, &ExportOptions::default())
            .unwrap();

        assert_eq!(text(&plan, "package.original.json"), broken);
        let generated: serde_json::Value =
            serde_json::from_str(&text(&plan, "package.json")).unwrap();
        assert_eq!(generated["dependencies"]["express"], "*");
    }

    #[test]
    fn test_parsable_source_manifest_not_duplicated() {
        let result = result_with(
            Platform::Generic,
            &[("package.json", "{\"name\":\"crm\"}"), ("index.js", "require('express')\n")],
        );
        let deps = MergedDependencies::merge(
            vec![],
            vec![Dependency::declared(Ecosystem::Npm, "express", None, "index.js")],
        );

        let plan = PortableExporter::with_defaults()
            .plan(&result, &deps, &ExportOptions::default())
            .unwrap();

        assert!(!plan.files.contains_key("package.original.json"));
        assert!(text(&plan, "package.json").contains("\"name\": \"crm\""));
    }

    #[test]
    fn test_primary_language_by_file_count() {
        let result = result_with(
            Platform::Generic,
            &[("a.go", ""), ("b.go", ""), ("c.py", ""), ("build.sh", "")],
        );
        let exporter = PortableExporter::with_defaults();
        let counts = result.language_counts();
        assert_eq!(exporter.primary_language(&result, &counts), Some(Language::Go));
    }

    #[test]
    fn test_unpackaged_language_uses_fallback_image() {
        let result = result_with(Platform::Generic, &[("app.rb", "puts 1\n")]);
        let plan = PortableExporter::with_defaults()
            .plan(&result, &MergedDependencies::default(), &ExportOptions::default())
            .unwrap();
        assert_eq!(plan.primary_language, None);
        assert!(text(&plan, "Dockerfile").starts_with("FROM alpine:3.19\n"));
    }

    #[test]
    fn test_export_writes_plan_idempotently() {
        let result = result_with(
            Platform::Generic,
            &[("src/index.ts", "import { z } from 'zod';\n")],
        );
        let deps = MergedDependencies::merge(
            vec![],
            vec![Dependency::inferred(Ecosystem::Npm, "zod", "src/index.ts")],
        );
        let fs = MockFileSystem::new();
        let out = Path::new("/out");
        let exporter = PortableExporter::with_defaults();

        let first = exporter
            .export(&fs, &result, &deps, out, &ExportOptions::default())
            .unwrap();
        let snapshot: Vec<Option<String>> = first
            .generated
            .iter()
            .map(|name| fs.contents(out.join(name)))
            .collect();
        exporter
            .export(&fs, &result, &deps, out, &ExportOptions::default())
            .unwrap();
        let again: Vec<Option<String>> = first
            .generated
            .iter()
            .map(|name| fs.contents(out.join(name)))
            .collect();

        assert_eq!(snapshot, again);
        assert_eq!(first.copied, 1);
        assert!(fs.contents("/out/src/index.ts").is_some());
        assert!(fs.contents("/out/package.json").unwrap().contains("\"zod\": \"*\""));
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let result = result_with(Platform::Generic, &[("main.py", "print(1)\n")]);
        let fs = MockFileSystem::new();
        fs.add_file("/out", "not a directory");

        let err = PortableExporter::with_defaults()
            .export(
                &fs,
                &result,
                &MergedDependencies::default(),
                Path::new("/out"),
                &ExportOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LiberatorError::OutputWriteFailure { .. }));
    }

    #[test]
    fn test_original_name() {
        assert_eq!(original_name("README.md"), "README.original.md");
        assert_eq!(original_name("Dockerfile"), "Dockerfile.original");
        assert_eq!(original_name("docker-compose.yml"), "docker-compose.original.yml");
    }
}
