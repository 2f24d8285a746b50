use super::context::{ProjectAnalysis, RunOutcome, RunRequest};
use crate::config::LiberatorConfig;
use crate::dependencies::DependencyAnalyzer;
use crate::error::{LiberatorError, Result};
use crate::exporter::PortableExporter;
use crate::extraction::{Warning, WarningKind};
use crate::fs::{FileSystem, RealFileSystem};
use crate::parser::ParserRegistry;
use crate::platform::{ExtractContext, PlatformDetector};
use crate::util::CancellationToken;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs detection, extraction, structure parsing, dependency analysis and
/// export for one source tree.
///
/// Each run builds its own worker pool of `worker_threads` threads. The
/// cancellation token is shared by every run of this pipeline; once
/// cancelled, runs stop at the next file boundary and return what they have.
pub struct Pipeline {
    fs: Arc<dyn FileSystem>,
    config: LiberatorConfig,
    detector: PlatformDetector,
    parsers: ParserRegistry,
    analyzer: DependencyAnalyzer,
    exporter: PortableExporter,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: LiberatorConfig) -> Result<Self> {
        Self::with_fs(Arc::new(RealFileSystem::new()), config)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, config: LiberatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fs,
            config,
            detector: PlatformDetector::new(),
            parsers: ParserRegistry::with_defaults(),
            analyzer: DependencyAnalyzer::with_defaults(),
            exporter: PortableExporter::with_defaults(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &LiberatorConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Extract and analyze without writing anything
    pub fn analyze(&self, source: &Path) -> Result<ProjectAnalysis> {
        self.run(&RunRequest::analyze(source))
            .map(|outcome| outcome.analysis)
    }

    pub fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let start = Instant::now();
        let source = self.resolve_source(&request.source)?;
        info!("Starting pipeline for: {}", source.display());

        // The output directory is created before the walk so a destination
        // nested in the source can be excluded from it
        let output = match &request.output {
            Some(output) => Some(self.prepare_output(output, &source)?),
            None => None,
        };
        let pool = self.build_pool()?;

        let mut walk = self.config.walk_options();
        if let Some(output) = output.as_ref().filter(|o| o.starts_with(&source)) {
            debug!(output = %output.display(), "Excluding nested output directory from walk");
            walk.excluded_paths.push(output.clone());
        }

        let mut extraction = stage("extract", || {
            let extractor = self
                .detector
                .detect(self.fs.as_ref(), &source, request.platform);
            let ctx = ExtractContext {
                fs: self.fs.as_ref(),
                root: &source,
                walk,
                max_file_size: self.config.max_file_size,
                pool: &pool,
                cancel: &self.cancel,
            };
            extractor.extract(&ctx)
        })?;

        let structure = stage("structure", || {
            Ok(pool.install(|| self.parsers.parse_all(&extraction.files, &self.cancel)))
        })?;
        if self.cancel.is_cancelled() && !extraction.cancelled {
            extraction.cancelled = true;
            extraction.warn(Warning::new(
                WarningKind::Cancelled,
                None,
                "Run cancelled during structure analysis; summaries are partial",
            ));
        }

        let dependencies = stage("dependencies", || {
            Ok(self.analyzer.analyze(&extraction, &structure.summaries))
        })?;

        extraction.warnings.extend(structure.warnings);
        extraction.warnings.extend(dependencies.warnings);

        let analysis = ProjectAnalysis {
            extraction,
            summaries: structure.summaries,
            dependencies: dependencies.dependencies,
        };

        let export = match output {
            Some(_) if analysis.extraction.cancelled => {
                warn!("Run was cancelled; skipping export of partial result");
                None
            }
            Some(output) => Some(stage("export", || {
                self.exporter.export(
                    self.fs.as_ref(),
                    &analysis.extraction,
                    &analysis.dependencies,
                    &output,
                    &request.export,
                )
            })?),
            None => None,
        };

        info!(
            platform = %analysis.extraction.platform,
            files = analysis.extraction.files.len(),
            dependencies = analysis.dependencies.total(),
            warnings = analysis.extraction.warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline complete"
        );

        Ok(RunOutcome { analysis, export })
    }

    fn resolve_source(&self, source: &Path) -> Result<PathBuf> {
        if !self.fs.exists(source) {
            return Err(LiberatorError::source_unreadable(
                source,
                "No such file or directory",
            ));
        }
        if !self.fs.is_dir(source) {
            return Err(LiberatorError::source_unreadable(source, "Not a directory"));
        }
        self.fs
            .canonicalize(source)
            .map_err(|e| LiberatorError::source_unreadable(source, format!("{:#}", e)))
    }

    fn prepare_output(&self, output: &Path, source: &Path) -> Result<PathBuf> {
        self.fs
            .create_dir_all(output)
            .map_err(|e| LiberatorError::output_write(output, format!("{:#}", e)))?;
        let output = self
            .fs
            .canonicalize(output)
            .map_err(|e| LiberatorError::output_write(output, format!("{:#}", e)))?;

        if output == source {
            return Err(LiberatorError::output_write(
                output,
                "Output directory must differ from the source directory",
            ));
        }
        Ok(output)
    }

    fn build_pool(&self) -> Result<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .thread_name(|i| format!("liberator-worker-{}", i))
            .build()
            .map_err(|e| LiberatorError::WorkerPool(e.to_string()))
    }
}

fn stage<T>(name: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    info!("Stage: {}", name);
    let start = Instant::now();
    let value = run()?;
    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Stage {} complete", name
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::Ecosystem;
    use crate::exporter::ExportOptions;
    use crate::extraction::Platform;
    use crate::fs::MockFileSystem;

    fn config() -> LiberatorConfig {
        LiberatorConfig {
            worker_threads: 2,
            ..LiberatorConfig::builtin()
        }
    }

    fn pipeline(fs: &Arc<MockFileSystem>) -> Pipeline {
        Pipeline::with_fs(fs.clone(), config()).unwrap()
    }

    fn replit_tree() -> Arc<MockFileSystem> {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/mock/.replit", "run = \"python main.py\"\nlanguage = \"python3\"\n");
        fs.add_file("/mock/main.py", "import os\nimport flask\nimport requests\n");
        fs.add_file("/mock/requirements.txt", "flask==2.0\n");
        fs
    }

    #[test]
    fn test_analyze_replit_project() {
        let fs = replit_tree();
        let analysis = pipeline(&fs).analyze(Path::new("/mock")).unwrap();

        assert_eq!(analysis.extraction.platform, Platform::Replit);
        let flask = analysis.dependencies.find(Ecosystem::Pip, "flask").unwrap();
        assert_eq!(flask.version.as_deref(), Some("==2.0"));
        assert!(analysis.dependencies.find(Ecosystem::Pip, "requests").is_some());
        assert!(analysis.dependencies.find(Ecosystem::Pip, "os").is_none());
        assert_eq!(analysis.summaries.len(), 1);
        assert!(analysis.warnings().is_empty());
    }

    #[test]
    fn test_platform_override() {
        let fs = replit_tree();
        let request = RunRequest::analyze("/mock").with_platform(Some(Platform::Generic));
        let outcome = pipeline(&fs).run(&request).unwrap();
        assert_eq!(outcome.analysis.extraction.platform, Platform::Generic);
        assert!(outcome.export.is_none());
    }

    #[test]
    fn test_run_with_export() {
        let fs = replit_tree();
        let request = RunRequest::export_to("/mock", "/out")
            .with_export_options(ExportOptions { compose: true });
        let outcome = pipeline(&fs).run(&request).unwrap();

        let summary = outcome.export.unwrap();
        assert_eq!(summary.output_dir, PathBuf::from("/out"));
        assert!(fs.contents("/out/main.py").is_some());
        assert!(fs.contents("/out/Dockerfile").unwrap().contains("python main.py"));
        assert!(fs.contents("/out/docker-compose.yml").is_some());
        assert!(fs.contents("/out/requirements.txt").unwrap().contains("flask==2.0"));
    }

    #[test]
    fn test_nested_output_is_not_walked() {
        let fs = replit_tree();
        fs.add_file("/mock/dist/stale.txt", "old export\n");
        let request = RunRequest::export_to("/mock", "/mock/dist");
        let outcome = pipeline(&fs).run(&request).unwrap();

        assert!(!outcome
            .analysis
            .extraction
            .has_file("dist/stale.txt"));
        assert!(fs.contents("/mock/dist/dist/stale.txt").is_none());
    }

    #[test]
    fn test_unreadable_file_is_a_warning() {
        let fs = replit_tree();
        fs.add_unreadable("/mock/secret.key");
        let request = RunRequest::export_to("/mock", "/out");
        let outcome = pipeline(&fs).run(&request).unwrap();

        let warnings = outcome.analysis.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::FileSkipped);
        assert!(fs.contents("/out/secret.key").is_none());
        assert!(fs
            .contents("/out/README.md")
            .unwrap()
            .contains("- Warnings: 1\n"));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let fs = Arc::new(MockFileSystem::new());
        let err = pipeline(&fs).analyze(Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, LiberatorError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_file_source_is_fatal() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/mock/app.py", "print(1)\n");
        let err = pipeline(&fs).analyze(Path::new("/mock/app.py")).unwrap_err();
        assert!(matches!(err, LiberatorError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_output_equal_to_source_is_rejected() {
        let fs = replit_tree();
        let err = pipeline(&fs)
            .run(&RunRequest::export_to("/mock", "/mock"))
            .unwrap_err();
        assert!(matches!(err, LiberatorError::OutputWriteFailure { .. }));
    }

    #[test]
    fn test_uncreatable_output_is_fatal() {
        let fs = replit_tree();
        fs.add_file("/taken", "a file, not a directory");
        let err = pipeline(&fs)
            .run(&RunRequest::export_to("/mock", "/taken"))
            .unwrap_err();
        assert!(matches!(err, LiberatorError::OutputWriteFailure { .. }));
    }

    #[test]
    fn test_cancelled_run_skips_export() {
        let fs = replit_tree();
        let pipeline = pipeline(&fs);
        pipeline.cancellation_token().cancel();

        let outcome = pipeline.run(&RunRequest::export_to("/mock", "/out")).unwrap();
        assert!(outcome.analysis.extraction.cancelled);
        assert!(outcome
            .analysis
            .warnings()
            .iter()
            .any(|w| w.kind == WarningKind::Cancelled));
        assert!(outcome.export.is_none());
        assert!(fs.contents("/out/Dockerfile").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let fs = Arc::new(MockFileSystem::new());
        let config = LiberatorConfig {
            worker_threads: 0,
            ..LiberatorConfig::builtin()
        };
        assert!(matches!(
            Pipeline::with_fs(fs, config),
            Err(LiberatorError::Config(_))
        ));
    }
}
