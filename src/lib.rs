//! liberator - move projects off proprietary hosting platforms
//!
//! A source tree exported from a hosting platform (Base44, Replit, or any
//! plain directory) goes through four stages:
//!
//! 1. **Detection**: marker files select a [`platform::PlatformExtractor`]
//! 2. **Extraction**: a bounded, parallel walk produces an
//!    [`extraction::ExtractionResult`] with files, manifests and platform metadata
//! 3. **Analysis**: [`parser`] summarizes each source file and
//!    [`dependencies`] merges declared and imported packages per ecosystem
//! 4. **Export**: [`exporter`] writes a portable tree with normalized
//!    manifests, a Dockerfile, README and `.env.example`
//!
//! [`pipeline::Pipeline`] wires the stages together.
//!
//! # Example
//!
//! ```no_run
//! use liberator::config::LiberatorConfig;
//! use liberator::pipeline::{Pipeline, RunRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(LiberatorConfig::default())?;
//! let outcome = pipeline.run(&RunRequest::export_to("./my-repl", "./portable"))?;
//!
//! for (ecosystem, deps) in outcome.analysis.dependencies.iter() {
//!     println!("{}: {}", ecosystem, deps.len());
//! }
//! println!("{} warning(s)", outcome.analysis.warnings().len());
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is executed, compiled or fetched; only local files are read.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dependencies;
pub mod ecosystem;
pub mod error;
pub mod exporter;
pub mod extraction;
pub mod fs;
pub mod languages;
pub mod parser;
pub mod pipeline;
pub mod platform;
pub mod report;
pub mod util;

pub use config::{ConfigError, LiberatorConfig};
pub use dependencies::{Dependency, MergedDependencies, Provenance};
pub use ecosystem::Ecosystem;
pub use error::{LiberatorError, Result};
pub use exporter::{ExportOptions, ExportSummary, PortableExporter};
pub use extraction::{ExtractedFile, ExtractionResult, Platform, Warning, WarningKind};
pub use parser::CodeStructuralSummary;
pub use pipeline::{Pipeline, ProjectAnalysis, RunOutcome, RunRequest};
pub use platform::{PlatformDetector, PlatformExtractor};
pub use report::AnalysisReport;
pub use util::{init_from_env, init_logging, CancellationToken, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
