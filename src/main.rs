use liberator::cli::commands::{AnalyzeArgs, CliArgs, Commands, ExportArgs, ExtractArgs};
use liberator::cli::output::ConsoleFormatter;
use liberator::config::LiberatorConfig;
use liberator::exporter::ExportOptions;
use liberator::pipeline::{Pipeline, RunOutcome, RunRequest};
use liberator::report::AnalysisReport;
use liberator::util::logging::{self, LoggingConfig};
use liberator::{NAME, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::process;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Extract(extract_args) => handle_extract(extract_args, args.quiet, args.verbose),
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, args.quiet, args.verbose),
        Commands::Export(export_args) => handle_export(export_args, args.quiet, args.verbose),
    };

    process::exit(exit_code);
}

/// `--log-level`, then `-v` / `-q`, then `LIBERATOR_LOG_LEVEL`, then info
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level) = &args.log_level {
        config.level = logging::parse_level(level);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    logging::init_logging(config);
}

fn build_pipeline() -> Result<Pipeline> {
    let config = LiberatorConfig::from_env().context("Invalid LIBERATOR_* environment variable")?;
    debug!("{}", config);
    Pipeline::new(config).context("Configuration error")
}

fn print_outcome(outcome: &RunOutcome, show_analysis: bool, verbose: bool) {
    let formatter = ConsoleFormatter::new(verbose);
    if show_analysis {
        print!("{}", formatter.format_analysis(&outcome.analysis));
        println!();
    }
    if let Some(summary) = &outcome.export {
        print!("{}", formatter.format_export(summary));
    }
    print!("{}", formatter.format_warnings(outcome.analysis.warnings()));
}

fn run_extract(args: &ExtractArgs) -> Result<RunOutcome> {
    let pipeline = build_pipeline()?;
    let request = RunRequest::export_to(&args.source, &args.output)
        .with_platform(args.platform.into())
        .with_export_options(ExportOptions { compose: true });
    pipeline
        .run(&request)
        .with_context(|| format!("Failed to extract {}", args.source.display()))
}

fn handle_extract(args: &ExtractArgs, quiet: bool, verbose: bool) -> i32 {
    info!("Extracting {}", args.source.display());
    match run_extract(args) {
        Ok(outcome) => {
            if !quiet {
                print_outcome(&outcome, args.analyze, verbose);
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<RunOutcome> {
    let pipeline = build_pipeline()?;
    let request = RunRequest::analyze(&args.source).with_platform(args.platform.into());
    let outcome = pipeline
        .run(&request)
        .with_context(|| format!("Failed to analyze {}", args.source.display()))?;

    if let Some(path) = &args.output {
        let json = AnalysisReport::from_analysis(&outcome.analysis).to_json()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(outcome)
}

fn handle_analyze(args: &AnalyzeArgs, quiet: bool, verbose: bool) -> i32 {
    match run_analyze(args) {
        Ok(outcome) => {
            if !quiet {
                print_outcome(&outcome, true, verbose);
                if let Some(path) = &args.output {
                    println!("\nReport: {}", path.display());
                }
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn run_export(args: &ExportArgs) -> Result<RunOutcome> {
    let pipeline = build_pipeline()?;
    let request = RunRequest::export_to(&args.source, &args.output)
        .with_export_options(ExportOptions {
            compose: args.docker,
        });
    pipeline
        .run(&request)
        .with_context(|| format!("Failed to export {}", args.source.display()))
}

fn handle_export(args: &ExportArgs, quiet: bool, verbose: bool) -> i32 {
    match run_export(args) {
        Ok(outcome) => {
            if !quiet {
                print_outcome(&outcome, false, verbose);
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}
