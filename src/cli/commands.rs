use crate::extraction::Platform;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Extract projects from hosting platforms into portable, normalized trees
#[derive(Parser, Debug)]
#[command(
    name = "liberator",
    about = "Extract projects from hosting platforms into portable, normalized trees",
    version,
    long_about = "liberator detects which hosting platform a project was exported from, \
                  extracts its files and configuration, resolves declared and imported \
                  dependencies, and writes a portable tree with normalized manifests, \
                  a Dockerfile and an overview README. It only reads local files."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only print errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Extract a project into a portable output tree",
        long_about = "Detects the source platform, extracts files and configuration, analyzes \
                      dependencies and writes the normalized project to the output directory.\n\n\
                      Examples:\n  \
                      liberator extract ./my-repl -o ./portable\n  \
                      liberator extract ./export --platform base44 -o ./out --analyze"
    )]
    Extract(ExtractArgs),

    #[command(
        about = "Report languages and dependencies of a project",
        long_about = "Extracts and analyzes a project without writing an output tree.\n\n\
                      Examples:\n  \
                      liberator analyze ./my-repl\n  \
                      liberator analyze ./my-repl --output report.json"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Normalize an already extracted tree",
        long_about = "Writes normalized manifests, a Dockerfile, README and .env.example for \
                      a project that is already on local disk.\n\n\
                      Examples:\n  \
                      liberator export ./extracted -o ./portable --docker"
    )]
    Export(ExportArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(value_name = "SOURCE", help = "Path to the exported project")]
    pub source: PathBuf,

    #[arg(short = 'o', long, value_name = "DIR", help = "Output directory")]
    pub output: PathBuf,

    #[arg(
        short = 'p',
        long,
        value_enum,
        default_value = "auto",
        help = "Source platform (detected from marker files by default)"
    )]
    pub platform: PlatformArg,

    #[arg(long, help = "Also print the dependency and language analysis")]
    pub analyze: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "SOURCE", help = "Path to the project")]
    pub source: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Also write the report as JSON to this file"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_enum,
        default_value = "auto",
        help = "Source platform (detected from marker files by default)"
    )]
    pub platform: PlatformArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    #[arg(value_name = "SOURCE", help = "Path to the extracted project")]
    pub source: PathBuf,

    #[arg(short = 'o', long, value_name = "DIR", help = "Output directory")]
    pub output: PathBuf,

    #[arg(long, help = "Also write docker-compose.yml")]
    pub docker: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArg {
    Auto,
    Base44,
    Replit,
    Generic,
}

impl From<PlatformArg> for Option<Platform> {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Auto => None,
            PlatformArg::Base44 => Some(Platform::Base44),
            PlatformArg::Replit => Some(Platform::Replit),
            PlatformArg::Generic => Some(Platform::Generic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_extract_defaults() {
        let args = CliArgs::parse_from(["liberator", "extract", "./src", "-o", "./out"]);
        match args.command {
            Commands::Extract(extract) => {
                assert_eq!(extract.source, PathBuf::from("./src"));
                assert_eq!(extract.output, PathBuf::from("./out"));
                assert_eq!(extract.platform, PlatformArg::Auto);
                assert!(!extract.analyze);
            }
            _ => panic!("Expected Extract command"),
        }
        assert!(!args.verbose);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_extract_with_platform_and_analyze() {
        let args = CliArgs::parse_from([
            "liberator",
            "extract",
            "./src",
            "--output",
            "./out",
            "--platform",
            "replit",
            "--analyze",
            "--verbose",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Extract(extract) => {
                assert_eq!(extract.platform, PlatformArg::Replit);
                assert!(extract.analyze);
                assert_eq!(Option::<Platform>::from(extract.platform), Some(Platform::Replit));
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_extract_requires_output() {
        assert!(CliArgs::try_parse_from(["liberator", "extract", "./src"]).is_err());
    }

    #[test]
    fn test_analyze_with_json_output() {
        let args = CliArgs::parse_from(["liberator", "analyze", "./src", "--output", "a.json"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.output, Some(PathBuf::from("a.json")));
                assert_eq!(Option::<Platform>::from(analyze.platform), None);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_export_docker_flag() {
        let args = CliArgs::parse_from(["liberator", "export", "./src", "-o", "./out", "--docker"]);
        match args.command {
            Commands::Export(export) => assert!(export.docker),
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let result = CliArgs::try_parse_from([
            "liberator", "extract", "./src", "-o", "./out", "--platform", "heroku",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = CliArgs::try_parse_from(["liberator", "-v", "-q", "analyze", "./src"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["liberator", "analyze", "./src", "--log-level", "trace", "-q"]);
        assert_eq!(args.log_level.as_deref(), Some("trace"));
        assert!(args.quiet);
    }
}
