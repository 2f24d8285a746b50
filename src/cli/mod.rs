pub mod commands;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ExportArgs, ExtractArgs, PlatformArg};
pub use output::ConsoleFormatter;
