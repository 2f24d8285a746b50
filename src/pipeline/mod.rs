//! One end-to-end run: detect, extract, parse, analyze and optionally export

mod context;
mod orchestrator;

pub use context::{ProjectAnalysis, RunOutcome, RunRequest};
pub use orchestrator::Pipeline;
