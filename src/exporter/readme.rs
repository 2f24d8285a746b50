use crate::dependencies::{MergedDependencies, Provenance};
use crate::extraction::Platform;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Facts summarized in the generated README
pub struct ReadmeContext<'a> {
    pub project_name: &'a str,
    pub platform: Platform,
    pub file_count: usize,
    pub languages: &'a BTreeMap<String, usize>,
    pub dependencies: &'a MergedDependencies,
    pub run_command: Option<String>,
    pub port: u16,
    pub warning_count: usize,
}

pub fn render_readme(ctx: &ReadmeContext<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_readme(&mut out, ctx);
    out
}

fn write_readme(out: &mut String, ctx: &ReadmeContext<'_>) -> std::fmt::Result {
    writeln!(out, "# {}", ctx.project_name)?;
    writeln!(out)?;
    writeln!(
        out,
        "Exported from {} into a portable project layout.",
        ctx.platform.display_name()
    )?;
    writeln!(out)?;

    writeln!(out, "## Overview")?;
    writeln!(out)?;
    writeln!(out, "- Source platform: {}", ctx.platform.display_name())?;
    writeln!(out, "- Files: {}", ctx.file_count)?;
    if let Some(run) = &ctx.run_command {
        writeln!(out, "- Run command: `{}`", run)?;
    }
    writeln!(out, "- Warnings: {}", ctx.warning_count)?;
    writeln!(out)?;

    if !ctx.languages.is_empty() {
        writeln!(out, "## Languages")?;
        writeln!(out)?;
        writeln!(out, "| Language | Files |")?;
        writeln!(out, "|----------|-------|")?;
        for (language, count) in ctx.languages {
            writeln!(out, "| {} | {} |", language, count)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Dependencies")?;
    writeln!(out)?;
    if ctx.dependencies.is_empty() {
        writeln!(out, "No third-party dependencies were found.")?;
        writeln!(out)?;
    }
    for (ecosystem, deps) in ctx.dependencies.iter() {
        writeln!(out, "### {} ({})", ecosystem.display_name(), deps.len())?;
        writeln!(out)?;
        for dep in ctx.dependencies.sorted_by_name(ecosystem) {
            match (&dep.version, &dep.provenance) {
                (Some(version), _) => writeln!(out, "- {} `{}`", dep.name, version)?,
                (None, Provenance::Inferred { file }) => {
                    writeln!(out, "- {} (imported in `{}`)", dep.name, file)?
                }
                (None, Provenance::Declared { .. }) => writeln!(out, "- {}", dep.name)?,
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "## Running")?;
    writeln!(out)?;
    writeln!(out, "```bash")?;
    writeln!(out, "docker build -t {} .", ctx.project_name.to_lowercase())?;
    writeln!(
        out,
        "docker run --env-file .env -p {}:{} {}",
        ctx.port,
        ctx.port,
        ctx.project_name.to_lowercase()
    )?;
    writeln!(out, "```")?;
    writeln!(out)?;
    writeln!(
        out,
        "Copy `.env.example` to `.env` and fill in the values before running."
    )?;
    Ok(())
}
