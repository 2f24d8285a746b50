use super::ExtractContext;
use crate::dependencies::ecosystem_for_manifest;
use crate::error::{LiberatorError, Result};
use crate::extraction::{
    ExtractedFile, ExtractionResult, ManifestDeclaration, Platform, Warning, WarningKind,
};
use crate::fs::WalkEntry;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

enum ReadOutcome {
    Read(ExtractedFile),
    Skipped(Warning),
    Cancelled,
}

fn read_entry(ctx: &ExtractContext<'_>, entry: &WalkEntry) -> ReadOutcome {
    if ctx.cancel.is_cancelled() {
        return ReadOutcome::Cancelled;
    }

    // One byte past the limit is enough to tell an oversized file apart
    let limit = ctx.max_file_size.saturating_add(1) as usize;
    match ctx.fs.read_bytes(&entry.path, limit) {
        Ok(content) if content.len() as u64 > ctx.max_file_size => {
            debug!(path = %entry.relative, limit = ctx.max_file_size, "File exceeds size limit");
            ReadOutcome::Skipped(Warning::for_path(
                WarningKind::FileSkipped,
                &entry.relative,
                format!("File larger than {} bytes", ctx.max_file_size),
            ))
        }
        Ok(content) => ReadOutcome::Read(ExtractedFile::new(entry.relative.clone(), content)),
        Err(e) => {
            warn!(path = %entry.relative, error = %e, "Skipping unreadable file");
            ReadOutcome::Skipped(Warning::for_path(
                WarningKind::FileSkipped,
                &entry.relative,
                format!("{:#}", e),
            ))
        }
    }
}

/// Project name for a source root: its last path component
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

/// Walk the source tree and read every file on the worker pool.
///
/// Only a missing or untraversable root is an error. Unreadable and oversized
/// files become `FileSkipped` warnings; once the cancellation token fires the
/// files read so far are returned with a `Cancelled` warning.
pub fn collect_tree(ctx: &ExtractContext<'_>, platform: Platform) -> Result<ExtractionResult> {
    let start = Instant::now();

    if !ctx.fs.is_dir(ctx.root) {
        return Err(LiberatorError::source_unreadable(
            ctx.root,
            "Not an existing directory",
        ));
    }

    let walked = ctx
        .fs
        .walk(ctx.root, &ctx.walk)
        .map_err(|e| LiberatorError::source_unreadable(ctx.root, format!("{:#}", e)))?;

    info!(
        root = %ctx.root.display(),
        platform = %platform,
        entries = walked.entries.len(),
        "Reading source tree"
    );

    let mut result = ExtractionResult::new(platform, project_name(ctx.root));
    for failure in walked.failures {
        result.warn(Warning::new(
            WarningKind::FileSkipped,
            failure.path,
            failure.message,
        ));
    }

    let outcomes: Vec<ReadOutcome> = ctx.pool.install(|| {
        walked
            .entries
            .par_iter()
            .map(|entry| read_entry(ctx, entry))
            .collect()
    });

    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            ReadOutcome::Read(file) => result.files.push(file),
            ReadOutcome::Skipped(warning) => result.warn(warning),
            ReadOutcome::Cancelled => cancelled = true,
        }
    }

    if cancelled {
        warn!(files_read = result.files.len(), "Extraction cancelled");
        result.cancelled = true;
        result.warn(Warning::new(
            WarningKind::Cancelled,
            None,
            format!(
                "Extraction cancelled after reading {} files",
                result.files.len()
            ),
        ));
    }

    harvest_manifests(&mut result);

    debug!(
        files = result.files.len(),
        warnings = result.warnings.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Source tree read"
    );
    Ok(result)
}

fn harvest_manifests(result: &mut ExtractionResult) {
    let mut found: Vec<(usize, &ExtractedFile)> = Vec::new();
    for file in &result.files {
        if ecosystem_for_manifest(file.file_name()).is_some() {
            found.push((file.depth(), file));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.path.cmp(&b.1.path)));

    let mut manifests = std::mem::take(&mut result.manifests);
    let mut warnings = Vec::new();
    for (_, file) in found {
        let Some(ecosystem) = ecosystem_for_manifest(file.file_name()) else {
            continue;
        };
        match file.text() {
            Some(text) => manifests
                .entry(ecosystem)
                .or_default()
                .push(ManifestDeclaration {
                    path: file.path.clone(),
                    file_name: file.file_name().to_string(),
                    content: text.to_string(),
                }),
            None => warnings.push(Warning::for_path(
                WarningKind::ManifestUnparsable,
                &file.path,
                "Manifest is not valid UTF-8",
            )),
        }
    }
    result.manifests = manifests;
    result.warnings.extend(warnings);
}
