use crate::cache::CacheReport;
use crate::{FailureSet, RunError};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Persist the failure report. Written on every run, before the outcome is
/// signaled, so a failing run still leaves an inspectable artifact.
pub fn write_failures(path: &Path, failures: &FailureSet) -> Result<(), RunError> {
    write_json(path, failures, "failure")
}

/// Persist the cache report when caching is enabled.
pub fn write_cache(path: &Path, report: &CacheReport) -> Result<(), RunError> {
    write_json(path, report, "cache")
}

fn write_json<T: Serialize>(path: &Path, value: &T, kind: &'static str) -> Result<(), RunError> {
    try_write(path, value).map_err(|source| RunError::ReportWrite {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

// Write-then-rename keeps each artifact all-or-nothing: an aborted run never
// leaves a partially written report behind.
fn try_write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).context("failed to serialize report")?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &data).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move report into place at {}", path.display()))?;
    Ok(())
}
