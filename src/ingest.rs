//! Build pipeline orchestration.
//!
//! Coordinates a full run: content source → front-matter parsing →
//! normalization → duplicate resolution → manifest → output. Ingestion is
//! the only step that touches the filesystem; it is bounded by a timeout and
//! aborted on Ctrl-C. A run either yields a complete manifest or an error.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use content_manifest_core::manifest::{build_manifest, BuildOptions, ValidationMode};
use content_manifest_core::models::{Manifest, RawDocument};

use crate::config::Config;
use crate::connector_fs::FilesystemSource;
use crate::error::IngestError;
use crate::export;
use crate::progress::ProgressReporter;
use crate::traits::ContentSource;

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub output: Option<PathBuf>,
    pub lenient: bool,
    pub dry_run: bool,
}

/// Scan `source`, failing if `timeout` elapses or `cancel` resolves first.
pub async fn scan_with_deadline<C>(
    source: &dyn ContentSource,
    timeout: Duration,
    cancel: C,
) -> Result<Vec<RawDocument>, IngestError>
where
    C: Future<Output = ()>,
{
    tokio::select! {
        scanned = tokio::time::timeout(timeout, source.scan()) => {
            scanned.map_err(|_| IngestError::Timeout(timeout))?
        }
        _ = cancel => Err(IngestError::Cancelled),
    }
}

/// Resolves on Ctrl-C. Never resolves if the signal handler cannot be installed.
pub async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Ingest from `source` and build the manifest.
pub async fn build_from_source<C>(
    source: &dyn ContentSource,
    timeout: Duration,
    options: &BuildOptions,
    cancel: C,
) -> Result<Manifest>
where
    C: Future<Output = ()>,
{
    let raw = scan_with_deadline(source, timeout, cancel).await?;
    tracing::info!(source = source.name(), files = raw.len(), "ingested content");

    let manifest = build_manifest(raw, options)?;
    tracing::info!(
        documents = manifest.documents.len(),
        discarded = manifest.discarded.len(),
        diagnostics = manifest.diagnostics.len(),
        mode = %options.mode,
        precedence = %options.precedence,
        "manifest built"
    );
    Ok(manifest)
}

/// Build the manifest for the configured filesystem content root.
pub async fn build_for_config(
    config: &Config,
    options: &BuildOptions,
    progress: Arc<dyn ProgressReporter>,
) -> Result<Manifest> {
    let source = FilesystemSource::new(config).with_progress(progress);
    build_from_source(&source, config.ingest.timeout(), options, ctrl_c()).await
}

/// `cmf build`.
pub async fn run_build(
    config: &Config,
    args: &BuildArgs,
    progress: Arc<dyn ProgressReporter>,
) -> Result<()> {
    let mut options = config.manifest.build_options();
    if args.lenient {
        options.mode = ValidationMode::Lenient;
    }

    let manifest = build_for_config(config, &options, progress).await?;

    if args.dry_run {
        println!("build {} (dry-run)", config.content.root.display());
        print_summary(&manifest);
        return Ok(());
    }

    let output = args.output.as_ref().or(config.manifest.output.as_ref());
    export::write_manifest(&manifest, output.map(|p| p.as_path()))?;

    if let Some(path) = output {
        println!("build {}", config.content.root.display());
        print_summary(&manifest);
        println!("  written: {}", path.display());
        println!("ok");
    }
    Ok(())
}

/// `cmf check`: lenient run that lists every problem.
///
/// Returns `true` when no input was rejected.
pub async fn run_check(config: &Config, progress: Arc<dyn ProgressReporter>) -> Result<bool> {
    let options = BuildOptions {
        mode: ValidationMode::Lenient,
        precedence: config.manifest.precedence,
    };
    let manifest = build_for_config(config, &options, progress).await?;

    println!("check {}", config.content.root.display());
    print_summary(&manifest);
    for entry in &manifest.discarded {
        println!(
            "  discarded  {:<40} {:<24} {}",
            entry.path, entry.identity_key, entry.reason
        );
    }
    for diag in &manifest.diagnostics {
        println!("  error      {:<40} {:<24} {}", diag.path, diag.kind, diag.message);
    }

    let clean = manifest.diagnostics.is_empty();
    println!("{}", if clean { "ok" } else { "failed" });
    Ok(clean)
}

fn print_summary(manifest: &Manifest) {
    println!("  documents: {}", manifest.documents.len());
    println!("  discarded: {}", manifest.discarded.len());
    if !manifest.diagnostics.is_empty() {
        println!("  rejected: {}", manifest.diagnostics.len());
    }
}
