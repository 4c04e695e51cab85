//! Filesystem content source.
//!
//! Walks the configured content root, filters paths through include and
//! exclude globs, and reads every matching file. Paths are sorted so that
//! `source_order` is stable; reads run concurrently but results are put back
//! in discovery order before anything downstream sees them.
//!
//! Reads retry transient I/O errors with linear backoff. Anything else
//! (missing file, permissions, invalid UTF-8) fails immediately.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use content_manifest_core::models::RawDocument;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::{Config, ContentConfig, IngestConfig};
use crate::error::IngestError;
use crate::progress::{NoProgress, ProgressEvent, ProgressReporter};
use crate::traits::ContentSource;

const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git/**",
    "**/_site/**",
    "**/node_modules/**",
    "**/vendor/**",
    "**/.jekyll-cache/**",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl From<&IngestConfig> for RetryPolicy {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.retry_backoff(),
        }
    }
}

/// A file selected for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub absolute: PathBuf,
    /// Root-relative path with `/` separators.
    pub relative: String,
}

pub struct FilesystemSource {
    content: ContentConfig,
    ingest: IngestConfig,
    progress: Arc<dyn ProgressReporter>,
}

impl FilesystemSource {
    pub fn new(config: &Config) -> Self {
        Self {
            content: config.content.clone(),
            ingest: config.ingest.clone(),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }
}

#[async_trait]
impl ContentSource for FilesystemSource {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn scan(&self) -> Result<Vec<RawDocument>, IngestError> {
        self.progress.report(ProgressEvent::Discovering {
            source: self.name().to_string(),
        });

        let content = self.content.clone();
        let files = tokio::task::spawn_blocking(move || discover(&content)).await??;
        let total = files.len();
        tracing::debug!(root = %self.content.root.display(), files = total, "discovered content");

        let policy = RetryPolicy::from(&self.ingest);
        let semaphore = Arc::new(Semaphore::new(self.ingest.concurrency.max(1)));
        let mut reads = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            reads.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| IngestError::Cancelled)?;
                let text = read_with_retry(&file.absolute, &policy, || {
                    tokio::fs::read_to_string(file.absolute.clone())
                })
                .await?;
                Ok::<_, IngestError>((index, RawDocument::new(file.relative, text)))
            });
        }

        // Join barrier: nothing is returned until every read has landed.
        let mut slots: Vec<Option<RawDocument>> = vec![None; total];
        let mut done = 0u64;
        while let Some(joined) = reads.join_next().await {
            let (index, doc) = joined??;
            slots[index] = Some(doc);
            done += 1;
            self.progress.report(ProgressEvent::Reading {
                source: self.name().to_string(),
                n: done,
                total: total as u64,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Walk the content root and return matching files sorted by relative path.
pub fn discover(content: &ContentConfig) -> Result<Vec<ContentFile>, IngestError> {
    let root = &content.root;
    if !root.exists() {
        return Err(IngestError::RootMissing(root.clone()));
    }

    let include_set = build_globset(&content.include_globs)?;

    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(content.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(content.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(ContentFile {
            absolute: path.to_path_buf(),
            relative: rel_str,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Run `read` until it succeeds, fails permanently, or runs out of attempts.
pub async fn read_with_retry<F, Fut>(
    path: &Path,
    policy: &RetryPolicy,
    mut read: F,
) -> Result<String, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<String>>,
{
    let mut attempt = 1;
    loop {
        match read().await {
            Ok(text) => return Ok(text),
            Err(err) if is_transient(&err) => {
                if attempt >= policy.max_attempts {
                    return Err(IngestError::IoTransient {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source: err,
                    });
                }
                tracing::warn!(
                    path = %path.display(),
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "transient read failure, retrying"
                );
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(IngestError::io(path, err)),
        }
    }
}

pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, IngestError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
