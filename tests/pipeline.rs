//! Library-level tests: custom content sources and the filesystem source
//! feeding the full pipeline.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use content_manifest::config::Config;
use content_manifest::error::IngestError;
use content_manifest::ingest::{build_for_config, build_from_source};
use content_manifest::progress::{ProgressEvent, ProgressReporter};
use content_manifest::traits::ContentSource;
use content_manifest_core::frontmatter::parse_document;
use content_manifest_core::manifest::BuildOptions;
use content_manifest_core::models::{DiscardReason, RawDocument};
use content_manifest_core::resolve::Precedence;
use tempfile::TempDir;

// ─── Test Source ────────────────────────────────────────────────────

/// Replays a fixed stream of revisions, like a feed of re-pasted drafts.
struct RevisionStream {
    docs: Vec<RawDocument>,
}

impl RevisionStream {
    fn new(docs: &[(&str, &str)]) -> Self {
        Self {
            docs: docs.iter().map(|&pair| RawDocument::from(pair)).collect(),
        }
    }
}

#[async_trait]
impl ContentSource for RevisionStream {
    fn name(&self) -> &str {
        "revisions"
    }

    async fn scan(&self) -> Result<Vec<RawDocument>, IngestError> {
        Ok(self.docs.clone())
    }
}

#[derive(Default)]
struct CountingProgress {
    reads: AtomicUsize,
}

impl ProgressReporter for CountingProgress {
    fn report(&self, event: ProgressEvent) {
        if let ProgressEvent::Reading { .. } = event {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn build(source: &RevisionStream, options: BuildOptions) -> content_manifest_core::Manifest {
    build_from_source(source, Duration::from_secs(5), &options, std::future::pending())
        .await
        .unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn three_revisions_collapse_to_the_last() {
    let source = RevisionStream::new(&[
        ("_posts/2024-11-25-cron-monitor.md", "---\ntitle: Cron Monitor\ndate: 2024-11-25\n---\nDraft one.\n"),
        ("_posts/2024-11-25-cron-monitor.md", "---\ntitle: Cron Monitor\ndate: 2024-11-25\n---\nDraft two.\n"),
        ("_posts/2024-11-25-cron-monitor.md", "---\ntitle: Cron Monitor\ndate: 2024-11-25\n---\nDraft two.\n"),
    ]);
    let manifest = build(&source, BuildOptions::default()).await;

    assert_eq!(manifest.documents.len(), 1);
    assert_eq!(manifest.documents[0].source_order, 2);
    let reasons: Vec<_> = manifest.discarded.iter().map(|d| d.reason).collect();
    assert_eq!(
        reasons,
        vec![DiscardReason::SupersededRevision, DiscardReason::IdenticalDuplicate]
    );
}

#[tokio::test]
async fn precedence_is_configurable() {
    let source = RevisionStream::new(&[
        ("about.md", "---\ntitle: About\n---\nfirst\n"),
        ("about.md", "---\ntitle: About\n---\nsecond\n"),
    ]);
    let options = BuildOptions {
        precedence: Precedence::FirstSeen,
        ..BuildOptions::default()
    };
    let manifest = build(&source, options).await;
    assert_eq!(manifest.documents[0].body, "first\n");
}

#[tokio::test]
async fn canonical_documents_round_trip() {
    let source = RevisionStream::new(&[
        ("about.md", "---\ntitle: About\npermalink: /about/\ntoc: true\ntoc_sticky: true\n---\n## Experience\n\n- Redis\n"),
        ("_posts/2023-02-01-scraping.md", "---\ntitle: 'Scraping: at scale'\ncategories: [Blog, Engineering]\n---\nBody\n"),
    ]);
    let manifest = build(&source, BuildOptions::default()).await;

    for doc in &manifest.documents {
        let (fm, body) = parse_document(&doc.path, &doc.to_source_text()).unwrap();
        assert_eq!(fm, doc.front_matter);
        assert_eq!(body, doc.body);
    }
}

#[tokio::test]
async fn filesystem_build_accounts_for_every_file() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("_posts")).unwrap();
    fs::write(root.join("_posts/2024-11-25-a.md"), "---\ntitle: A\n---\nA\n").unwrap();
    fs::write(root.join("_posts/a.md"), "---\ntitle: A\n---\nA, edited\n").unwrap();
    fs::write(root.join("_posts/2022-06-15-b.md"), "---\ntitle: B\n---\nB\n").unwrap();
    fs::write(root.join("broken.md"), "no front matter\n").unwrap();
    fs::write(root.join("notes.txt"), "ignored\n").unwrap();

    let mut config = Config::default();
    config.content.root = root.to_path_buf();
    let progress = Arc::new(CountingProgress::default());

    let manifest = build_for_config(&config, &BuildOptions::lenient(), progress.clone())
        .await
        .unwrap();

    assert_eq!(progress.reads.load(Ordering::SeqCst), 4);
    assert_eq!(
        manifest.documents.len() + manifest.discarded.len() + manifest.diagnostics.len(),
        4
    );
    let a = manifest.get("a").unwrap();
    assert_eq!(a.path, "_posts/a.md");
    assert_eq!(a.body, "A, edited\n");
    // Undated canonical revision: no filename date, no front-matter date.
    assert_eq!(a.effective_date(), None);
    assert_eq!(manifest.documents[0].identity_key, "b");
    assert_eq!(manifest.diagnostics[0].path, "broken.md");
}

#[tokio::test]
async fn filesystem_build_strict_fails_whole_run() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ok.md"), "---\ntitle: Ok\n---\n").unwrap();
    fs::write(tmp.path().join("2024-11-25-x.md"), "body only\n").unwrap();

    let mut config = Config::default();
    config.content.root = tmp.path().to_path_buf();
    let err = build_for_config(
        &config,
        &BuildOptions::default(),
        Arc::new(CountingProgress::default()),
    )
    .await
    .unwrap_err();

    let pipeline = err
        .downcast_ref::<content_manifest_core::PipelineError>()
        .unwrap();
    assert_eq!(pipeline.kind(), "malformed-front-matter");
    assert_eq!(pipeline.path(), "2024-11-25-x.md");
}
