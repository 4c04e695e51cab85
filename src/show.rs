//! `cmf show`: print one canonical document as it would be re-published.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::ingest::build_for_config;
use crate::progress::ProgressReporter;

/// Build the manifest and print the canonical document for `identity_key`
/// re-serialized as front matter plus body.
pub async fn run_show(
    config: &Config,
    identity_key: &str,
    progress: Arc<dyn ProgressReporter>,
) -> Result<()> {
    let options = config.manifest.build_options();
    let manifest = build_for_config(config, &options, progress).await?;

    let key = identity_key.to_lowercase();
    let Some(doc) = manifest.get(&key) else {
        bail!("No document with identity key: {}", identity_key);
    };

    eprintln!("# {} ({})", doc.path, doc.content_hash);
    print!("{}", doc.to_source_text());
    Ok(())
}
