//! Manifest output.
//!
//! Writes the manifest as pretty JSON, either to a file for the site
//! generator to pick up (e.g. `_data/manifest.json`) or to stdout for piping.

use anyhow::{Context, Result};
use content_manifest_core::models::Manifest;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `manifest` to `output`, or to stdout when `output` is `None`.
///
/// File output goes through a temp file in the destination directory and
/// is renamed into place, so readers never see a partial manifest.
pub fn write_manifest(manifest: &Manifest, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;

    match output {
        Some(path) => {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;

            let mut tmp = NamedTempFile::new_in(parent)?;
            tmp.write_all(json.as_bytes())?;
            tmp.write_all(b"\n")?;
            tmp.persist(path)
                .with_context(|| format!("Failed to write manifest to {}", path.display()))?;

            tracing::info!(
                documents = manifest.documents.len(),
                discarded = manifest.discarded.len(),
                path = %path.display(),
                "manifest written"
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
