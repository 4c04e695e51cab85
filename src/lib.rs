//! # Content Manifest
//!
//! Ingest a directory of Markdown posts and pages, validate their front
//! matter, collapse duplicate revisions of the same logical document, and
//! emit an ordered manifest for a static-site renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────────────┐   ┌──────────┐
//! │ ContentSource│──▶│  content-manifest-core     │──▶│  export  │
//! │ (filesystem) │   │ parse→normalize→resolve→   │   │  JSON    │
//! │ retry+barrier│   │ sort                       │   │          │
//! └──────────────┘   └────────────────────────────┘   └──────────┘
//! ```
//!
//! Only the content source performs I/O. Everything downstream is pure and
//! lives in [`content_manifest_core`].
//!
//! ## Quick Start
//!
//! ```bash
//! cmf init                                  # write config/cmf.toml
//! cmf check                                 # list invalid and duplicate files
//! cmf build --output _data/manifest.json    # write the manifest
//! cmf show about                            # print the canonical revision
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`traits`] | The [`ContentSource`](traits::ContentSource) extension point |
//! | [`connector_fs`] | Filesystem content source with retrying reads |
//! | [`ingest`] | Build orchestration, timeout, cancellation |
//! | [`export`] | Manifest output |
//! | [`progress`] | Ingestion progress on stderr |
//! | [`telemetry`] | `tracing` subscriber setup |

pub mod config;
pub mod connector_fs;
pub mod error;
pub mod export;
pub mod ingest;
pub mod progress;
pub mod show;
pub mod telemetry;
pub mod traits;

pub use content_manifest_core as core;
