//! # Content Manifest Core
//!
//! Pure pipeline logic for Content Manifest: data models, front-matter
//! parsing, identity and hash normalization, duplicate resolution, and
//! manifest assembly.
//!
//! This crate contains no tokio, filesystem I/O, or other side effects.
//! Every stage takes its input by value and returns new data, so running
//! the pipeline twice over the same documents yields the same manifest
//! (apart from `generated_at`).
//!
//! ```text
//! RawDocument ─▶ frontmatter ─▶ normalize ─▶ resolve ─▶ manifest
//!  (path, text)   (FrontMatter,   (identity,   (one per    (sorted,
//!                  body)           hash)        identity)   stamped)
//! ```
//!
//! ```rust
//! use content_manifest_core::manifest::{build_manifest, BuildOptions};
//! use content_manifest_core::models::RawDocument;
//!
//! let docs = vec![
//!     RawDocument::new("about.md", "---\ntitle: About\n---\nv1\n"),
//!     RawDocument::new("about.md", "---\ntitle: About\n---\nv2\n"),
//! ];
//! let manifest = build_manifest(docs, &BuildOptions::default()).unwrap();
//! assert_eq!(manifest.documents.len(), 1);
//! assert_eq!(manifest.documents[0].body, "v2\n");
//! ```

pub mod error;
pub mod frontmatter;
pub mod manifest;
pub mod models;
pub mod normalize;
pub mod resolve;

pub use error::PipelineError;
pub use manifest::{build_manifest, BuildOptions, ValidationMode};
pub use models::{Document, FrontMatter, Manifest, RawDocument};
pub use resolve::Precedence;
