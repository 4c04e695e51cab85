//! The content-source extension point.
//!
//! A [`ContentSource`] hands the pipeline an already-read, order-stable
//! sequence of raw documents. The pipeline itself never touches storage, so
//! anything that can produce `(path, text)` pairs can feed a manifest build:
//! the built-in [`FilesystemSource`](crate::connector_fs::FilesystemSource),
//! a git tree, or a fixed list in tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use content_manifest::error::IngestError;
//! use content_manifest::traits::ContentSource;
//! use content_manifest_core::models::RawDocument;
//!
//! pub struct FixedSource(Vec<RawDocument>);
//!
//! #[async_trait]
//! impl ContentSource for FixedSource {
//!     fn name(&self) -> &str { "fixed" }
//!
//!     async fn scan(&self) -> Result<Vec<RawDocument>, IngestError> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use async_trait::async_trait;
use content_manifest_core::models::RawDocument;

use crate::error::IngestError;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short label used in logs and progress output.
    fn name(&self) -> &str;

    /// Read every document. The returned order becomes `source_order`, so it
    /// must be stable across runs over unchanged content.
    async fn scan(&self) -> Result<Vec<RawDocument>, IngestError>;
}
