//! Core data models used throughout Content Manifest.
//!
//! These types represent the documents that flow through the manifest
//! pipeline: raw text as read from a content source, the parsed front
//! matter, the normalized [`Document`], and the final [`Manifest`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::PipelineError;
use crate::frontmatter::render_document;

/// A document as produced by a content source, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Source location (root-relative path for filesystem sources).
    pub path: String,
    /// Full file content, front matter included.
    pub raw_text: String,
}

impl RawDocument {
    pub fn new(path: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_text: raw_text.into(),
        }
    }
}

impl From<(String, String)> for RawDocument {
    fn from((path, raw_text): (String, String)) -> Self {
        Self { path, raw_text }
    }
}

impl From<(&str, &str)> for RawDocument {
    fn from((path, raw_text): (&str, &str)) -> Self {
        Self::new(path, raw_text)
    }
}

/// Parsed front-matter metadata.
///
/// `title` is always non-empty. Keys the pipeline does not interpret
/// (`permalink`, `layout`, `toc`, ...) are preserved verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: None,
            categories: BTreeSet::new(),
            tags: BTreeSet::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn permalink(&self) -> Option<&str> {
        self.extra.get("permalink").and_then(|v| v.as_str())
    }

    pub fn layout(&self) -> Option<&str> {
        self.extra.get("layout").and_then(|v| v.as_str())
    }
}

/// A parsed and normalized document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Path-derived key shared by every revision of the same logical document.
    pub identity_key: String,
    pub path: String,
    pub front_matter: FrontMatter,
    /// Markdown body with the front-matter block stripped.
    pub body: String,
    /// Hex SHA-256 over the serialized front matter and body.
    pub content_hash: String,
    /// Position in the ingestion stream.
    pub source_order: usize,
    /// Date carried by a `YYYY-MM-DD-` filename prefix, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_date: Option<NaiveDate>,
}

impl Document {
    /// Front-matter date, falling back to the filename date.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.front_matter.date.or(self.path_date)
    }

    /// Re-serialize as front matter plus body, ready to be parsed again.
    pub fn to_source_text(&self) -> String {
        render_document(&self.front_matter, &self.body)
    }
}

/// Why a document was left out of [`Manifest::documents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardReason {
    /// Same content hash as the canonical document.
    IdenticalDuplicate,
    /// Different content, lost to the canonical revision.
    SupersededRevision,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::IdenticalDuplicate => "identical-duplicate",
            DiscardReason::SupersededRevision => "superseded-revision",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-canonical member of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardedEntry {
    pub identity_key: String,
    pub path: String,
    pub reason: DiscardReason,
}

/// A document rejected in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub kind: &'static str,
    pub message: String,
}

impl From<&PipelineError> for Diagnostic {
    fn from(err: &PipelineError) -> Self {
        Self {
            path: err.path().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// The validated, deduplicated, ordered output handed to a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Build timestamp. Metadata only; excluded from [`Manifest::same_content`].
    pub generated_at: DateTime<Utc>,
    pub documents: Vec<Document>,
    pub discarded: Vec<DiscardedEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Manifest {
    /// Compare two manifests ignoring `generated_at`.
    pub fn same_content(&self, other: &Manifest) -> bool {
        self.documents == other.documents
            && self.discarded == other.discarded
            && self.diagnostics == other.diagnostics
    }

    pub fn get(&self, identity_key: &str) -> Option<&Document> {
        self.documents
            .iter()
            .find(|d| d.identity_key == identity_key)
    }
}
