//! Manifest assembly.
//!
//! [`build_manifest`] runs the whole pipeline over an in-memory document
//! set: parse and normalize each input, resolve duplicates, then sort.
//!
//! # Validation modes
//!
//! | Mode | On a per-document error |
//! |------|-------------------------|
//! | [`ValidationMode::Strict`] | The run fails with the first error in input order. No manifest. |
//! | [`ValidationMode::Lenient`] | The document is excluded and reported in [`Manifest::diagnostics`]. |
//!
//! In both modes every input is accounted for: it is either in `documents`,
//! in `discarded`, or (lenient only) in `diagnostics`.
//!
//! # Ordering
//!
//! Dated documents come first, newest first; undated documents (pages)
//! follow. Ties within either part are broken by identity key ascending.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{Diagnostic, Document, Manifest, RawDocument};
use crate::normalize::normalize;
use crate::resolve::{resolve_duplicates, Precedence, Resolution};

/// How per-document errors are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Lenient,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            other => Err(format!(
                "unknown validation mode '{other}'; expected strict or lenient"
            )),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Lenient => "lenient",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub mode: ValidationMode,
    pub precedence: Precedence,
}

impl BuildOptions {
    pub fn lenient() -> Self {
        Self {
            mode: ValidationMode::Lenient,
            ..Self::default()
        }
    }
}

/// Build a manifest from raw documents, in ingestion order.
pub fn build_manifest(
    raw: Vec<RawDocument>,
    options: &BuildOptions,
) -> Result<Manifest, PipelineError> {
    build_manifest_at(raw, options, Utc::now())
}

/// [`build_manifest`] with an explicit `generated_at` stamp.
pub fn build_manifest_at(
    raw: Vec<RawDocument>,
    options: &BuildOptions,
    generated_at: DateTime<Utc>,
) -> Result<Manifest, PipelineError> {
    let total = raw.len();
    let mut documents = Vec::with_capacity(total);
    let mut diagnostics = Vec::new();

    for (source_order, item) in raw.into_iter().enumerate() {
        match normalize(item, source_order) {
            Ok(doc) => documents.push(doc),
            Err(err) => match options.mode {
                ValidationMode::Strict => return Err(err),
                ValidationMode::Lenient => {
                    tracing::warn!(path = %err.path(), kind = err.kind(), "{err}");
                    diagnostics.push(Diagnostic::from(&err));
                }
            },
        }
    }

    let Resolution {
        canonical: mut documents,
        discarded,
    } = resolve_duplicates(documents, options.precedence);
    sort_documents(&mut documents);

    debug_assert_eq!(
        documents.len() + discarded.len() + diagnostics.len(),
        total,
        "every input must be accounted for"
    );
    tracing::debug!(
        inputs = total,
        documents = documents.len(),
        discarded = discarded.len(),
        diagnostics = diagnostics.len(),
        "manifest assembled"
    );

    Ok(Manifest {
        generated_at,
        documents,
        discarded,
        diagnostics,
    })
}

/// Sort dated documents newest first, then undated ones, by identity key.
pub fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        let by_date = match (a.effective_date(), b.effective_date()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| a.identity_key.cmp(&b.identity_key))
    });
}
