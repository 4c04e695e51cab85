use thiserror::Error;

/// A per-document failure in the parse or normalize stage.
///
/// Every variant carries the offending document's path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{path}: malformed front matter: {reason}")]
    MalformedFrontMatter { path: String, reason: String },
    #[error("{path}: missing required front-matter field `{field}`")]
    MissingRequiredField { path: String, field: &'static str },
    #[error("{path}: cannot derive an identity key from this path")]
    UnresolvableIdentity { path: String },
}

impl PipelineError {
    pub fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedFrontMatter {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(path: &str, field: &'static str) -> Self {
        Self::MissingRequiredField {
            path: path.to_string(),
            field,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::MalformedFrontMatter { path, .. }
            | Self::MissingRequiredField { path, .. }
            | Self::UnresolvableIdentity { path } => path,
        }
    }

    /// Stable machine-readable code, used in diagnostics output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedFrontMatter { .. } => "malformed-front-matter",
            Self::MissingRequiredField { .. } => "missing-required-field",
            Self::UnresolvableIdentity { .. } => "unresolvable-identity",
        }
    }
}
