//! Document normalization: identity keys and content hashes.
//!
//! The identity key is derived from the final path segment only, so every
//! revision of a logical document maps to the same key no matter where it
//! lives or what its content says:
//!
//! | Path | Identity key |
//! |------|--------------|
//! | `_posts/2024-11-25-Redis-Locks.md` | `redis-locks` |
//! | `drafts/redis-locks.markdown` | `redis-locks` |
//! | `about.md` | `about` |

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::error::PipelineError;
use crate::frontmatter::parse_document;
use crate::models::{Document, FrontMatter, RawDocument};

/// Length of a `YYYY-MM-DD-` filename prefix.
const DATE_PREFIX_LEN: usize = 11;

/// Parse and normalize one raw document.
pub fn normalize(raw: RawDocument, source_order: usize) -> Result<Document, PipelineError> {
    let identity_key = identity_key(&raw.path)?;
    let (front_matter, body) = parse_document(&raw.path, &raw.raw_text)?;
    let content_hash = content_hash(&front_matter, &body);
    let path_date = path_date(&raw.path);

    Ok(Document {
        identity_key,
        path: raw.path,
        front_matter,
        body,
        content_hash,
        source_order,
        path_date,
    })
}

/// Derive the identity key for `path`.
///
/// Takes the final segment, strips a `YYYY-MM-DD-` prefix and the file
/// extension, then lowercases. Fails with
/// [`PipelineError::UnresolvableIdentity`] when nothing is left.
pub fn identity_key(path: &str) -> Result<String, PipelineError> {
    let name = file_name(path);
    let name = if date_prefix(name).is_some() {
        &name[DATE_PREFIX_LEN..]
    } else {
        name
    };
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };

    let key = stem.trim().to_lowercase();
    if key.is_empty() {
        return Err(PipelineError::UnresolvableIdentity {
            path: path.to_string(),
        });
    }
    Ok(key)
}

/// The date in a `YYYY-MM-DD-` filename prefix, when it is a real date.
pub fn path_date(path: &str) -> Option<NaiveDate> {
    let prefix = date_prefix(file_name(path))?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Hex SHA-256 over the serialized front matter and the body.
///
/// Used for equality detection between revisions only. The path is not part
/// of the digest, so a filename date (`path_date`) does not affect it: two
/// revisions with the same text but different `YYYY-MM-DD-` prefixes hash
/// equal even though their effective dates differ.
pub fn content_hash(front_matter: &FrontMatter, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(front_matter.to_block().as_bytes());
    hasher.update([0u8]);
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Return the `YYYY-MM-DD` part when `name` starts with `YYYY-MM-DD-`.
fn date_prefix(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    if bytes.len() < DATE_PREFIX_LEN {
        return None;
    }
    let shaped = bytes[..DATE_PREFIX_LEN]
        .iter()
        .enumerate()
        .all(|(i, b)| match i {
            4 | 7 | 10 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if shaped {
        Some(&name[..DATE_PREFIX_LEN - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_date_prefix_and_extension() {
        assert_eq!(identity_key("_posts/2024-11-25-Redis-Locks.md").unwrap(), "redis-locks");
        assert_eq!(identity_key("about.md").unwrap(), "about");
        assert_eq!(identity_key("drafts/redis-locks.markdown").unwrap(), "redis-locks");
        assert_eq!(identity_key("pages\\About.MD").unwrap(), "about");
    }

    #[test]
    fn only_final_extension_is_stripped() {
        assert_eq!(identity_key("notes.v2.md").unwrap(), "notes.v2");
        assert_eq!(identity_key("README").unwrap(), "readme");
    }

    #[test]
    fn date_without_trailing_dash_is_kept() {
        assert_eq!(identity_key("2024-11-25.md").unwrap(), "2024-11-25");
        assert_eq!(path_date("2024-11-25.md"), None);
    }

    #[test]
    fn empty_identity_is_unresolvable() {
        for path in ["2024-11-25-.md", ".md", "posts/", ""] {
            let err = identity_key(path).unwrap_err();
            assert_eq!(
                err,
                PipelineError::UnresolvableIdentity {
                    path: path.to_string()
                },
                "path {path:?}"
            );
        }
    }

    #[test]
    fn path_date_requires_real_date() {
        assert_eq!(
            path_date("_posts/2022-06-15-sso.md"),
            NaiveDate::from_ymd_opt(2022, 6, 15)
        );
        assert_eq!(path_date("_posts/2022-13-45-bad.md"), None);
        // Shape alone is enough to strip the prefix from the key.
        assert_eq!(identity_key("_posts/2022-13-45-bad.md").unwrap(), "bad");
    }

    #[test]
    fn content_hash_tracks_body_and_metadata() {
        let fm = FrontMatter::new("X");
        let a = content_hash(&fm, "body");
        assert_eq!(a, content_hash(&fm, "body"));
        assert_ne!(a, content_hash(&fm, "body!"));
        assert_ne!(a, content_hash(&FrontMatter::new("Y"), "body"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn normalize_builds_document() {
        let raw = RawDocument::new("_posts/2024-11-25-x.md", "---\ntitle: X\n---\nHi\n");
        let doc = normalize(raw, 7).unwrap();
        assert_eq!(doc.identity_key, "x");
        assert_eq!(doc.source_order, 7);
        assert_eq!(doc.body, "Hi\n");
        assert_eq!(doc.front_matter.date, None);
        assert_eq!(doc.effective_date(), NaiveDate::from_ymd_opt(2024, 11, 25));
    }

    #[test]
    fn content_hash_ignores_filename_date() {
        let text = "---\ntitle: X\n---\nSame\n";
        let newer = normalize(RawDocument::new("_posts/2024-01-01-x.md", text), 0).unwrap();
        let older = normalize(RawDocument::new("_posts/2023-01-01-x.md", text), 1).unwrap();
        assert_eq!(newer.content_hash, older.content_hash);
        assert_ne!(newer.effective_date(), older.effective_date());
    }

    #[test]
    fn normalize_reports_identity_before_parse() {
        let err = normalize(RawDocument::new(".md", "no front matter"), 0).unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvableIdentity { .. }));
    }
}
