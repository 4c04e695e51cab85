//! Duplicate resolution.
//!
//! Documents sharing an identity key are grouped in discovery order and
//! collapsed to one canonical document per group. Under the default
//! [`Precedence::LastSeen`] rule the member with the highest `source_order`
//! wins, so later revisions in the content stream supersede earlier ones.
//!
//! Every non-canonical member is reported as a [`DiscardedEntry`]:
//! `identical-duplicate` when its content hash matches the canonical one,
//! `superseded-revision` otherwise.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{DiscardReason, DiscardedEntry, Document};

/// Which member of a duplicate group becomes canonical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Highest `source_order` wins.
    #[default]
    LastSeen,
    /// Lowest `source_order` wins.
    FirstSeen,
    /// Latest effective date wins; dated beats undated; ties go to the
    /// highest `source_order`.
    NewestDate,
}

impl FromStr for Precedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-seen" => Ok(Precedence::LastSeen),
            "first-seen" => Ok(Precedence::FirstSeen),
            "newest-date" => Ok(Precedence::NewestDate),
            other => Err(format!(
                "unknown precedence '{other}'; expected last-seen, first-seen, or newest-date"
            )),
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precedence::LastSeen => "last-seen",
            Precedence::FirstSeen => "first-seen",
            Precedence::NewestDate => "newest-date",
        })
    }
}

/// Documents sharing one identity key, in discovery order.
#[derive(Debug)]
pub struct DuplicateGroup {
    pub identity_key: String,
    pub members: Vec<Document>,
}

impl DuplicateGroup {
    /// Index of the canonical member under `precedence`.
    fn canonical_index(&self, precedence: Precedence) -> usize {
        let indexed = self.members.iter().enumerate();
        let chosen = match precedence {
            Precedence::LastSeen => indexed.max_by_key(|(_, d)| d.source_order),
            Precedence::FirstSeen => indexed.min_by_key(|(_, d)| d.source_order),
            Precedence::NewestDate => {
                indexed.max_by_key(|(_, d)| (d.effective_date(), d.source_order))
            }
        };
        chosen.map(|(i, _)| i).unwrap_or(0)
    }
}

/// Output of [`resolve_duplicates`].
#[derive(Debug)]
pub struct Resolution {
    /// One canonical document per identity key, in first-seen key order.
    pub canonical: Vec<Document>,
    pub discarded: Vec<DiscardedEntry>,
}

/// Group documents by identity key, preserving first-seen order.
pub fn group_by_identity(documents: Vec<Document>) -> Vec<DuplicateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for doc in documents {
        match index.get(&doc.identity_key) {
            Some(&i) => groups[i].members.push(doc),
            None => {
                index.insert(doc.identity_key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    identity_key: doc.identity_key.clone(),
                    members: vec![doc],
                });
            }
        }
    }

    for group in &mut groups {
        group.members.sort_by_key(|d| d.source_order);
    }
    groups
}

/// Collapse each duplicate group to its canonical document.
pub fn resolve_duplicates(documents: Vec<Document>, precedence: Precedence) -> Resolution {
    let mut canonical = Vec::new();
    let mut discarded = Vec::new();

    for group in group_by_identity(documents) {
        let winner_idx = group.canonical_index(precedence);
        let mut members = group.members;
        let winner = members.remove(winner_idx);

        for loser in members {
            let reason = if loser.content_hash == winner.content_hash {
                DiscardReason::IdenticalDuplicate
            } else {
                DiscardReason::SupersededRevision
            };
            tracing::debug!(
                identity_key = %group.identity_key,
                path = %loser.path,
                kept = %winner.path,
                %reason,
                "discarding duplicate"
            );
            discarded.push(DiscardedEntry {
                identity_key: group.identity_key.clone(),
                path: loser.path,
                reason,
            });
        }

        canonical.push(winner);
    }

    Resolution {
        canonical,
        discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrontMatter;
    use crate::normalize::content_hash;
    use chrono::NaiveDate;

    fn doc(path: &str, key: &str, body: &str, order: usize) -> Document {
        let front_matter = FrontMatter::new("T");
        Document {
            identity_key: key.to_string(),
            path: path.to_string(),
            content_hash: content_hash(&front_matter, body),
            front_matter,
            body: body.to_string(),
            source_order: order,
            path_date: None,
        }
    }

    #[test]
    fn last_seen_wins_and_earlier_is_superseded() {
        let docs = vec![
            doc("about.md", "about", "v1", 0),
            doc("about.md", "about", "v2", 1),
        ];
        let res = resolve_duplicates(docs, Precedence::LastSeen);
        assert_eq!(res.canonical.len(), 1);
        assert_eq!(res.canonical[0].source_order, 1);
        assert_eq!(res.canonical[0].body, "v2");
        assert_eq!(
            res.discarded,
            vec![DiscardedEntry {
                identity_key: "about".into(),
                path: "about.md".into(),
                reason: DiscardReason::SupersededRevision,
            }]
        );
    }

    #[test]
    fn identical_content_is_not_a_conflict() {
        let docs = vec![
            doc("2024-01-01-x.md", "x", "same", 0),
            doc("x.md", "x", "same", 1),
        ];
        let res = resolve_duplicates(docs, Precedence::LastSeen);
        assert_eq!(res.canonical.len(), 1);
        assert_eq!(res.canonical[0].path, "x.md");
        assert_eq!(res.discarded[0].reason, DiscardReason::IdenticalDuplicate);
        assert_eq!(res.discarded[0].path, "2024-01-01-x.md");
    }

    #[test]
    fn mixed_group_reports_each_member() {
        let docs = vec![
            doc("a/p.md", "p", "final", 0),
            doc("b/p.md", "p", "draft", 1),
            doc("c/p.md", "p", "final", 2),
        ];
        let res = resolve_duplicates(docs, Precedence::LastSeen);
        assert_eq!(res.canonical[0].path, "c/p.md");
        let reasons: Vec<_> = res.discarded.iter().map(|d| (d.path.as_str(), d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("a/p.md", DiscardReason::IdenticalDuplicate),
                ("b/p.md", DiscardReason::SupersededRevision),
            ]
        );
    }

    #[test]
    fn winner_is_by_source_order_not_input_position() {
        let docs = vec![doc("late.md", "k", "new", 5), doc("early.md", "k", "old", 2)];
        let res = resolve_duplicates(docs, Precedence::LastSeen);
        assert_eq!(res.canonical[0].path, "late.md");
    }

    #[test]
    fn first_seen_precedence() {
        let docs = vec![doc("k.md", "k", "old", 0), doc("k.md", "k", "new", 1)];
        let res = resolve_duplicates(docs, Precedence::FirstSeen);
        assert_eq!(res.canonical[0].body, "old");
        assert_eq!(res.discarded[0].reason, DiscardReason::SupersededRevision);
    }

    #[test]
    fn newest_date_precedence() {
        let mut dated = doc("2023-05-01-k.md", "k", "dated", 0);
        dated.path_date = NaiveDate::from_ymd_opt(2023, 5, 1);
        let undated = doc("k.md", "k", "undated", 1);
        let res = resolve_duplicates(vec![dated, undated], Precedence::NewestDate);
        assert_eq!(res.canonical[0].body, "dated");
    }

    #[test]
    fn groups_keep_first_seen_key_order() {
        let docs = vec![
            doc("b.md", "b", "1", 0),
            doc("a.md", "a", "1", 1),
            doc("b.md", "b", "2", 2),
        ];
        let groups = group_by_identity(docs);
        let keys: Vec<_> = groups.iter().map(|g| g.identity_key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn precedence_parses_from_config_strings() {
        assert_eq!("newest-date".parse::<Precedence>().unwrap(), Precedence::NewestDate);
        assert_eq!(Precedence::default().to_string(), "last-seen");
        assert!("latest".parse::<Precedence>().is_err());
    }
}
