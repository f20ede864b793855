//! Cross-document overlap detection.
//!
//! An overlap is an exact action string granted by statements in two or more
//! distinct policy documents. Actions are not normalized here, and statement
//! effects are not considered: an `Allow` in one document and a `Deny` in
//! another are reported like any other duplicate.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::policy::{ActionsBySid, PolicyDocument, actions_by_sid};

/// The actions of one policy document, grouped by Sid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyActions {
    /// Document identifier, unique within one comparison.
    pub name: String,
    pub by_sid: ActionsBySid,
}

impl PolicyActions {
    pub fn new(name: impl Into<String>, by_sid: ActionsBySid) -> Self {
        Self {
            name: name.into(),
            by_sid,
        }
    }

    pub fn from_document(name: impl Into<String>, document: &PolicyDocument) -> Self {
        Self::new(name, actions_by_sid(&document.statements))
    }

    /// Number of distinct actions across all Sids.
    pub fn action_count(&self) -> usize {
        self.by_sid.values().map(BTreeSet::len).sum()
    }
}

/// Two statements in different documents granting the same action.
///
/// `policy_a`/`sid_a` is the occurrence seen first in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapPair {
    #[serde(rename = "policy1")]
    pub policy_a: String,
    #[serde(rename = "sid1")]
    pub sid_a: String,
    #[serde(rename = "policy2")]
    pub policy_b: String,
    #[serde(rename = "sid2")]
    pub sid_b: String,
}

impl OverlapPair {
    /// Order-independent key: the two (policy, sid) occurrences sorted by
    /// policy name.
    pub fn canonical_key(&self) -> (&str, &str, &str, &str) {
        if self.policy_a <= self.policy_b {
            (
                self.policy_a.as_str(),
                self.policy_b.as_str(),
                self.sid_a.as_str(),
                self.sid_b.as_str(),
            )
        } else {
            (
                self.policy_b.as_str(),
                self.policy_a.as_str(),
                self.sid_b.as_str(),
                self.sid_a.as_str(),
            )
        }
    }
}

/// Overlapping actions mapped to every cross-document pair granting them.
pub type OverlapReport = BTreeMap<String, Vec<OverlapPair>>;

/// Finds actions granted by more than one policy document.
///
/// Every pair of occurrences from different documents is reported, so an
/// action granted by two Sids in one document and once in another yields two
/// pairs. Duplicates within a single document are never reported on their own.
pub fn find_overlaps(policies: &[PolicyActions]) -> OverlapReport {
    let mut sources: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();

    for policy in policies {
        for (sid, actions) in &policy.by_sid {
            for action in actions {
                sources
                    .entry(action.as_str())
                    .or_default()
                    .push((policy.name.as_str(), sid.as_str()));
            }
        }
    }

    let mut overlaps = OverlapReport::new();

    for (action, occurrences) in sources {
        if occurrences.len() < 2 {
            continue;
        }

        let documents: BTreeSet<&str> = occurrences.iter().map(|(policy, _)| *policy).collect();
        if documents.len() < 2 {
            log::debug!("'{}' is repeated only within one document", action);
            continue;
        }

        let mut pairs = Vec::new();
        for (i, (policy_a, sid_a)) in occurrences.iter().enumerate() {
            for (policy_b, sid_b) in &occurrences[i + 1..] {
                if policy_a != policy_b {
                    pairs.push(OverlapPair {
                        policy_a: policy_a.to_string(),
                        sid_a: sid_a.to_string(),
                        policy_b: policy_b.to_string(),
                        sid_b: sid_b.to_string(),
                    });
                }
            }
        }

        pairs.sort_by(|a, b| a.canonical_key().cmp(&b.canonical_key()));
        overlaps.insert(action.to_string(), pairs);
    }

    log::debug!(
        "Checked {} policies, {} overlapping actions",
        policies.len(),
        overlaps.len()
    );

    overlaps
}

/// One overlapping action within a policy pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PairedAction {
    pub action: String,
    /// Sid in the lexicographically-first policy of the pair.
    pub sid_first: String,
    /// Sid in the lexicographically-second policy of the pair.
    pub sid_second: String,
}

/// Overlaps regrouped by unordered policy pair.
///
/// Keys are `(first, second)` with `first < second`; actions within each pair
/// are sorted.
pub fn group_by_policy_pair(report: &OverlapReport) -> BTreeMap<(String, String), Vec<PairedAction>> {
    let mut grouped: BTreeMap<(String, String), Vec<PairedAction>> = BTreeMap::new();

    for (action, pairs) in report {
        for pair in pairs {
            let (first, second, sid_first, sid_second) = pair.canonical_key();
            grouped
                .entry((first.to_string(), second.to_string()))
                .or_default()
                .push(PairedAction {
                    action: action.clone(),
                    sid_first: sid_first.to_string(),
                    sid_second: sid_second.to_string(),
                });
        }
    }

    for actions in grouped.values_mut() {
        actions.sort();
    }

    grouped
}
