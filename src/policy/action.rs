//! Action extraction and normalization.
//!
//! These functions turn the statements of a policy document into the
//! groupings the analyzers compare: actions by effect for boundary checks and
//! actions by Sid for overlap checks.

use std::collections::{BTreeMap, BTreeSet};

use super::document::{Effect, Statement};

/// Actions of one document grouped by statement effect.
pub type ActionsByEffect = BTreeMap<Effect, BTreeSet<String>>;

/// Actions of one document grouped by statement Sid.
pub type ActionsBySid = BTreeMap<String, BTreeSet<String>>;

/// Canonicalizes an action string for cross-document comparison.
///
/// The service prefix (everything before the first `:`) is lowercased and the
/// operation is kept verbatim. Strings without a `:` are lowercased entirely.
///
/// # Example
///
/// ```
/// use permcheck::policy::normalize_action;
///
/// assert_eq!(normalize_action("S3:GetObject"), "s3:GetObject");
/// assert_eq!(normalize_action("IAM"), "iam");
/// ```
pub fn normalize_action(action: &str) -> String {
    match action.split_once(':') {
        Some((service, operation)) => format!("{}:{}", service.to_lowercase(), operation),
        None => action.to_lowercase(),
    }
}

/// Groups the actions of the given statements by effect.
///
/// Effects are not validated: an unrecognized effect becomes its own bucket.
pub fn actions_by_effect(statements: &[Statement]) -> ActionsByEffect {
    let mut by_effect = ActionsByEffect::new();

    for statement in statements {
        by_effect
            .entry(statement.effect.clone())
            .or_default()
            .extend(statement.actions.iter().cloned());
    }

    by_effect
}

/// Groups the actions of the given statements by Sid.
///
/// Statements without a Sid share the `"unnamed"` bucket. When several
/// statements carry the same Sid their actions are merged. Effects are ignored.
pub fn actions_by_sid(statements: &[Statement]) -> ActionsBySid {
    let mut by_sid = ActionsBySid::new();

    for statement in statements {
        let sid = statement.sid_or_default();
        if by_sid.contains_key(sid) {
            log::debug!("Merging actions of repeated Sid '{}'", sid);
        }
        by_sid
            .entry(sid.to_string())
            .or_default()
            .extend(statement.actions.iter().cloned());
    }

    by_sid
}
