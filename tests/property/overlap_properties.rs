use std::collections::BTreeSet;

use permcheck::analysis::{OverlapReport, PolicyActions, find_overlaps};
use permcheck::policy::{PolicyDocument, Statement};
use proptest::prelude::*;

fn policies() -> impl Strategy<Value = Vec<PolicyActions>> {
    prop::collection::vec(
        prop::collection::vec("(s3:GetObject|s3:PutObject|ec2:RunInstances)", 0..4),
        0..5,
    )
    .prop_map(|documents| {
        documents
            .into_iter()
            .enumerate()
            .map(|(i, actions)| {
                PolicyActions::from_document(
                    format!("policy-{}.json", i),
                    &PolicyDocument::new(vec![
                        Statement::allow(actions.iter().map(String::as_str))
                            .with_sid(format!("Sid{}", i)),
                    ]),
                )
            })
            .collect()
    })
}

fn canonical(report: &OverlapReport) -> BTreeSet<(String, String, String, String, String)> {
    report
        .iter()
        .flat_map(|(action, pairs)| {
            pairs.iter().map(move |pair| {
                let (first, second, sid_first, sid_second) = pair.canonical_key();
                (
                    action.clone(),
                    first.to_string(),
                    second.to_string(),
                    sid_first.to_string(),
                    sid_second.to_string(),
                )
            })
        })
        .collect()
}

proptest! {
    #[test]
    fn overlaps_do_not_depend_on_policy_order(policies in policies()) {
        let mut reversed = policies.clone();
        reversed.reverse();

        prop_assert_eq!(
            canonical(&find_overlaps(&policies)),
            canonical(&find_overlaps(&reversed))
        );
    }

    #[test]
    fn pairs_always_span_two_documents(policies in policies()) {
        for pairs in find_overlaps(&policies).values() {
            prop_assert!(!pairs.is_empty());
            prop_assert!(pairs.iter().all(|pair| pair.policy_a != pair.policy_b));
        }
    }
}
