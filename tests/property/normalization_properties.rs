use permcheck::policy::normalize_action;
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalization_is_idempotent(action in "[A-Za-z0-9:*_-]{0,40}") {
        let once = normalize_action(&action);
        prop_assert_eq!(normalize_action(&once), once);
    }

    #[test]
    fn operation_case_is_preserved(service in "[A-Za-z0-9]{1,10}", operation in "[A-Za-z*]{1,20}") {
        let normalized = normalize_action(&format!("{}:{}", service, operation));
        prop_assert_eq!(normalized, format!("{}:{}", service.to_lowercase(), operation));
    }

    #[test]
    fn service_case_never_matters(service in "[A-Za-z0-9]{1,10}", operation in "[A-Za-z]{1,20}") {
        let upper = normalize_action(&format!("{}:{}", service.to_uppercase(), operation));
        let lower = normalize_action(&format!("{}:{}", service.to_lowercase(), operation));
        prop_assert_eq!(upper, lower);
    }
}
