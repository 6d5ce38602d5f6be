//! Property tests for path normalization

use docpub_core::PathMappingPolicy;
use docpub_core::path::normalize;
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = PathMappingPolicy> {
    (any::<bool>(), "[a-z /<>:]{0,12}").prop_map(|(keep, dir)| PathMappingPolicy {
        keep_file_structure: keep,
        default_directory: dir,
    })
}

proptest! {
    #[test]
    fn test_normalize_is_idempotent(
        raw in "[a-zA-Z0-9 ./<>:\"|?*\\\\\u{3000}-]{0,40}",
        policy in policy_strategy(),
        explicit in proptest::option::of("[a-z/ ]{0,10}"),
    ) {
        let once = normalize(&raw, &policy, explicit.as_deref());
        let twice = normalize(&once, &policy, explicit.as_deref());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_output_is_clean(
        raw in "[a-zA-Z0-9 /<>:|?*\t]{1,40}",
        policy in policy_strategy(),
    ) {
        let result = normalize(&raw, &policy, None);
        prop_assume!(!result.is_empty());

        prop_assert!(result.to_ascii_lowercase().ends_with(".md"));
        prop_assert!(!result.starts_with('/'));
        prop_assert!(!result.ends_with('/'));
        prop_assert!(!result.contains("//"));
        prop_assert!(!result.chars().any(|c| "<>:\"|?*\\".contains(c) || c.is_whitespace()));
    }

    #[test]
    fn test_flat_policy_has_single_segment_without_directory(
        raw in "[a-z]{1,5}(/[a-z]{1,5}){0,4}",
    ) {
        let policy = PathMappingPolicy {
            keep_file_structure: false,
            default_directory: String::new(),
        };
        let result = normalize(&raw, &policy, None);
        prop_assert!(!result.contains('/'));
    }
}
