//! Property tests for the version suffix algorithm and rule matching.
//!
//! ```bash
//! cargo test --test property
//! ```

use depalign_cli::coordinate::Coordinate;
use depalign_cli::pattern::DependencyRule;
use depalign_cli::version::next_version;
use proptest::prelude::*;

/// Versions that do not already end in a `-<suffix>-<digits>` tail.
fn base_version() -> impl Strategy<Value = String> {
    "[0-9]{1,3}(\\.[0-9]{1,3}){0,2}(\\.(Final|RELEASE|GA))?"
}

fn suffix_name() -> impl Strategy<Value = String> {
    "[a-z]{2,10}"
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}(\\.[a-z][a-z0-9]{0,6}){0,2}"
}

fn trailing_number(version: &str) -> u64 {
    version.rsplit('-').next().and_then(|n| n.parse().ok()).unwrap_or(0)
}

proptest! {
    #[test]
    fn suffix_increments_by_one_per_application(
        base in base_version(),
        suffix in suffix_name(),
        padding in 1usize..8,
        k in 1usize..12,
    ) {
        let mut version = base.clone();
        for _ in 0..k {
            version = next_version(&version, &suffix, padding);
        }

        let prefix = format!("{base}-{suffix}-");
        prop_assert!(version.starts_with(&prefix));
        prop_assert_eq!(trailing_number(&version), k as u64);
        let digits = version.rsplit('-').next().unwrap_or_default();
        prop_assert!(digits.len() >= padding);
    }

    #[test]
    fn suffix_continues_existing_counter(
        base in base_version(),
        suffix in suffix_name(),
        start in 0u64..100_000,
        padding in 1usize..8,
    ) {
        let version = format!("{base}-{suffix}-{start}");
        let next = next_version(&version, &suffix, padding);
        let prefix = format!("{base}-{suffix}-");
        prop_assert_eq!(trailing_number(&next), start + 1);
        prop_assert!(next.starts_with(&prefix));
    }

    #[test]
    fn foreign_suffix_is_never_incremented(
        base in base_version(),
        counter in 0u64..1000,
        padding in 1usize..8,
    ) {
        let version = format!("{base}-other-{counter}");
        let next = next_version(&version, "redhat", padding);
        let expected = format!("{version}-redhat-{:0>padding$}", 1);
        prop_assert_eq!(next, expected);
    }

    #[test]
    fn group_wildcard_matches_any_artifact_from_any_module(
        group in segment(),
        artifact in segment(),
        version in base_version(),
        owner_group in segment(),
        owner_artifact in segment(),
    ) {
        let rule = DependencyRule::parse(&format!("{group}:*@*")).unwrap();
        let candidate = Coordinate::new(&group, &artifact, &version);
        let owner = Coordinate::new(&owner_group, &owner_artifact, "1.0");
        prop_assert!(rule.matches(&candidate, &owner));

        let other = Coordinate::new(format!("{group}x"), &artifact, &version);
        prop_assert!(!rule.matches(&other, &owner));
    }

    #[test]
    fn exact_rule_matches_only_its_module(
        group in segment(),
        artifact in segment(),
        owner_group in segment(),
        owner_artifact in segment(),
        other_artifact in segment(),
    ) {
        prop_assume!(other_artifact != owner_artifact);
        let rule = DependencyRule::parse(
            &format!("{group}:{artifact}@{owner_group}:{owner_artifact}"),
        ).unwrap();
        let candidate = Coordinate::new(&group, &artifact, "1.0");

        prop_assert!(rule.matches(&candidate, &Coordinate::new(&owner_group, &owner_artifact, "9")));
        prop_assert!(!rule.matches(&candidate, &Coordinate::new(&owner_group, &other_artifact, "9")));
    }

    #[test]
    fn full_wildcard_matches_everything(
        group in segment(),
        artifact in segment(),
        owner_group in segment(),
        owner_artifact in segment(),
    ) {
        let rule = DependencyRule::parse("*:*@*").unwrap();
        prop_assert!(rule.matches(
            &Coordinate::new(&group, &artifact, "1.0"),
            &Coordinate::new(&owner_group, &owner_artifact, "1.0"),
        ));
    }
}
