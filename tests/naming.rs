// ABOUTME: Property tests for stack and function naming.
// ABOUTME: Companion names stay short, suffixed, deterministic, and distinct for long orgs.

use proptest::prelude::*;
use tdlctl::types::{COMPANION_MAX_LEN, COMPANION_SUFFIX, FunctionName, StackName};

fn org() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,40}"
}

fn stage() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,10}"
}

proptest! {
    #[test]
    fn companion_is_bounded_and_suffixed(org in org(), stage in stage()) {
        let name = StackName::new(&org, &stage).unwrap();
        let companion = name.companion();

        prop_assert!(companion.len() <= COMPANION_MAX_LEN);
        prop_assert!(companion.ends_with(COMPANION_SUFFIX));
        prop_assert_eq!(companion, StackName::new(&org, &stage).unwrap().companion());
    }

    #[test]
    fn companion_ignores_stage(org in org(), a in stage(), b in stage()) {
        let first = StackName::new(&org, &a).unwrap().companion();
        let second = StackName::new(&org, &b).unwrap().companion();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn short_orgs_are_kept_verbatim(org in "[a-z0-9]{1,14}") {
        let name = StackName::new(&org, "prod").unwrap();
        prop_assert_eq!(name.companion(), format!("{org}{COMPANION_SUFFIX}"));
    }

    #[test]
    fn parse_inverts_new(org in org(), stage in stage()) {
        let name = StackName::new(&org, &stage).unwrap();
        let parsed = StackName::parse(name.as_str()).unwrap();
        prop_assert_eq!(parsed, name);
    }

    #[test]
    fn qualification_is_idempotent(command in "[a-z][a-z-]{0,20}") {
        let stack = StackName::new("acme", "prod").unwrap();
        let once = FunctionName::qualify(&stack, &command);
        let twice = FunctionName::qualify(&stack, once.as_str());

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.short_name(&stack), command.as_str());
    }
}

#[test]
fn long_orgs_sharing_a_prefix_get_distinct_companions() {
    let first = StackName::new("averylongorganization-one", "prod").unwrap();
    let second = StackName::new("averylongorganization-two", "prod").unwrap();

    assert_ne!(first.companion(), second.companion());
    assert_eq!(first.companion().len(), COMPANION_MAX_LEN);
    assert!(first.companion().starts_with("averylongo"));
}
