//! Property-based tests for volume spec parsing and device paths.
//!
//! These tests use proptest to generate random specs and verify that the
//! parsing and path invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::volume::{device_path, BindMountMatcher};
    use proptest::prelude::*;
    use std::path::Path;

    // ============================================================================
    // BindMountMatcher property tests
    // ============================================================================

    proptest! {
        /// Property: source and destination rejoin to the input string
        #[test]
        fn parse_splits_at_a_colon(spec in r"\.[a-zA-Z0-9_./-]*:[a-zA-Z0-9_./:-]*") {
            let matcher = BindMountMatcher::new().unwrap();
            let binding = matcher.parse(&spec).expect("relative spec should match");
            prop_assert_eq!(
                format!("{}:{}", binding.relative_source, binding.destination_with_options),
                spec
            );
        }

        /// Property: the source never contains a colon (first colon splits)
        #[test]
        fn parse_source_has_no_colon(
            source in r"\.[a-zA-Z0-9_/-]*",
            dest in r"/[a-z]+(:ro|:rw|:cached|:delegated)?",
        ) {
            let matcher = BindMountMatcher::new().unwrap();
            let binding = matcher.parse(&format!("{}:{}", source, dest)).unwrap();
            prop_assert_eq!(binding.relative_source, source);
            prop_assert_eq!(binding.destination_with_options, dest);
        }

        /// Property: specs not starting with '.' never match
        #[test]
        fn parse_rejects_non_dot_sources(spec in r"[a-zA-Z0-9_/~-][a-zA-Z0-9_./:-]*") {
            let matcher = BindMountMatcher::new().unwrap();
            prop_assert!(matcher.parse(&spec).is_none());
        }
    }

    // ============================================================================
    // device_path property tests
    // ============================================================================

    proptest! {
        /// Property: device paths start with ":" followed by the project dir
        #[test]
        fn device_path_is_rooted_in_project(
            dir in r"(/[a-z0-9]{1,8}){1,4}",
            rest in r"[a-z0-9_]{0,8}(/[a-z0-9_]{1,8}){0,3}",
        ) {
            let device = device_path(Path::new(&dir), &format!("./{}", rest));
            let prefix = format!(":{}", dir);
            prop_assert!(device.starts_with(&prefix));
            if rest.is_empty() {
                prop_assert_eq!(device, format!(":{}", dir));
            } else {
                prop_assert_eq!(device, format!(":{}/{}", dir, rest));
            }
        }

        /// Property: device_path is deterministic
        #[test]
        fn device_path_is_deterministic(rest in r"\.[a-z0-9/]{0,12}") {
            let dir = Path::new("/work/app");
            prop_assert_eq!(device_path(dir, &rest), device_path(dir, &rest));
        }
    }
}
