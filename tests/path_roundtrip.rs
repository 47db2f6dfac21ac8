//! Property tests for the two text forms of a path

use docwalk::Path;
use proptest::prelude::*;

/// Keys never look like array notation, so they render without brackets.
fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9./~'-]{0,6}"
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => key(),
        1 => (0u32..100).prop_map(|idx| idx.to_string()),
        1 => Just("-".to_string()),
    ]
}

fn path() -> impl Strategy<Value = Path> {
    (key(), prop::collection::vec(segment(), 0..6)).prop_map(|(first, rest)| {
        Path::from_segments(std::iter::once(first).chain(rest))
    })
}

proptest! {
    #[test]
    fn json_pointer_round_trips(path in path()) {
        let pointer = path.to_json_pointer();
        prop_assert_eq!(Path::parse_json_pointer(&pointer), path);
    }

    #[test]
    fn jq_display_round_trips(path in path()) {
        let text = path.to_string();
        prop_assert_eq!(Path::parse_jq(&text), path);
    }

    #[test]
    fn pointer_has_one_token_per_segment(path in path()) {
        let pointer = path.to_json_pointer();
        prop_assert_eq!(pointer.matches('/').count(), path.len());
    }
}

#[test]
fn test_kubernetes_keys_in_both_forms() {
    let from_jq = Path::parse_jq("metadata.annotations.'kubernetes.io/change-cause'");
    let from_pointer = Path::parse_json_pointer("/metadata/annotations/kubernetes.io~1change-cause");

    assert_eq!(from_jq, from_pointer);
    assert_eq!(
        from_jq.to_json_pointer(),
        "/metadata/annotations/kubernetes.io~1change-cause"
    );
    assert_eq!(
        from_jq.to_string(),
        "metadata.annotations.'kubernetes.io/change-cause'"
    );
}
