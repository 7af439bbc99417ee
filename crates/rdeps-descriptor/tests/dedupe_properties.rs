use proptest::prelude::*;
use rdeps_descriptor::{dedupe, identity_key, DigestSet, ResourceDescriptor};
use std::collections::HashSet;

fn descriptor() -> impl Strategy<Value = ResourceDescriptor> {
    (
        prop::sample::select(vec!["", "task", "pipelineTask", "inputs/result"]),
        prop::sample::select(vec!["oci://a", "oci://b", "git+https://c.git"]),
        prop::collection::btree_map(
            prop::sample::select(vec!["sha1", "sha256"]),
            prop::sample::select(vec!["00", "11"]),
            0..=2,
        ),
        prop::collection::vec(any::<u8>(), 0..3),
    )
        .prop_map(|(name, uri, digest, content)| {
            let digest: DigestSet = digest
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            ResourceDescriptor::new(name, uri, digest).with_content(content)
        })
}

proptest! {
    #[test]
    fn prop_dedupe_is_idempotent(input in prop::collection::vec(descriptor(), 0..24)) {
        let once = dedupe(input).unwrap();
        let twice = dedupe(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_dedupe_keeps_first_of_each_identity(input in prop::collection::vec(descriptor(), 0..24)) {
        let out = dedupe(input.clone()).unwrap();

        // Expected: walk the input keeping the first descriptor per (uri, digest).
        let mut seen = HashSet::new();
        let expected: Vec<_> = input
            .into_iter()
            .filter(|rd| seen.insert((rd.uri.clone(), rd.digest.clone())))
            .collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_dedupe_output_keys_are_unique(input in prop::collection::vec(descriptor(), 0..24)) {
        let out = dedupe(input).unwrap();
        let keys: HashSet<_> = out.iter().map(|rd| identity_key(rd).unwrap()).collect();
        prop_assert_eq!(keys.len(), out.len());
    }
}

#[test]
fn identity_ignores_name_and_content() {
    let digest = DigestSet::from([("sha256".to_string(), "zzz".to_string())]);
    let a = ResourceDescriptor::new("", "oci://base", digest.clone());
    let b = ResourceDescriptor::new("inputs/result", "oci://base", digest).with_content(vec![1, 2]);
    assert_eq!(identity_key(&a).unwrap(), identity_key(&b).unwrap());
}
