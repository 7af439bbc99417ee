//! Content-addressed deduplication of resolved dependencies
//!
//! Two descriptors are the same dependency when their canonical
//! `{uri, digest}` serialization hashes to the same [`ContentHash`]. Role
//! names and embedded content do not take part in identity, so an image
//! reported both as a step image and as a typed result survives once.

use crate::descriptor::{DigestSet, ResourceDescriptor};
use crate::error::DescriptorError;
use crate::hash::ContentHash;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Serialize)]
struct Coordinates<'a> {
    uri: &'a str,
    digest: &'a DigestSet,
}

/// Identity key of a descriptor
///
/// Content-only descriptors (empty uri and digest) are keyed on their
/// content, since that is the only coordinate they carry.
///
/// # Errors
/// Returns [`DescriptorError::Marshal`] if the coordinates cannot be
/// serialized.
pub fn identity_key(rd: &ResourceDescriptor) -> Result<ContentHash, DescriptorError> {
    if rd.uri.is_empty() && rd.digest.is_empty() {
        return Ok(ContentHash::compute(&rd.content));
    }
    ContentHash::compute_serializable(&Coordinates {
        uri: &rd.uri,
        digest: &rd.digest,
    })
    .map_err(|source| DescriptorError::Marshal {
        uri: rd.uri.clone(),
        source,
    })
}

/// Remove duplicate dependencies, first occurrence wins
///
/// Not a sort: surviving entries keep the relative order of their first
/// occurrence.
///
/// # Errors
/// Fails if any descriptor cannot be canonicalized.
pub fn dedupe<I>(descriptors: I) -> Result<Vec<ResourceDescriptor>, DescriptorError>
where
    I: IntoIterator<Item = ResourceDescriptor>,
{
    let mut seen: IndexMap<ContentHash, ResourceDescriptor> = IndexMap::new();
    for rd in descriptors {
        match seen.entry(identity_key(&rd)?) {
            Entry::Occupied(kept) => {
                tracing::trace!(
                    key = %kept.key().short(),
                    kept = %kept.get().name,
                    dropped = %rd.name,
                    "duplicate dependency"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(rd);
            }
        }
    }
    Ok(seen.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rd(name: &str, uri: &str, alg: &str, hex: &str) -> ResourceDescriptor {
        ResourceDescriptor::new(name, uri, DigestSet::from([(alg.to_string(), hex.to_string())]))
    }

    #[test]
    fn first_occurrence_wins_regardless_of_name() {
        let out = dedupe(vec![
            rd("", "oci://base", "sha256", "zzz"),
            rd("inputs/result", "oci://base", "sha256", "zzz"),
        ])
        .unwrap();
        assert_eq!(out, vec![rd("", "oci://base", "sha256", "zzz")]);
    }

    #[test]
    fn content_does_not_affect_identity() {
        let with_content = rd("pipelineTask", "git+https://x.git", "sha1", "a").with_content(vec![7]);
        let out = dedupe(vec![
            with_content.clone(),
            rd("task", "git+https://x.git", "sha1", "a"),
        ])
        .unwrap();
        assert_eq!(out, vec![with_content]);
    }

    #[test]
    fn different_digest_is_distinct() {
        let out = dedupe(vec![
            rd("", "oci://base", "sha256", "a"),
            rd("", "oci://base", "sha256", "b"),
            rd("", "oci://base", "sha512", "a"),
        ])
        .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn empty_digest_dedupes_on_uri() {
        let out = dedupe(vec![
            ResourceDescriptor::new("a", "oci://x", DigestSet::new()),
            ResourceDescriptor::new("b", "oci://x", DigestSet::new()),
            ResourceDescriptor::new("c", "oci://y", DigestSet::new()),
        ])
        .unwrap();
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn content_only_descriptors_keyed_on_content() {
        let a = ResourceDescriptor::new("pipelineTask", "", DigestSet::new()).with_content(b"a".to_vec());
        let b = ResourceDescriptor::new("pipelineTask", "", DigestSet::new()).with_content(b"b".to_vec());
        let out = dedupe(vec![a.clone(), b.clone(), a.clone()]).unwrap();
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn keeps_order_of_first_occurrence() {
        let out = dedupe(vec![
            rd("1", "oci://c", "sha256", "1"),
            rd("2", "oci://a", "sha256", "1"),
            rd("3", "oci://c", "sha256", "1"),
            rd("4", "oci://b", "sha256", "1"),
        ])
        .unwrap();
        let uris: Vec<_> = out.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["oci://c", "oci://a", "oci://b"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dedupe(Vec::new()).unwrap().is_empty());
    }
}
