//! Series signatures: a fixed-width hash of a tag set under a matching rule.
//!
//! Collisions are possible in principle (64-bit space) and are not corrected
//! for; two series with equal signatures are treated as the same identity.

use blake3::Hasher;

use crate::matching::VectorMatching;
use crate::tags::Tags;

pub type Signature = u64;

// 0xFE/0xFF never occur in UTF-8, so they cannot collide with tag text.
const KEY_VALUE_SEP: u8 = 0xFE;
const PAIR_SEP: u8 = 0xFF;

fn hash_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Signature {
    let mut h = Hasher::new();
    for (k, v) in pairs {
        h.update(k.as_bytes());
        h.update(&[KEY_VALUE_SEP]);
        h.update(v.as_bytes());
        h.update(&[PAIR_SEP]);
    }
    let out = h.finalize();
    let mut first = [0u8; 8];
    first.copy_from_slice(&out.as_bytes()[..8]);
    u64::from_le_bytes(first)
}

/// Signature over every tag.
pub fn tags_signature(tags: &Tags) -> Signature {
    hash_pairs(tags.iter())
}

/// Build the signature function for a matching rule.
///
/// `on` hashes only the named labels, otherwise the named labels are dropped
/// and everything else is hashed. The returned closure owns a copy of the
/// label list, so it can be created once and applied to every series on both
/// sides of an operation.
pub fn signature_func(matching: &VectorMatching) -> impl Fn(&Tags) -> Signature {
    let on = matching.on;
    let names = matching.matching_labels.clone();
    move |tags: &Tags| {
        if on {
            tags_signature(&tags.with_keys(&names))
        } else {
            tags_signature(&tags.without_keys(&names))
        }
    }
}
