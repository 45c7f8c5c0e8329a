//! Fingerprinting of the desired input set.
//!
//! Plans record the fingerprint of the inputs they were computed from, so a
//! plan can be matched to the document that produced it.

use sha2::{Digest, Sha256};

use crate::planner::FieldValue;

use super::spec::InputSpec;

/// Hasher for computing configuration fingerprints.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Computes a fingerprint of the whole input list.
    ///
    /// Order-sensitive: reordering inputs changes the plan order, so it
    /// changes the fingerprint too.
    #[must_use]
    pub fn hash_inputs(inputs: &[InputSpec]) -> String {
        let mut hasher = Sha256::new();
        for input in inputs {
            hasher.update(Self::hash_input(input).as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Computes a fingerprint of a single input.
    ///
    /// Only populated configuration fields contribute, so adding a field
    /// with its zero value leaves the fingerprint unchanged.
    #[must_use]
    pub fn hash_input(input: &InputSpec) -> String {
        let mut hasher = Sha256::new();

        hasher.update(input.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(input.input_type.as_bytes());
        hasher.update([0u8]);
        hasher.update(if input.global { [1u8] } else { [0u8] });

        for (name, value) in input.configuration.populated_fields() {
            hasher.update(name.as_bytes());
            hasher.update([b'=']);
            match value {
                FieldValue::Bool(b) => hasher.update([u8::from(b)]),
                FieldValue::Int(n) => hasher.update(n.to_be_bytes()),
                FieldValue::Str(s) => hasher.update(s.as_bytes()),
            }
            hasher.update([0u8]);
        }

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}
