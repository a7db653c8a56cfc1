use sha2::{Digest, Sha256};

/// Stable fingerprint of a fixed tuple of request fields.
///
/// Each part is length-prefixed before hashing so `["ab", "c"]` and
/// `["a", "bc"]` cannot collide. Callers pass a fixed, documented sequence of
/// fields (never an open-ended object), which keeps the key stable when
/// unrelated fields are added to a request type.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
