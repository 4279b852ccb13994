use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const RECORD_ID_PREFIX: &str = "rec";

const SHORT_HASH_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 64;

/// Short, prefix-tagged id for rows in the local table. `exists` reports
/// collisions with ids already stored.
pub fn generate_record_id<F>(mut exists: F) -> String
where
    F: FnMut(&str) -> bool,
{
    for _ in 0..MAX_ATTEMPTS {
        let seed = Uuid::now_v7().to_string();
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        let candidate = format!("{}-{}", RECORD_ID_PREFIX, &digest[..SHORT_HASH_LEN]);
        if !exists(&candidate) {
            return candidate;
        }
    }

    format!("{}-{}", RECORD_ID_PREFIX, Uuid::now_v7().simple())
}
