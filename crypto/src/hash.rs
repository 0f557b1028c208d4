//! Various hash functions

use sha2::{Digest, Sha256 as Sha256Hasher};

/// Length in bytes of a 224-bit digest, the size of key hashes and script hashes
pub const HASH_224_LENGTH: usize = 28;

/// SHA-256 Hash
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Sha256(pub [u8; 32]);

/// Calculate the SHA256 hash
pub fn calculate_sha256(bytes: &[u8]) -> Sha256 {
    let digest = Sha256Hasher::digest(bytes);
    let mut hash = [0; 32];
    hash.copy_from_slice(&digest);

    Sha256(hash)
}

/// Calculate a 224-bit digest of `bytes`, defined as the leading 28 bytes of its SHA256 hash
pub fn calculate_hash224(bytes: &[u8]) -> [u8; HASH_224_LENGTH] {
    let Sha256(full) = calculate_sha256(bytes);
    let mut hash = [0; HASH_224_LENGTH];
    hash.copy_from_slice(&full[..HASH_224_LENGTH]);

    hash
}
