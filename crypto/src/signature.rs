//! Signature module

use secp256k1::{Error, Message, SecretKey, SECP256K1};

/// Signature
pub type Signature = secp256k1::ecdsa::Signature;

/// PublicKey
pub type PublicKey = secp256k1::PublicKey;

/// Derive the public key that corresponds to `secret_key`.
pub fn public_key(secret_key: &SecretKey) -> PublicKey {
    PublicKey::from_secret_key(SECP256K1, secret_key)
}

/// Sign `data` with provided secret key. `data` must be the 32-byte output of a cryptographically
/// secure hash function, otherwise this function is not secure.
/// - Returns an Error if data is not a 32-byte array
pub fn sign(secret_key: &SecretKey, data: &[u8]) -> Result<Signature, Error> {
    let msg = Message::from_digest_slice(data)?;

    Ok(SECP256K1.sign_ecdsa(&msg, secret_key))
}

/// Verify signature with a provided public key.
/// - Returns an Error if data is not a 32-byte array
pub fn verify(public_key: &PublicKey, data: &[u8], sig: &Signature) -> Result<(), Error> {
    let msg = Message::from_digest_slice(data)?;

    SECP256K1.verify_ecdsa(&msg, sig, public_key)
}
