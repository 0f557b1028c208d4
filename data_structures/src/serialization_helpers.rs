//! Implement a human-friendly serialization for some types.
//!
//! Byte vectors such as scripts, plutus data, verification keys and signatures are serialized as
//! hexadecimal strings, so that `[13, 53, 125, ...]` becomes `"0d357d..."`.

/// Serialize a `Vec<u8>` as a hexadecimal string.
///
/// Use with `#[serde(with = "hex_bytes")]`.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a lowercase hex string
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Deserialize bytes from a hex string
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
