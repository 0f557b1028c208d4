use std::collections::HashSet;

use emulator_crypto::{
    hash::{calculate_hash224, calculate_sha256},
    secp256k1,
    signature::{verify, PublicKey, Signature},
};
use emulator_data_structures::{
    chain::{
        Address, AddressDetails, Credential, Hash, KeyHash, PlutusData, RewardAddress, Script,
        ScriptHash, ScriptKind, Slot,
    },
    codec::LedgerCodec,
    error::CodecError,
    transaction::{Transaction, TransactionBody},
};

use crate::{address, native_script::NativeScript};

/// Reference codec: transactions travel as CBOR-encoded serde structures, keys are
/// compressed secp256k1 public keys and witnesses carry 64-byte compact signatures of
/// the transaction hash.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CborCodec {
    /// Network id written into the addresses this codec builds
    pub network_id: u8,
}

impl CborCodec {
    pub fn new(network_id: u8) -> Self {
        Self { network_id }
    }

    /// Encode a transaction in the wire format accepted by `parse_transaction`
    pub fn serialize_transaction(&self, tx: &Transaction) -> Result<Vec<u8>, CodecError> {
        serde_cbor::to_vec(tx).map_err(|e| CodecError::Encoding(format!("transaction: {}", e)))
    }

    fn script_tag(kind: ScriptKind) -> u8 {
        match kind {
            ScriptKind::Native => 0,
            ScriptKind::PlutusV1 => 1,
            ScriptKind::PlutusV2 => 2,
        }
    }
}

impl LedgerCodec for CborCodec {
    fn network_id(&self) -> u8 {
        self.network_id
    }

    fn parse_transaction(&self, bytes: &[u8]) -> Result<Transaction, CodecError> {
        serde_cbor::from_slice(bytes).map_err(|e| CodecError::Transaction(e.to_string()))
    }

    fn hash_transaction(&self, body: &TransactionBody) -> Result<Hash, CodecError> {
        let bytes = serde_cbor::to_vec(body)
            .map_err(|e| CodecError::Encoding(format!("transaction body: {}", e)))?;

        Ok(calculate_sha256(&bytes).into())
    }

    fn hash_datum(&self, datum: &PlutusData) -> Hash {
        calculate_sha256(&datum.0).into()
    }

    fn key_hash(&self, vkey: &[u8]) -> Result<KeyHash, CodecError> {
        let public_key =
            PublicKey::from_slice(vkey).map_err(|e| CodecError::VerificationKey(e.to_string()))?;

        Ok(KeyHash::from(calculate_hash224(&public_key.serialize())))
    }

    fn verify_signature(&self, vkey: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let public_key = match PublicKey::from_slice(vkey) {
            Ok(public_key) => public_key,
            Err(e) => {
                log::debug!("Malformed verification key: {}", e);
                return false;
            }
        };
        let signature = match Signature::from_compact(signature) {
            Ok(signature) => signature,
            Err(e) => {
                log::debug!("Malformed signature: {}", e);
                return false;
            }
        };

        verify(&public_key, message, &signature).is_ok()
    }

    fn script_hash(&self, script: &Script) -> Result<ScriptHash, CodecError> {
        let mut bytes = Vec::with_capacity(script.bytes.len() + 1);
        bytes.push(Self::script_tag(script.kind));
        bytes.extend_from_slice(&script.bytes);

        Ok(ScriptHash::from(calculate_hash224(&bytes)))
    }

    fn native_script_signers(&self, script: &Script) -> Result<Vec<KeyHash>, CodecError> {
        Ok(NativeScript::from_script(script)?.required_signers())
    }

    fn verify_native_script(
        &self,
        script: &Script,
        lower_bound: Option<Slot>,
        upper_bound: Option<Slot>,
        signers: &HashSet<KeyHash>,
    ) -> Result<bool, CodecError> {
        Ok(NativeScript::from_script(script)?.evaluate(lower_bound, upper_bound, signers))
    }

    fn address_details(&self, address: &Address) -> Result<AddressDetails, CodecError> {
        address::address_details(address)
    }

    fn reward_address(&self, credential: &Credential) -> Result<RewardAddress, CodecError> {
        address::reward_address(self.network_id, credential)
    }
}

/// Key hash of the public key that corresponds to `secret_key`
pub fn key_hash_of(secret_key: &secp256k1::SecretKey) -> KeyHash {
    let public_key = emulator_crypto::signature::public_key(secret_key);

    KeyHash::from(calculate_hash224(&public_key.serialize()))
}
