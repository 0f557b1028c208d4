use std::collections::HashSet;

use crate::{
    chain::{
        Address, AddressDetails, Credential, Hash, KeyHash, PlutusData, RewardAddress, Script,
        ScriptHash, Slot,
    },
    error::CodecError,
    transaction::{Transaction, TransactionBody},
};

/// Binary codec and cryptographic capabilities the ledger relies on.
///
/// The ledger never decodes bytes, hashes or checks signatures on its own: every such
/// operation goes through this trait, so that validation can be exercised with any
/// wire format.
pub trait LedgerCodec {
    /// Network id written into the addresses this codec builds
    fn network_id(&self) -> u8;

    /// Decode a serialized transaction
    fn parse_transaction(&self, bytes: &[u8]) -> Result<Transaction, CodecError>;

    /// Hash of the transaction body; vkey witnesses sign this hash
    fn hash_transaction(&self, body: &TransactionBody) -> Result<Hash, CodecError>;

    /// Hash of a datum
    fn hash_datum(&self, datum: &PlutusData) -> Hash;

    /// Hash of a serialized verification key
    fn key_hash(&self, vkey: &[u8]) -> Result<KeyHash, CodecError>;

    /// Returns `true` if `signature` is a valid signature of `message` by `vkey`
    fn verify_signature(&self, vkey: &[u8], message: &[u8], signature: &[u8]) -> bool;

    /// Hash of a script of any language
    fn script_hash(&self, script: &Script) -> Result<ScriptHash, CodecError>;

    /// Key hashes a native script refers to
    fn native_script_signers(&self, script: &Script) -> Result<Vec<KeyHash>, CodecError>;

    /// Evaluate a native script against the transaction validity interval and the set
    /// of key hashes whose signatures were verified
    fn verify_native_script(
        &self,
        script: &Script,
        lower_bound: Option<Slot>,
        upper_bound: Option<Slot>,
        signers: &HashSet<KeyHash>,
    ) -> Result<bool, CodecError>;

    /// Payment and stake credentials of an address
    fn address_details(&self, address: &Address) -> Result<AddressDetails, CodecError>;

    /// Reward address controlled by a stake credential
    fn reward_address(&self, credential: &Credential) -> Result<RewardAddress, CodecError>;
}
