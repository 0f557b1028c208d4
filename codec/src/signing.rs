use emulator_crypto::{
    secp256k1::SecretKey,
    signature::{public_key, sign},
};
use emulator_data_structures::{
    codec::LedgerCodec,
    error::CodecError,
    transaction::{Transaction, VkeyWitness},
};

use crate::cbor::CborCodec;

/// Sign the hash of the transaction body and append the witness to the transaction
pub fn sign_transaction(
    codec: &CborCodec,
    tx: &mut Transaction,
    secret_key: &SecretKey,
) -> Result<(), CodecError> {
    let witness = vkey_witness(codec, tx, secret_key)?;
    tx.witness_set.vkey_witnesses.push(witness);

    Ok(())
}

/// Build the vkey witness of `secret_key` for `tx` without attaching it
pub fn vkey_witness(
    codec: &CborCodec,
    tx: &Transaction,
    secret_key: &SecretKey,
) -> Result<VkeyWitness, CodecError> {
    let tx_hash = codec.hash_transaction(&tx.body)?;
    let signature = sign(secret_key, tx_hash.as_bytes())
        .map_err(|e| CodecError::Encoding(format!("signature: {}", e)))?;

    Ok(VkeyWitness {
        vkey: public_key(secret_key).serialize().to_vec(),
        signature: signature.serialize_compact().to_vec(),
    })
}
