//! Error type definitions for the data structure module.

use std::fmt;

use thiserror::Error;

use crate::chain::{Hash, KeyHash, Lovelace, OutputPointer, RewardAddress, ScriptHash, Slot};

/// Failure reported by a `LedgerCodec` implementation
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("failed to decode transaction: {0}")]
    Transaction(String),
    #[error("failed to encode {0}")]
    Encoding(String),
    #[error("invalid verification key: {0}")]
    VerificationKey(String),
    #[error("invalid {kind} script: {msg}")]
    Script { kind: String, msg: String },
    #[error("invalid address {address}: {msg}")]
    Address { address: String, msg: String },
    #[error("cannot build reward address: {0}")]
    Credential(String),
}

/// Which bound of the validity interval was violated
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValidityWindowKind {
    /// The current slot is before the first valid slot
    NotYetValid,
    /// The current slot is after the last valid slot
    Expired,
}

impl fmt::Display for ValidityWindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityWindowKind::NotYetValid => f.write_str("not yet valid"),
            ValidityWindowKind::Expired => f.write_str("expired"),
        }
    }
}

/// Role of an output pointer inside a transaction
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputPurpose {
    Spend,
    Reference,
    Collateral,
}

impl fmt::Display for InputPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPurpose::Spend => f.write_str("input"),
            InputPurpose::Reference => f.write_str("reference input"),
            InputPurpose::Collateral => f.write_str("collateral input"),
        }
    }
}

/// Witness that failed verification
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InvalidWitnessKind {
    /// Signature does not verify against the transaction hash
    Key(KeyHash),
    /// Native script is not satisfied
    Script(ScriptHash),
}

impl fmt::Display for InvalidWitnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidWitnessKind::Key(key_hash) => write!(f, "vkey witness {}", key_hash),
            InvalidWitnessKind::Script(script_hash) => write!(f, "native script {}", script_hash),
        }
    }
}

/// Reasons a submitted transaction is rejected
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("transaction is {kind}: bound {bound}, current slot {slot}")]
    ValidityWindow {
        kind: ValidityWindowKind,
        bound: Slot,
        slot: Slot,
    },
    #[error("{purpose} {output} is missing or already spent")]
    MissingUtxo {
        output: OutputPointer,
        purpose: InputPurpose,
    },
    #[error("invalid {witness}")]
    InvalidWitness { witness: InvalidWitnessKind },
    #[error("missing vkey witness for key hash {key_hash}")]
    MissingVkeyWitness { key_hash: KeyHash },
    #[error("missing script witness for script hash {script_hash}")]
    MissingScriptWitness { script_hash: ScriptHash },
    #[error(
        "withdrawal of {requested} from {reward_address} does not match the available rewards {available}"
    )]
    WithdrawalMismatch {
        reward_address: RewardAddress,
        requested: Lovelace,
        available: Lovelace,
    },
    #[error("stake credential {reward_address} is already registered")]
    StakeAlreadyRegistered { reward_address: RewardAddress },
    #[error("stake credential {reward_address} is not registered")]
    StakeNotRegistered { reward_address: RewardAddress },
    #[error("extraneous vkey witness {key_hash}")]
    ExtraneousWitness { key_hash: KeyHash },
    #[error("extraneous script witness {script_hash}")]
    ExtraneousScript { script_hash: ScriptHash },
    #[error("extraneous plutus data {datum_hash}")]
    ExtraneousDatum { datum_hash: Hash },
    #[error("collateral input {output} is locked by a script")]
    CollateralCredential { output: OutputPointer },
    #[error(transparent)]
    Codec(#[from] CodecError),
}
