//! Witness bookkeeping: which witnesses a transaction carries, which scripts it may use
//! through reference inputs, and which of them have been consumed by some requirement.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use emulator_data_structures::{
    chain::{Credential, Hash, KeyHash, PlutusData, Script, ScriptHash, ScriptKind, Slot},
    codec::LedgerCodec,
    error::{InvalidWitnessKind, TransactionError},
    transaction::{Redeemer, RedeemerTag},
};

/// Redeemer slot a script credential must be covered by
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScriptPurpose {
    /// Kind of purpose
    pub tag: RedeemerTag,
    /// Position inside the list the purpose belongs to
    pub index: u32,
}

impl ScriptPurpose {
    /// Build a purpose from a list position
    pub fn new(tag: RedeemerTag, index: usize) -> Self {
        Self {
            tag,
            index: index as u32,
        }
    }
}

/// Witnesses carried by the transaction that passed verification
#[derive(Clone, Debug, Default)]
pub struct VerifiedWitnesses {
    /// Key hashes of the vkey witnesses, in witness order
    pub key_hashes: Vec<KeyHash>,
    /// Hashes of the native scripts, in witness order
    pub native_scripts: Vec<ScriptHash>,
    /// Hashes of the plutus scripts, in witness order
    pub plutus_scripts: Vec<ScriptHash>,
    /// Datums of the witness set indexed by hash
    pub datums: BTreeMap<Hash, PlutusData>,
    /// Same as `key_hashes`, for lookups
    pub signers: HashSet<KeyHash>,
}

/// Scripts made available by the outputs that the transaction spends or references.
/// They may be used but never count as extraneous.
#[derive(Clone, Debug, Default)]
pub struct OptionalScripts {
    /// Native scripts indexed by hash
    pub native: BTreeMap<ScriptHash, Script>,
    /// Plutus script hashes
    pub plutus: BTreeSet<ScriptHash>,
}

impl OptionalScripts {
    /// Register the reference script of a resolved output
    pub fn insert<C: LedgerCodec>(
        &mut self,
        codec: &C,
        script: &Script,
    ) -> Result<(), TransactionError> {
        let script_hash = codec.script_hash(script)?;
        match script.kind {
            ScriptKind::Native => {
                self.native.insert(script_hash, script.clone());
            }
            ScriptKind::PlutusV1 | ScriptKind::PlutusV2 => {
                self.plutus.insert(script_hash);
            }
        }

        Ok(())
    }
}

/// Witnesses and datums that some requirement of the transaction has used
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConsumedWitnesses {
    /// Consumed key hashes
    pub keys: HashSet<KeyHash>,
    /// Consumed script hashes
    pub scripts: HashSet<ScriptHash>,
    /// Consumed datum hashes
    pub datums: HashSet<Hash>,
}

impl ConsumedWitnesses {
    /// Mark every key hash in `keys` as consumed
    pub fn consume_keys<I: IntoIterator<Item = KeyHash>>(&mut self, keys: I) {
        self.keys.extend(keys);
    }

    /// Mark a datum hash as consumed
    pub fn consume_datum(&mut self, datum_hash: Hash) {
        self.datums.insert(datum_hash);
    }
}

/// Everything needed to decide whether a credential is satisfied by the transaction
pub struct WitnessContext<'a, C> {
    /// Codec used to evaluate native scripts
    pub codec: &'a C,
    /// Verified witnesses of the transaction
    pub verified: &'a VerifiedWitnesses,
    /// Scripts available through spent and reference inputs
    pub optional: &'a OptionalScripts,
    /// Redeemers of the transaction
    pub redeemers: &'a [Redeemer],
    /// First valid slot
    pub lower_bound: Option<Slot>,
    /// Last valid slot
    pub upper_bound: Option<Slot>,
}

impl<'a, C: LedgerCodec> WitnessContext<'a, C> {
    fn has_redeemer(&self, purpose: Option<ScriptPurpose>) -> bool {
        match purpose {
            Some(purpose) => self
                .redeemers
                .iter()
                .any(|redeemer| redeemer.tag == purpose.tag && redeemer.index == purpose.index),
            None => false,
        }
    }

    /// Check that `credential` is satisfied and record what it consumes.
    ///
    /// * A key credential needs a verified vkey witness.
    /// * A script credential is satisfied by a native script of the witness set, by a
    ///   native reference script that evaluates to true, or by a plutus script (witness
    ///   or reference) together with a redeemer for `purpose`.
    pub fn satisfy(
        &self,
        credential: &Credential,
        purpose: Option<ScriptPurpose>,
        consumed: &mut ConsumedWitnesses,
    ) -> Result<(), TransactionError> {
        match credential {
            Credential::Key(key_hash) => {
                if !self.verified.signers.contains(key_hash) {
                    return Err(TransactionError::MissingVkeyWitness {
                        key_hash: *key_hash,
                    });
                }
                consumed.keys.insert(*key_hash);

                Ok(())
            }
            Credential::Script(script_hash) => {
                if self.verified.native_scripts.contains(script_hash) {
                    consumed.scripts.insert(*script_hash);

                    return Ok(());
                }

                if let Some(script) = self.optional.native.get(script_hash) {
                    let valid = self.codec.verify_native_script(
                        script,
                        self.lower_bound,
                        self.upper_bound,
                        &self.verified.signers,
                    )?;
                    if !valid {
                        return Err(TransactionError::InvalidWitness {
                            witness: InvalidWitnessKind::Script(*script_hash),
                        });
                    }
                    consumed.consume_keys(self.codec.native_script_signers(script)?);

                    return Ok(());
                }

                let is_plutus = self.verified.plutus_scripts.contains(script_hash)
                    || self.optional.plutus.contains(script_hash);
                if is_plutus && self.has_redeemer(purpose) {
                    consumed.scripts.insert(*script_hash);

                    return Ok(());
                }

                Err(TransactionError::MissingScriptWitness {
                    script_hash: *script_hash,
                })
            }
        }
    }
}
