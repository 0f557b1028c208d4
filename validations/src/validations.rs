use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, trace};

use emulator_data_structures::{
    chain::{
        Credential, Hash, KeyHash, Lovelace, OutputPointer, PlutusData, RewardAddress, ScriptHash,
        Slot, Utxo,
    },
    codec::LedgerCodec,
    error::{
        CodecError, InputPurpose, InvalidWitnessKind, TransactionError, ValidityWindowKind,
    },
    staking::RewardAccounts,
    transaction::{Certificate, RedeemerTag, Transaction, TransactionBody, WitnessSet},
    utxo_pool::{StoreKind, UtxoStore},
};

use crate::{
    consolidation::{CertificateEffect, TransactionEffects},
    witnessing::{
        ConsumedWitnesses, OptionalScripts, ScriptPurpose, VerifiedWitnesses, WitnessContext,
    },
};

/// Read-only view of the emulator state a transaction is validated against
#[derive(Clone, Copy)]
pub struct LedgerState<'a> {
    /// Committed outputs
    pub ledger: &'a UtxoStore,
    /// Outputs created since the last block boundary
    pub mempool: &'a UtxoStore,
    /// Reward accounts
    pub reward_accounts: &'a RewardAccounts,
    /// Current slot
    pub slot: Slot,
}

impl<'a> LedgerState<'a> {
    /// Look for an unspent output, first in the ledger and then in the mempool
    pub fn resolve(&self, output_pointer: &OutputPointer) -> Option<(StoreKind, &'a Utxo)> {
        if let Some(entry) = self.ledger.get_unspent(output_pointer) {
            return Some((StoreKind::Ledger, &entry.utxo));
        }

        self.mempool
            .get_unspent(output_pointer)
            .map(|entry| (StoreKind::Mempool, &entry.utxo))
    }
}

/// Output found while resolving the inputs of a transaction
#[derive(Clone, Debug)]
pub struct ResolvedInput<'a> {
    /// Store the output lives in
    pub store: StoreKind,
    /// The output
    pub utxo: &'a Utxo,
}

/// Function to validate the validity interval of a transaction. Both bounds are
/// inclusive.
pub fn validate_validity_interval(
    body: &TransactionBody,
    slot: Slot,
) -> Result<(), TransactionError> {
    if let Some(lower) = body.validity_interval_start {
        if slot < lower {
            return Err(TransactionError::ValidityWindow {
                kind: ValidityWindowKind::NotYetValid,
                bound: lower,
                slot,
            });
        }
    }

    if let Some(upper) = body.ttl {
        if slot > upper {
            return Err(TransactionError::ValidityWindow {
                kind: ValidityWindowKind::Expired,
                bound: upper,
                slot,
            });
        }
    }

    Ok(())
}

/// Hash every datum of the witness set
pub fn collect_witness_datums<C: LedgerCodec>(
    codec: &C,
    witness_set: &WitnessSet,
) -> BTreeMap<Hash, PlutusData> {
    witness_set
        .plutus_data
        .iter()
        .map(|datum| (codec.hash_datum(datum), datum.clone()))
        .collect()
}

/// Function to validate the vkey witnesses of a transaction. Returns the key hashes of
/// the witnesses, in witness order.
pub fn verify_vkey_witnesses<C: LedgerCodec>(
    codec: &C,
    witness_set: &WitnessSet,
    tx_hash: Hash,
) -> Result<Vec<KeyHash>, TransactionError> {
    let mut key_hashes = Vec::with_capacity(witness_set.vkey_witnesses.len());

    for witness in &witness_set.vkey_witnesses {
        let key_hash = codec.key_hash(&witness.vkey)?;
        if !codec.verify_signature(&witness.vkey, tx_hash.as_bytes(), &witness.signature) {
            return Err(TransactionError::InvalidWitness {
                witness: InvalidWitnessKind::Key(key_hash),
            });
        }
        key_hashes.push(key_hash);
    }

    Ok(key_hashes)
}

/// Function to validate the native scripts of the witness set against the validity
/// interval and the verified signers. The key hashes each script mentions are consumed.
pub fn verify_native_scripts<C: LedgerCodec>(
    codec: &C,
    witness_set: &WitnessSet,
    body: &TransactionBody,
    verified: &VerifiedWitnesses,
    consumed: &mut ConsumedWitnesses,
) -> Result<Vec<ScriptHash>, TransactionError> {
    let mut script_hashes = vec![];

    for script in witness_set.native_scripts() {
        let script_hash = codec.script_hash(script)?;
        let valid = codec.verify_native_script(
            script,
            body.validity_interval_start,
            body.ttl,
            &verified.signers,
        )?;
        if !valid {
            return Err(TransactionError::InvalidWitness {
                witness: InvalidWitnessKind::Script(script_hash),
            });
        }
        consumed.consume_keys(codec.native_script_signers(script)?);
        script_hashes.push(script_hash);
    }

    Ok(script_hashes)
}

/// Hash every plutus script of the witness set. Scripts are not executed.
pub fn index_plutus_scripts<C: LedgerCodec>(
    codec: &C,
    witness_set: &WitnessSet,
) -> Result<Vec<ScriptHash>, TransactionError> {
    witness_set
        .plutus_scripts()
        .map(|script| codec.script_hash(script).map_err(TransactionError::from))
        .collect()
}

/// Resolve a list of output pointers against the ledger and the mempool
pub fn resolve_inputs<'a>(
    state: &LedgerState<'a>,
    inputs: &[OutputPointer],
    purpose: InputPurpose,
) -> Result<Vec<ResolvedInput<'a>>, TransactionError> {
    inputs
        .iter()
        .map(|output_pointer| {
            state
                .resolve(output_pointer)
                .map(|(store, utxo)| ResolvedInput { store, utxo })
                .ok_or(TransactionError::MissingUtxo {
                    output: *output_pointer,
                    purpose,
                })
        })
        .collect()
}

/// Register the reference scripts of resolved outputs and consume their datum hashes
pub fn harvest_resolved_outputs<C: LedgerCodec>(
    codec: &C,
    resolved: &[ResolvedInput<'_>],
    optional: &mut OptionalScripts,
    consumed: &mut ConsumedWitnesses,
) -> Result<(), TransactionError> {
    for input in resolved {
        if let Some(script) = &input.utxo.output.script_ref {
            optional.insert(codec, script)?;
        }
        if let Some(datum_hash) = input.utxo.output.datum_hash() {
            consumed.consume_datum(datum_hash);
        }
    }

    Ok(())
}

fn payment_credential<C: LedgerCodec>(codec: &C, utxo: &Utxo) -> Result<Credential, CodecError> {
    codec
        .address_details(&utxo.output.address)?
        .payment_credential
        .ok_or_else(|| CodecError::Address {
            address: utxo.output.address.clone(),
            msg: "address has no payment credential".to_string(),
        })
}

fn stake_credential<C: LedgerCodec>(
    codec: &C,
    reward_address: &RewardAddress,
) -> Result<Credential, CodecError> {
    codec
        .address_details(reward_address)?
        .stake_credential
        .ok_or_else(|| CodecError::Address {
            address: reward_address.clone(),
            msg: "address has no stake credential".to_string(),
        })
}

/// Function to validate the collateral inputs. Collateral must be locked by keys, and
/// those keys must have signed the transaction.
pub fn validate_collateral<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    state: &LedgerState<'_>,
    body: &TransactionBody,
    consumed: &mut ConsumedWitnesses,
) -> Result<(), TransactionError> {
    let resolved = resolve_inputs(state, &body.collateral_inputs, InputPurpose::Collateral)?;

    for input in resolved {
        let credential = payment_credential(ctx.codec, input.utxo)?;
        if let Credential::Script(_) = credential {
            return Err(TransactionError::CollateralCredential {
                output: input.utxo.out_ref,
            });
        }
        ctx.satisfy(&credential, None, consumed)?;
    }

    Ok(())
}

/// Function to validate that every required signer has signed the transaction
pub fn validate_required_signers<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    body: &TransactionBody,
    consumed: &mut ConsumedWitnesses,
) -> Result<(), TransactionError> {
    for key_hash in &body.required_signers {
        ctx.satisfy(&Credential::Key(*key_hash), None, consumed)?;
    }

    Ok(())
}

/// Function to validate that every minting policy is witnessed
pub fn validate_mint<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    body: &TransactionBody,
    consumed: &mut ConsumedWitnesses,
) -> Result<(), TransactionError> {
    for (index, policy) in body.mint.iter().enumerate() {
        ctx.satisfy(
            &Credential::Script(policy.policy_id),
            Some(ScriptPurpose::new(RedeemerTag::Mint, index)),
            consumed,
        )?;
    }

    Ok(())
}

/// Function to validate the withdrawals. Each one must be witnessed by its stake
/// credential and withdraw exactly the rewards still available to it.
///
/// An account listed twice has nothing left after its first withdrawal, so only a zero
/// amount can match the second one.
pub fn validate_withdrawals<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    state: &LedgerState<'_>,
    body: &TransactionBody,
    consumed: &mut ConsumedWitnesses,
) -> Result<Vec<(RewardAddress, Lovelace)>, TransactionError> {
    let mut withdrawals = Vec::with_capacity(body.withdrawals.len());
    let mut withdrawn: BTreeMap<&RewardAddress, Lovelace> = BTreeMap::new();

    for (index, withdrawal) in body.withdrawals.iter().enumerate() {
        let credential = stake_credential(ctx.codec, &withdrawal.reward_address)?;
        ctx.satisfy(
            &credential,
            Some(ScriptPurpose::new(RedeemerTag::Reward, index)),
            consumed,
        )?;

        // Unknown accounts never match, not even for a zero withdrawal
        let available = state
            .reward_accounts
            .get(&withdrawal.reward_address)
            .map(|account| {
                let already = withdrawn
                    .get(&withdrawal.reward_address)
                    .copied()
                    .unwrap_or(0);
                account.delegation.rewards.saturating_sub(already)
            });
        if available != Some(withdrawal.amount) {
            return Err(TransactionError::WithdrawalMismatch {
                reward_address: withdrawal.reward_address.clone(),
                requested: withdrawal.amount,
                available: available.unwrap_or(0),
            });
        }

        *withdrawn.entry(&withdrawal.reward_address).or_insert(0) += withdrawal.amount;
        withdrawals.push((withdrawal.reward_address.clone(), withdrawal.amount));
    }

    Ok(withdrawals)
}

/// Function to validate the certificates of a transaction.
///
/// Registration status is tracked across the certificate list, so a credential
/// registered by an earlier certificate of the same transaction can be delegated or
/// deregistered by a later one.
pub fn validate_certificates<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    state: &LedgerState<'_>,
    body: &TransactionBody,
    consumed: &mut ConsumedWitnesses,
) -> Result<Vec<CertificateEffect>, TransactionError> {
    let mut projected: BTreeMap<RewardAddress, bool> = BTreeMap::new();
    let is_registered = |projected: &BTreeMap<RewardAddress, bool>, address: &RewardAddress| {
        projected
            .get(address)
            .copied()
            .unwrap_or_else(|| state.reward_accounts.is_registered(address))
    };
    let mut effects = vec![];

    for (index, certificate) in body.certs.iter().enumerate() {
        let purpose = Some(ScriptPurpose::new(RedeemerTag::Cert, index));
        match certificate {
            Certificate::StakeRegistration { stake_credential } => {
                let reward_address = ctx.codec.reward_address(stake_credential)?;
                if is_registered(&projected, &reward_address) {
                    return Err(TransactionError::StakeAlreadyRegistered { reward_address });
                }
                projected.insert(reward_address.clone(), true);
                effects.push(CertificateEffect::Register { reward_address });
            }
            Certificate::StakeDeregistration { stake_credential } => {
                let reward_address = ctx.codec.reward_address(stake_credential)?;
                ctx.satisfy(stake_credential, purpose, consumed)?;
                if !is_registered(&projected, &reward_address) {
                    return Err(TransactionError::StakeNotRegistered { reward_address });
                }
                projected.insert(reward_address.clone(), false);
                effects.push(CertificateEffect::Deregister { reward_address });
            }
            Certificate::StakeDelegation {
                stake_credential,
                pool_id,
            } => {
                let reward_address = ctx.codec.reward_address(stake_credential)?;
                ctx.satisfy(stake_credential, purpose, consumed)?;
                if !is_registered(&projected, &reward_address) {
                    return Err(TransactionError::StakeNotRegistered { reward_address });
                }
                effects.push(CertificateEffect::Delegate {
                    reward_address,
                    pool_id: pool_id.clone(),
                });
            }
            Certificate::Other { kind } => {
                trace!("Accepting {} certificate without checks", kind);
            }
        }
    }

    Ok(effects)
}

/// Function to validate that the payment credential of every spent input is satisfied
pub fn validate_input_witnesses<C: LedgerCodec>(
    ctx: &WitnessContext<'_, C>,
    inputs: &[ResolvedInput<'_>],
    consumed: &mut ConsumedWitnesses,
) -> Result<(), TransactionError> {
    for (index, input) in inputs.iter().enumerate() {
        let credential = payment_credential(ctx.codec, input.utxo)?;
        ctx.satisfy(
            &credential,
            Some(ScriptPurpose::new(RedeemerTag::Spend, index)),
            consumed,
        )?;
    }

    Ok(())
}

/// Function to validate that every witness of the transaction has been used: vkey
/// witnesses first, then native scripts, plutus scripts and datums.
pub fn validate_witness_completeness(
    verified: &VerifiedWitnesses,
    consumed: &ConsumedWitnesses,
) -> Result<(), TransactionError> {
    if let Some(key_hash) = verified
        .key_hashes
        .iter()
        .find(|key_hash| !consumed.keys.contains(key_hash))
    {
        return Err(TransactionError::ExtraneousWitness {
            key_hash: *key_hash,
        });
    }

    if let Some(script_hash) = verified
        .native_scripts
        .iter()
        .chain(verified.plutus_scripts.iter())
        .find(|script_hash| !consumed.scripts.contains(script_hash))
    {
        return Err(TransactionError::ExtraneousScript {
            script_hash: *script_hash,
        });
    }

    if let Some(datum_hash) = verified
        .datums
        .keys()
        .find(|datum_hash| !consumed.datums.contains(datum_hash))
    {
        return Err(TransactionError::ExtraneousDatum {
            datum_hash: *datum_hash,
        });
    }

    Ok(())
}

/// Function to validate a parsed transaction against the emulator state.
///
/// Nothing is mutated: on success the returned `TransactionEffects` describe every
/// change the transaction makes, and the first failing check is returned otherwise.
pub fn validate_transaction<C: LedgerCodec>(
    codec: &C,
    state: &LedgerState<'_>,
    tx: &Transaction,
    tx_hash: Hash,
) -> Result<TransactionEffects, TransactionError> {
    let body = &tx.body;
    let witness_set = &tx.witness_set;

    validate_validity_interval(body, state.slot)?;

    let mut consumed = ConsumedWitnesses::default();
    let mut verified = VerifiedWitnesses {
        datums: collect_witness_datums(codec, witness_set),
        ..VerifiedWitnesses::default()
    };

    verified.key_hashes = verify_vkey_witnesses(codec, witness_set, tx_hash)?;
    verified.signers = verified.key_hashes.iter().copied().collect();
    verified.native_scripts =
        verify_native_scripts(codec, witness_set, body, &verified, &mut consumed)?;
    verified.plutus_scripts = index_plutus_scripts(codec, witness_set)?;

    let mut optional = OptionalScripts::default();
    let inputs = resolve_inputs(state, &body.inputs, InputPurpose::Spend)?;
    harvest_resolved_outputs(codec, &inputs, &mut optional, &mut consumed)?;
    let reference_inputs = resolve_inputs(state, &body.reference_inputs, InputPurpose::Reference)?;
    harvest_resolved_outputs(codec, &reference_inputs, &mut optional, &mut consumed)?;

    let ctx = WitnessContext {
        codec,
        verified: &verified,
        optional: &optional,
        redeemers: &witness_set.redeemers,
        lower_bound: body.validity_interval_start,
        upper_bound: body.ttl,
    };

    validate_collateral(&ctx, state, body, &mut consumed)?;
    validate_required_signers(&ctx, body, &mut consumed)?;
    validate_mint(&ctx, body, &mut consumed)?;
    let withdrawals = validate_withdrawals(&ctx, state, body, &mut consumed)?;
    let certificates = validate_certificates(&ctx, state, body, &mut consumed)?;
    validate_input_witnesses(&ctx, &inputs, &mut consumed)?;

    let outputs = body
        .outputs
        .iter()
        .enumerate()
        .map(|(index, output)| Utxo {
            out_ref: OutputPointer {
                transaction_id: tx_hash,
                output_index: index as u32,
            },
            output: output.clone(),
        })
        .collect_vec();
    for datum_hash in body.outputs.iter().filter_map(|output| output.datum_hash()) {
        consumed.consume_datum(datum_hash);
    }

    validate_witness_completeness(&verified, &consumed)?;

    Ok(TransactionEffects {
        tx_hash,
        spent_inputs: inputs
            .iter()
            .map(|input| (input.store, input.utxo.out_ref))
            .collect(),
        withdrawals,
        certificates,
        outputs,
        datums: verified.datums.into_iter().collect(),
    })
}

/// Parse, hash and validate a serialized transaction
pub fn validate_transaction_bytes<C: LedgerCodec>(
    codec: &C,
    state: &LedgerState<'_>,
    bytes: &[u8],
) -> Result<TransactionEffects, TransactionError> {
    let tx = codec.parse_transaction(bytes)?;
    let tx_hash = codec.hash_transaction(&tx.body)?;
    debug!(
        "Validating transaction {} ({} inputs, {} outputs) at slot {}",
        tx_hash,
        tx.body.inputs.len(),
        tx.body.outputs.len(),
        state.slot
    );

    validate_transaction(codec, state, &tx, tx_hash)
}
