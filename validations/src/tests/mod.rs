use std::collections::BTreeMap;

use emulator_codec::{
    account_from_secret_key, address::enterprise_address, native_script::NativeScript,
    sign_transaction, CborCodec, GeneratedAccount,
};
use emulator_crypto::secp256k1::SecretKey;
use emulator_data_structures::{
    chain::{
        Assets, Credential, DatumOption, Hash, OutputPointer, PlutusData, Script, ScriptHash,
        ScriptKind, Slot, TransactionOutput, Utxo,
    },
    codec::LedgerCodec,
    datum_table::DatumTable,
    error::{InputPurpose, InvalidWitnessKind, TransactionError, ValidityWindowKind},
    staking::RewardAccounts,
    transaction::{
        Certificate, ExUnits, PolicyMint, Redeemer, RedeemerTag, Transaction, TransactionBody,
        Withdrawal,
    },
    utxo_pool::{StoreKind, UtxoEntry, UtxoStore},
};

use crate::{
    consolidation::{apply_transaction_effects, CertificateEffect, LedgerStateMut, TransactionEffects},
    validations::*,
};


const ADA: u64 = 1_000_000;
const POOL: &str = "pool1emulator";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn alice() -> GeneratedAccount {
    let secret_key = SecretKey::from_slice(&[0xcd; 32]).unwrap();
    account_from_secret_key(0, secret_key, Assets::from_lovelace(100 * ADA)).unwrap()
}

fn bob() -> GeneratedAccount {
    let secret_key = SecretKey::from_slice(&[0x43; 32]).unwrap();
    account_from_secret_key(0, secret_key, Assets::from_lovelace(100 * ADA)).unwrap()
}

fn script_address(codec: &CborCodec, script: &Script) -> String {
    let script_hash = codec.script_hash(script).unwrap();
    enterprise_address(0, &Credential::Script(script_hash)).unwrap()
}

fn plutus_script() -> Script {
    Script {
        kind: ScriptKind::PlutusV2,
        bytes: vec![0x4e, 0x4d, 0x01, 0x00, 0x00, 0x33, 0x22],
    }
}

fn redeemer(tag: RedeemerTag, index: u32) -> Redeemer {
    Redeemer {
        tag,
        index,
        data: PlutusData(vec![0x80]),
        ex_units: ExUnits {
            mem: 1_000,
            steps: 100_000,
        },
    }
}

struct Fixture {
    codec: CborCodec,
    ledger: UtxoStore,
    mempool: UtxoStore,
    reward_accounts: RewardAccounts,
    slot: Slot,
}

impl Fixture {
    fn new() -> Self {
        init_logger();

        Self {
            codec: CborCodec::new(0),
            ledger: UtxoStore::new(),
            mempool: UtxoStore::new(),
            reward_accounts: RewardAccounts::new(),
            slot: 0,
        }
    }

    fn fund_output(&mut self, index: u32, output: TransactionOutput) -> OutputPointer {
        let out_ref = OutputPointer {
            transaction_id: Hash::default(),
            output_index: index,
        };
        self.ledger
            .put(out_ref, UtxoEntry::unspent(Utxo { out_ref, output }));

        out_ref
    }

    fn fund(&mut self, index: u32, address: &str, lovelace: u64) -> OutputPointer {
        self.fund_output(
            index,
            TransactionOutput::new(address.to_string(), Assets::from_lovelace(lovelace)),
        )
    }

    fn reward_address(&self, account: &GeneratedAccount) -> String {
        self.codec
            .reward_address(&Credential::Key(account.key_hash))
            .unwrap()
    }

    fn state(&self) -> LedgerState<'_> {
        LedgerState {
            ledger: &self.ledger,
            mempool: &self.mempool,
            reward_accounts: &self.reward_accounts,
            slot: self.slot,
        }
    }

    fn validate(&self, tx: &Transaction) -> Result<TransactionEffects, TransactionError> {
        let bytes = self.codec.serialize_transaction(tx).unwrap();

        validate_transaction_bytes(&self.codec, &self.state(), &bytes)
    }

    fn sign(&self, mut tx: Transaction, signers: &[&GeneratedAccount]) -> Transaction {
        for signer in signers {
            sign_transaction(&self.codec, &mut tx, &signer.secret_key).unwrap();
        }

        tx
    }
}

fn transfer(input: OutputPointer, to: &str, lovelace: u64) -> Transaction {
    Transaction {
        body: TransactionBody {
            inputs: vec![input],
            outputs: vec![TransactionOutput::new(
                to.to_string(),
                Assets::from_lovelace(lovelace),
            )],
            fee: 170_000,
            ..TransactionBody::default()
        },
        ..Transaction::default()
    }
}

#[test]
fn valid_transfer_produces_effects() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let input = fixture.fund(0, &alice.address, 100 * ADA);

    let tx = fixture.sign(transfer(input, &bob.address, 50 * ADA), &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    let tx_hash = fixture.codec.hash_transaction(&tx.body).unwrap();

    assert_eq!(effects.tx_hash, tx_hash);
    assert_eq!(effects.spent_inputs, vec![(StoreKind::Ledger, input)]);
    assert_eq!(effects.outputs.len(), 1);
    assert_eq!(
        effects.outputs[0].out_ref,
        OutputPointer {
            transaction_id: tx_hash,
            output_index: 0
        }
    );
    assert!(effects.withdrawals.is_empty());
    assert!(effects.certificates.is_empty());
}

#[test]
fn validity_interval_bounds_are_inclusive() {
    let body = TransactionBody {
        validity_interval_start: Some(10),
        ttl: Some(20),
        ..TransactionBody::default()
    };

    assert_eq!(
        validate_validity_interval(&body, 9),
        Err(TransactionError::ValidityWindow {
            kind: ValidityWindowKind::NotYetValid,
            bound: 10,
            slot: 9
        })
    );
    assert!(validate_validity_interval(&body, 10).is_ok());
    assert!(validate_validity_interval(&body, 20).is_ok());
    assert_eq!(
        validate_validity_interval(&body, 21),
        Err(TransactionError::ValidityWindow {
            kind: ValidityWindowKind::Expired,
            bound: 20,
            slot: 21
        })
    );
    assert!(validate_validity_interval(&TransactionBody::default(), 1_000_000).is_ok());
}

#[test]
fn expired_transaction_is_rejected_before_witness_checks() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let input = fixture.fund(0, &alice.address, 100 * ADA);
    fixture.slot = 30;

    // Unsigned: the validity interval is checked first
    let mut tx = transfer(input, &alice.address, 10 * ADA);
    tx.body.ttl = Some(29);

    assert!(matches!(
        fixture.validate(&tx),
        Err(TransactionError::ValidityWindow {
            kind: ValidityWindowKind::Expired,
            ..
        })
    ));
}

#[test]
fn missing_and_spent_inputs_are_rejected() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let input = fixture.fund(0, &alice.address, 100 * ADA);
    let unknown = OutputPointer {
        transaction_id: Hash::SHA256([7; 32]),
        output_index: 0,
    };

    let tx = fixture.sign(transfer(unknown, &alice.address, ADA), &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingUtxo {
            output: unknown,
            purpose: InputPurpose::Spend
        })
    );

    fixture.ledger.mark_spent(&input);
    let tx = fixture.sign(transfer(input, &alice.address, ADA), &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingUtxo {
            output: input,
            purpose: InputPurpose::Spend
        })
    );
}

#[test]
fn mempool_outputs_can_be_spent() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let out_ref = OutputPointer {
        transaction_id: Hash::SHA256([3; 32]),
        output_index: 1,
    };
    fixture.mempool.put(
        out_ref,
        UtxoEntry::unspent(Utxo {
            out_ref,
            output: TransactionOutput::new(alice.address.clone(), Assets::from_lovelace(ADA)),
        }),
    );

    let tx = fixture.sign(transfer(out_ref, &alice.address, ADA), &[&alice]);
    let effects = fixture.validate(&tx).unwrap();

    assert_eq!(effects.spent_inputs, vec![(StoreKind::Mempool, out_ref)]);
}

#[test]
fn vkey_witnesses_must_match_exactly() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let input = fixture.fund(0, &alice.address, 100 * ADA);

    // Missing
    let tx = transfer(input, &bob.address, ADA);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingVkeyWitness {
            key_hash: alice.key_hash
        })
    );

    // Extraneous
    let tx = fixture.sign(transfer(input, &bob.address, ADA), &[&alice, &bob]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::ExtraneousWitness {
            key_hash: bob.key_hash
        })
    );
}

#[test]
fn signature_of_another_body_is_invalid() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let input = fixture.fund(0, &alice.address, 100 * ADA);

    let mut tx = fixture.sign(transfer(input, &alice.address, ADA), &[&alice]);
    tx.body.fee += 1;

    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::InvalidWitness {
            witness: InvalidWitnessKind::Key(alice.key_hash)
        })
    );
}

#[test]
fn required_signers_must_sign() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let input = fixture.fund(0, &alice.address, 100 * ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.required_signers = vec![bob.key_hash];

    let unsigned_by_bob = fixture.sign(tx.clone(), &[&alice]);
    assert_eq!(
        fixture.validate(&unsigned_by_bob),
        Err(TransactionError::MissingVkeyWitness {
            key_hash: bob.key_hash
        })
    );

    let signed = fixture.sign(tx, &[&alice, &bob]);
    assert!(fixture.validate(&signed).is_ok());
}

#[test]
fn witness_datums_must_be_consumed() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let input = fixture.fund(0, &alice.address, 100 * ADA);
    let datum = PlutusData(vec![0xd8, 0x79, 0x80]);
    let datum_hash = fixture.codec.hash_datum(&datum);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.plutus_data = vec![datum.clone()];
    let tx = fixture.sign(tx, &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::ExtraneousDatum { datum_hash })
    );

    // An output holding the datum hash consumes it
    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.outputs[0].datum = Some(DatumOption::Hash(datum_hash));
    tx.witness_set.plutus_data = vec![datum.clone()];
    let tx = fixture.sign(tx, &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    assert_eq!(effects.datums, vec![(datum_hash, datum)]);
}

#[test]
fn native_script_locked_input() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let native = NativeScript::Sig {
        key_hash: alice.key_hash,
    }
    .to_script()
    .unwrap();
    let address = script_address(&fixture.codec, &native);
    let script_hash = fixture.codec.script_hash(&native).unwrap();
    let input = fixture.fund(0, &address, 10 * ADA);

    // Script missing
    let tx = fixture.sign(transfer(input, &alice.address, ADA), &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingScriptWitness { script_hash })
    );

    // Script present but its signer missing
    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.scripts = vec![native.clone()];
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::InvalidWitness {
            witness: InvalidWitnessKind::Script(script_hash)
        })
    );

    // Script and signer present
    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.scripts = vec![native];
    let tx = fixture.sign(tx, &[&alice]);
    assert!(fixture.validate(&tx).is_ok());
}

#[test]
fn native_script_time_lock_uses_validity_interval() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let native = NativeScript::All {
        scripts: vec![
            NativeScript::Sig {
                key_hash: alice.key_hash,
            },
            NativeScript::After { slot: 5 },
        ],
    }
    .to_script()
    .unwrap();
    let address = script_address(&fixture.codec, &native);
    let input = fixture.fund(0, &address, 10 * ADA);
    fixture.slot = 6;

    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.scripts = vec![native.clone()];
    let without_bound = fixture.sign(tx.clone(), &[&alice]);
    assert!(matches!(
        fixture.validate(&without_bound),
        Err(TransactionError::InvalidWitness {
            witness: InvalidWitnessKind::Script(_)
        })
    ));

    tx.body.validity_interval_start = Some(5);
    let with_bound = fixture.sign(tx, &[&alice]);
    assert!(fixture.validate(&with_bound).is_ok());
}

#[test]
fn unused_native_script_is_extraneous() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let native = NativeScript::Sig {
        key_hash: alice.key_hash,
    }
    .to_script()
    .unwrap();
    let script_hash = fixture.codec.script_hash(&native).unwrap();
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.scripts = vec![native];
    let tx = fixture.sign(tx, &[&alice]);

    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::ExtraneousScript { script_hash })
    );
}

#[test]
fn plutus_script_needs_matching_redeemer() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let script = plutus_script();
    let script_hash = fixture.codec.script_hash(&script).unwrap();
    let datum = PlutusData(vec![0x01]);
    let datum_hash = fixture.codec.hash_datum(&datum);
    let mut output =
        TransactionOutput::new(script_address(&fixture.codec, &script), Assets::from_lovelace(ADA));
    output.datum = Some(DatumOption::Hash(datum_hash));
    let input = fixture.fund_output(0, output);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.witness_set.scripts = vec![script];
    tx.witness_set.plutus_data = vec![datum];

    let mut wrong_tag = tx.clone();
    wrong_tag.witness_set.redeemers = vec![redeemer(RedeemerTag::Mint, 0)];
    assert_eq!(
        fixture.validate(&wrong_tag),
        Err(TransactionError::MissingScriptWitness { script_hash })
    );

    let mut wrong_index = tx.clone();
    wrong_index.witness_set.redeemers = vec![redeemer(RedeemerTag::Spend, 1)];
    assert_eq!(
        fixture.validate(&wrong_index),
        Err(TransactionError::MissingScriptWitness { script_hash })
    );

    tx.witness_set.redeemers = vec![redeemer(RedeemerTag::Spend, 0)];
    assert!(fixture.validate(&tx).is_ok());
}

#[test]
fn reference_scripts_are_optional_witnesses() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let script = plutus_script();

    let mut holder = TransactionOutput::new(alice.address.clone(), Assets::from_lovelace(ADA));
    holder.script_ref = Some(script.clone());
    let reference = fixture.fund_output(0, holder);
    let input = fixture.fund(1, &script_address(&fixture.codec, &script), 5 * ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.reference_inputs = vec![reference];
    tx.witness_set.redeemers = vec![redeemer(RedeemerTag::Spend, 0)];
    let effects = fixture.validate(&tx).unwrap();

    // Reference inputs are never spent
    assert_eq!(effects.spent_inputs, vec![(StoreKind::Ledger, input)]);

    let missing = OutputPointer {
        transaction_id: Hash::SHA256([9; 32]),
        output_index: 0,
    };
    tx.body.reference_inputs = vec![missing];
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingUtxo {
            output: missing,
            purpose: InputPurpose::Reference
        })
    );
}

#[test]
fn collateral_must_be_key_locked() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let input = fixture.fund(0, &alice.address, 10 * ADA);
    let script_collateral = fixture.fund(1, &script_address(&fixture.codec, &plutus_script()), ADA);
    let key_collateral = fixture.fund(2, &alice.address, ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.collateral_inputs = vec![script_collateral];
    let tx = fixture.sign(tx, &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::CollateralCredential {
            output: script_collateral
        })
    );

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.collateral_inputs = vec![key_collateral];
    let tx = fixture.sign(tx, &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    // Collateral is not consumed by a valid transaction
    assert_eq!(effects.spent_inputs, vec![(StoreKind::Ledger, input)]);
}

#[test]
fn mint_policy_must_be_witnessed() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let policy = NativeScript::Sig {
        key_hash: alice.key_hash,
    }
    .to_script()
    .unwrap();
    let policy_id: ScriptHash = fixture.codec.script_hash(&policy).unwrap();
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.mint = vec![PolicyMint {
        policy_id,
        assets: BTreeMap::from([("746f6b656e".to_string(), 1)]),
    }];
    let unwitnessed = fixture.sign(tx.clone(), &[&alice]);
    assert_eq!(
        fixture.validate(&unwitnessed),
        Err(TransactionError::MissingScriptWitness {
            script_hash: policy_id
        })
    );

    tx.witness_set.scripts = vec![policy];
    let witnessed = fixture.sign(tx, &[&alice]);
    assert!(fixture.validate(&witnessed).is_ok());
}

#[test]
fn withdrawals_must_match_rewards() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let reward_address = fixture.reward_address(&alice);
    fixture.reward_accounts.register(reward_address.clone());
    fixture
        .reward_accounts
        .delegate(reward_address.clone(), POOL.to_string());
    fixture.reward_accounts.distribute(100);
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let withdraw = |amount| {
        let mut tx = transfer(input, &alice.address, ADA);
        tx.body.withdrawals = vec![Withdrawal {
            reward_address: reward_address.clone(),
            amount,
        }];
        tx
    };

    let tx = fixture.sign(withdraw(99), &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::WithdrawalMismatch {
            reward_address: reward_address.clone(),
            requested: 99,
            available: 100
        })
    );

    let tx = fixture.sign(withdraw(100), &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    assert_eq!(effects.withdrawals, vec![(reward_address.clone(), 100)]);

    // Unknown accounts never match
    let bob_reward = fixture.reward_address(&bob);
    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.withdrawals = vec![Withdrawal {
        reward_address: bob_reward.clone(),
        amount: 0,
    }];
    let tx = fixture.sign(tx, &[&alice, &bob]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::WithdrawalMismatch {
            reward_address: bob_reward,
            requested: 0,
            available: 0
        })
    );
}

#[test]
fn rewards_can_only_be_withdrawn_once_per_transaction() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let reward_address = fixture.reward_address(&alice);
    fixture.reward_accounts.register(reward_address.clone());
    fixture
        .reward_accounts
        .delegate(reward_address.clone(), POOL.to_string());
    fixture.reward_accounts.distribute(100);
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let withdrawal = |amount| Withdrawal {
        reward_address: reward_address.clone(),
        amount,
    };

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.withdrawals = vec![withdrawal(100), withdrawal(100)];
    let tx = fixture.sign(tx, &[&alice]);
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::WithdrawalMismatch {
            reward_address: reward_address.clone(),
            requested: 100,
            available: 0
        })
    );

    // Nothing is left for the second entry except a zero withdrawal
    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.withdrawals = vec![withdrawal(100), withdrawal(0)];
    let tx = fixture.sign(tx, &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    assert_eq!(
        effects.withdrawals,
        vec![(reward_address.clone(), 100), (reward_address, 0)]
    );
}

#[test]
fn stake_registration_and_delegation() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let reward_address = fixture.reward_address(&alice);
    let stake_credential = Credential::Key(alice.key_hash);
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let with_certs = |certs: Vec<Certificate>| {
        let mut tx = transfer(input, &alice.address, ADA);
        tx.body.certs = certs;
        tx
    };

    // Delegation of an unregistered credential
    let tx = fixture.sign(
        with_certs(vec![Certificate::StakeDelegation {
            stake_credential,
            pool_id: POOL.to_string(),
        }]),
        &[&alice],
    );
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::StakeNotRegistered {
            reward_address: reward_address.clone()
        })
    );

    // Registration and delegation in the same transaction
    let tx = fixture.sign(
        with_certs(vec![
            Certificate::StakeRegistration { stake_credential },
            Certificate::Other {
                kind: "PoolRetirement".to_string(),
            },
            Certificate::StakeDelegation {
                stake_credential,
                pool_id: POOL.to_string(),
            },
        ]),
        &[&alice],
    );
    let effects = fixture.validate(&tx).unwrap();
    assert_eq!(
        effects.certificates,
        vec![
            CertificateEffect::Register {
                reward_address: reward_address.clone()
            },
            CertificateEffect::Delegate {
                reward_address: reward_address.clone(),
                pool_id: POOL.to_string()
            },
        ]
    );

    // Registering twice
    fixture.reward_accounts.register(reward_address.clone());
    let tx = fixture.sign(
        with_certs(vec![Certificate::StakeRegistration { stake_credential }]),
        &[&alice],
    );
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::StakeAlreadyRegistered {
            reward_address: reward_address.clone()
        })
    );

    // Deregistration followed by delegation
    let tx = fixture.sign(
        with_certs(vec![
            Certificate::StakeDeregistration { stake_credential },
            Certificate::StakeDelegation {
                stake_credential,
                pool_id: POOL.to_string(),
            },
        ]),
        &[&alice],
    );
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::StakeNotRegistered { reward_address })
    );
}

#[test]
fn deregistration_requires_stake_witness() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let bob_reward = fixture.reward_address(&bob);
    fixture.reward_accounts.register(bob_reward);
    let input = fixture.fund(0, &alice.address, 10 * ADA);

    let mut tx = transfer(input, &alice.address, ADA);
    tx.body.certs = vec![Certificate::StakeDeregistration {
        stake_credential: Credential::Key(bob.key_hash),
    }];
    let tx = fixture.sign(tx, &[&alice]);

    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingVkeyWitness {
            key_hash: bob.key_hash
        })
    );
}

#[test]
fn apply_effects_updates_every_store() {
    let mut fixture = Fixture::new();
    let alice = alice();
    let bob = bob();
    let reward_address = fixture.reward_address(&alice);
    let input = fixture.fund(0, &alice.address, 100 * ADA);
    let datum = PlutusData(vec![0x02]);
    let datum_hash = fixture.codec.hash_datum(&datum);

    let mut tx = transfer(input, &bob.address, 50 * ADA);
    tx.body.outputs.push(TransactionOutput {
        address: alice.address.clone(),
        assets: Assets::from_lovelace(50 * ADA),
        datum: Some(DatumOption::Hash(datum_hash)),
        script_ref: None,
    });
    tx.body.certs = vec![Certificate::StakeRegistration {
        stake_credential: Credential::Key(alice.key_hash),
    }];
    tx.witness_set.plutus_data = vec![datum.clone()];
    let tx = fixture.sign(tx, &[&alice]);
    let effects = fixture.validate(&tx).unwrap();
    let tx_hash = effects.tx_hash;

    let mut datum_table = DatumTable::new();
    apply_transaction_effects(
        effects,
        LedgerStateMut {
            ledger: &mut fixture.ledger,
            mempool: &mut fixture.mempool,
            reward_accounts: &mut fixture.reward_accounts,
            datum_table: &mut datum_table,
        },
    );

    assert!(fixture.ledger.get(&input).unwrap().spent);
    assert_eq!(fixture.mempool.len(), 2);
    for index in 0..2 {
        let out_ref = OutputPointer {
            transaction_id: tx_hash,
            output_index: index,
        };
        assert_eq!(
            fixture.mempool.get_unspent(&out_ref).unwrap().utxo.output.assets.lovelace(),
            50 * ADA
        );
    }
    assert!(fixture.reward_accounts.is_registered(&reward_address));
    assert_eq!(datum_table.get(&datum_hash), Some(&datum));

    // The same transaction cannot be applied twice
    assert_eq!(
        fixture.validate(&tx),
        Err(TransactionError::MissingUtxo {
            output: input,
            purpose: InputPurpose::Spend
        })
    );
}
