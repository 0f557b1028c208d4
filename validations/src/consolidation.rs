use log::debug;

use emulator_data_structures::{
    chain::{Hash, Lovelace, OutputPointer, PlutusData, PoolId, RewardAddress, Utxo},
    datum_table::DatumTable,
    staking::RewardAccounts,
    utxo_pool::{StoreKind, UtxoEntry, UtxoStore},
};

/// State change of a reward account requested by a certificate
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CertificateEffect {
    /// Mark the account as registered
    Register {
        /// Account
        reward_address: RewardAddress,
    },
    /// Clear registration and delegated pool
    Deregister {
        /// Account
        reward_address: RewardAddress,
    },
    /// Record the delegated pool
    Delegate {
        /// Account
        reward_address: RewardAddress,
        /// Pool
        pool_id: PoolId,
    },
}

/// Every mutation an accepted transaction performs, computed without touching the
/// emulator state. Use `apply_transaction_effects` to commit it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TransactionEffects {
    /// Hash of the transaction body
    pub tx_hash: Hash,
    /// Spent inputs and the store each one was found in
    pub spent_inputs: Vec<(StoreKind, OutputPointer)>,
    /// Rewards to debit
    pub withdrawals: Vec<(RewardAddress, Lovelace)>,
    /// Reward account updates, in certificate order
    pub certificates: Vec<CertificateEffect>,
    /// New outputs, keyed by transaction hash and position
    pub outputs: Vec<Utxo>,
    /// Datums carried by the witness set
    pub datums: Vec<(Hash, PlutusData)>,
}

/// Mutable view of the state an accepted transaction modifies
pub struct LedgerStateMut<'a> {
    /// Committed outputs
    pub ledger: &'a mut UtxoStore,
    /// Outputs created since the last block boundary
    pub mempool: &'a mut UtxoStore,
    /// Reward accounts
    pub reward_accounts: &'a mut RewardAccounts,
    /// Known datums
    pub datum_table: &'a mut DatumTable,
}

/// Commit the effects of an accepted transaction.
///
/// Inputs are flagged as spent in the store they were resolved from, withdrawals and
/// certificates update the reward accounts, and the outputs enter the mempool.
pub fn apply_transaction_effects(effects: TransactionEffects, state: LedgerStateMut<'_>) {
    let TransactionEffects {
        tx_hash,
        spent_inputs,
        withdrawals,
        certificates,
        outputs,
        datums,
    } = effects;

    for (store, output_pointer) in spent_inputs {
        let found = match store {
            StoreKind::Ledger => state.ledger.mark_spent(&output_pointer),
            StoreKind::Mempool => state.mempool.mark_spent(&output_pointer),
        };
        debug_assert!(found, "spent input must have been resolved");
    }

    for (reward_address, amount) in withdrawals {
        let debited = state.reward_accounts.withdraw(&reward_address, amount);
        debug_assert!(debited, "withdrawal must have been validated");
    }

    for certificate in certificates {
        match certificate {
            CertificateEffect::Register { reward_address } => {
                state.reward_accounts.register(reward_address)
            }
            CertificateEffect::Deregister { reward_address } => {
                state.reward_accounts.deregister(&reward_address)
            }
            CertificateEffect::Delegate {
                reward_address,
                pool_id,
            } => state.reward_accounts.delegate(reward_address, pool_id),
        }
    }

    let outputs_len = outputs.len();
    for utxo in outputs {
        state.mempool.put(utxo.out_ref, UtxoEntry::unspent(utxo));
    }

    state.datum_table.extend(datums);

    debug!(
        "Applied transaction {}: {} outputs added to the mempool",
        tx_hash, outputs_len
    );
}
