use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, info, warn};
use num_format::{Locale, ToFormattedString};
use prettytable::{cell, row, Table};

use emulator_config::config::Config;
use emulator_data_structures::{
    chain::{
        Address, Assets, DatumOption, Delegation, Hash, Lovelace, OutputPointer, PlutusData,
        ProtocolParameters, TransactionOutput, UnixTime, Utxo,
    },
    codec::LedgerCodec,
    datum_table::DatumTable,
    genesis::EmulatorAccount,
    staking::RewardAccounts,
    transaction::EvalRedeemer,
    utxo_pool::{commit_mempool, UtxoEntry, UtxoStore},
};
use emulator_validations::{
    consolidation::{apply_transaction_effects, LedgerStateMut},
    validations::{validate_transaction_bytes, LedgerState},
};

use crate::{
    clock::{Clock, ClockState},
    error::EmulatorError,
    provider::{AddressOrCredential, Provider},
};

/// Width of the balance bars printed by `log_state`
const BAR_WIDTH: usize = 60;

/// In-process ledger.
///
/// Accepted transactions land in the mempool and reach the ledger at the next
/// block boundary. Queries only see the ledger.
pub struct Emulator<C> {
    codec: C,
    clock: Clock,
    ledger: UtxoStore,
    mempool: UtxoStore,
    reward_accounts: RewardAccounts,
    datum_table: DatumTable,
    protocol_parameters: ProtocolParameters,
    pending_txs: BTreeSet<Hash>,
    confirmed_txs: HashSet<Hash>,
}

impl<C: LedgerCodec> Emulator<C> {
    /// Emulator with the default configuration, seeded with one output per account
    pub fn new(codec: C, accounts: Vec<EmulatorAccount>) -> Result<Self, EmulatorError> {
        Self::with_config(codec, accounts, &Config::default())
    }

    /// Emulator seeded with one output per account.
    ///
    /// Account `i` is stored in the ledger at output `i` of the all-zero transaction hash.
    /// The codec must build addresses for the configured network.
    pub fn with_config(
        codec: C,
        accounts: Vec<EmulatorAccount>,
        config: &Config,
    ) -> Result<Self, EmulatorError> {
        if codec.network_id() != config.emulator.network_id {
            return Err(EmulatorError::NetworkMismatch {
                config: config.emulator.network_id,
                codec: codec.network_id(),
            });
        }

        let mut ledger = UtxoStore::new();
        let mut datum_table = DatumTable::new();

        for (index, account) in accounts.into_iter().enumerate() {
            let EmulatorAccount {
                address,
                assets,
                output_data,
            } = account;
            let mut output = TransactionOutput::new(address, assets);

            if let Some(output_data) = output_data {
                if output_data.datum_fields() > 1 {
                    return Err(EmulatorError::ConflictingOutputData { index });
                }

                output.datum = if let Some(datum) = output_data.as_hash {
                    let datum_hash = codec.hash_datum(&datum);
                    datum_table.insert(datum_hash, datum);
                    Some(DatumOption::Hash(datum_hash))
                } else if let Some(datum_hash) = output_data.hash {
                    Some(DatumOption::Hash(datum_hash))
                } else {
                    output_data.inline.map(DatumOption::Inline)
                };
                output.script_ref = output_data.script_ref;
            }

            let out_ref = OutputPointer {
                transaction_id: Hash::default(),
                output_index: index as u32,
            };
            ledger.put(out_ref, UtxoEntry::unspent(Utxo { out_ref, output }));
        }

        let clock = Clock::from_config(&config.emulator);
        info!(
            "Emulator started with {} genesis outputs at unix time {}",
            ledger.len(),
            clock.state().time
        );

        Ok(Emulator {
            codec,
            clock,
            ledger,
            mempool: UtxoStore::new(),
            reward_accounts: RewardAccounts::new(),
            datum_table,
            protocol_parameters: config.protocol_parameters.clone(),
            pending_txs: BTreeSet::new(),
            confirmed_txs: HashSet::new(),
        })
    }

    /// Codec used to parse and hash transactions
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Network id of the addresses built by the codec
    pub fn network_id(&self) -> u8 {
        self.codec.network_id()
    }

    /// Current unix time in milliseconds
    pub fn now(&self) -> UnixTime {
        self.clock.state().time
    }

    /// Current slot, block height and time
    pub fn clock(&self) -> ClockState {
        self.clock.state()
    }

    /// Committed outputs
    pub fn ledger(&self) -> &UtxoStore {
        &self.ledger
    }

    /// Outputs created since the last block boundary
    pub fn mempool(&self) -> &UtxoStore {
        &self.mempool
    }

    /// Reward accounts
    pub fn reward_accounts(&self) -> &RewardAccounts {
        &self.reward_accounts
    }

    /// Known datums
    pub fn datum_table(&self) -> &DatumTable {
        &self.datum_table
    }

    /// Move `count` slots forward, committing the mempool if a new block starts
    pub fn await_slot(&mut self, count: u64) {
        if self.clock.advance_slots(count) {
            self.block_boundary();
        }
    }

    /// Move `count` blocks forward and commit the mempool
    pub fn await_block(&mut self, count: u64) {
        self.clock.advance_blocks(count);
        self.block_boundary();
    }

    fn block_boundary(&mut self) {
        let boundary = commit_mempool(&mut self.ledger, &mut self.mempool);
        self.confirmed_txs.extend(std::mem::take(&mut self.pending_txs));

        let state = self.clock.state();
        debug!(
            "Block {} at slot {}: {} outputs promoted, {} spent outputs pruned",
            state.block_height, state.slot, boundary.promoted, boundary.pruned
        );
    }

    /// Credit `amount` to every registered and delegated reward account, then move
    /// one block forward
    pub fn distribute_rewards(&mut self, amount: Lovelace) {
        let rewarded = self.reward_accounts.distribute(amount);
        info!(
            "Distributed {} lovelace of rewards to {} accounts",
            amount, rewarded
        );

        self.await_block(1);
    }

    /// Validate a serialized transaction and, if it is accepted, apply its effects.
    ///
    /// Nothing changes when the transaction is rejected.
    pub fn submit_transaction(&mut self, bytes: &[u8]) -> Result<Hash, EmulatorError> {
        let state = LedgerState {
            ledger: &self.ledger,
            mempool: &self.mempool,
            reward_accounts: &self.reward_accounts,
            slot: self.clock.state().slot,
        };

        let effects = match validate_transaction_bytes(&self.codec, &state, bytes) {
            Ok(effects) => effects,
            Err(e) => {
                warn!("Transaction rejected: {}", e);
                return Err(e.into());
            }
        };
        let tx_hash = effects.tx_hash;

        apply_transaction_effects(
            effects,
            LedgerStateMut {
                ledger: &mut self.ledger,
                mempool: &mut self.mempool,
                reward_accounts: &mut self.reward_accounts,
                datum_table: &mut self.datum_table,
            },
        );
        self.pending_txs.insert(tx_hash);
        info!("Transaction {} accepted", tx_hash);

        Ok(tx_hash)
    }

    /// Redeemers declared by a serialized transaction, with their execution units
    /// as declared
    pub fn evaluate_transaction(&self, bytes: &[u8]) -> Result<Vec<EvalRedeemer>, EmulatorError> {
        let tx = self.codec.parse_transaction(bytes)?;

        Ok(tx
            .witness_set
            .redeemers
            .iter()
            .map(EvalRedeemer::from)
            .collect())
    }

    /// Assets held by each address in the ledger, including spent outputs not yet pruned
    pub fn balances(&self) -> BTreeMap<Address, Assets> {
        let mut balances: BTreeMap<Address, Assets> = BTreeMap::new();
        for utxo in self.ledger.utxos() {
            balances
                .entry(utxo.output.address.clone())
                .or_default()
                .add(&utxo.output.assets);
        }

        balances
    }

    /// Log the clock and the balance of every address in the ledger
    pub fn log_state(&self) {
        let balances = self.balances();
        let mut totals = Assets::new();
        for assets in balances.values() {
            totals.add(assets);
        }

        let state = self.clock.state();
        info!(
            "Blockchain state: block height {}, slot {}, unix time {}",
            state.block_height, state.slot, state.time
        );

        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(row!["Address", "Unit", r->"Quantity", "Share"]);
        for (address, assets) in &balances {
            for (unit, quantity) in assets.iter() {
                table.add_row(row![
                    address,
                    unit,
                    r->quantity.to_formatted_string(&Locale::en),
                    share_bar(*quantity, totals.get(unit))
                ]);
            }
        }
        info!("Balances:\n{}", table);
    }
}

fn share_bar(quantity: u64, total: u64) -> String {
    let filled = if total == 0 {
        1
    } else {
        ((BAR_WIDTH as u128 * u128::from(quantity)) / u128::from(total)) as usize
    };

    "\u{2586}".repeat(filled.clamp(1, BAR_WIDTH))
}

impl<C: LedgerCodec> Provider for Emulator<C> {
    fn get_protocol_parameters(&self) -> ProtocolParameters {
        self.protocol_parameters.clone()
    }

    fn get_utxos(&self, address_or_credential: &AddressOrCredential) -> Vec<Utxo> {
        self.ledger
            .utxos()
            .filter(|utxo| address_or_credential.matches(&self.codec, utxo))
            .cloned()
            .collect()
    }

    fn get_utxos_with_unit(
        &self,
        address_or_credential: &AddressOrCredential,
        unit: &str,
    ) -> Vec<Utxo> {
        self.ledger
            .utxos()
            .filter(|utxo| utxo.output.assets.get(unit) > 0)
            .filter(|utxo| address_or_credential.matches(&self.codec, utxo))
            .cloned()
            .collect()
    }

    fn get_utxo_by_unit(&self, unit: &str) -> Result<Utxo, EmulatorError> {
        let mut holders = self
            .ledger
            .utxos()
            .filter(|utxo| utxo.output.assets.get(unit) > 0);

        match (holders.next(), holders.count()) {
            (Some(utxo), 0) => Ok(utxo.clone()),
            (Some(_), others) => Err(EmulatorError::UnitNotUnique {
                unit: unit.to_string(),
                count: others + 1,
            }),
            (None, _) => Err(EmulatorError::UnitNotFound {
                unit: unit.to_string(),
            }),
        }
    }

    fn get_utxos_by_out_ref(&self, out_refs: &[OutputPointer]) -> Vec<Utxo> {
        out_refs
            .iter()
            .filter_map(|out_ref| self.ledger.get(out_ref))
            .map(|entry| entry.utxo.clone())
            .collect()
    }

    fn get_delegation(&self, reward_address: &str) -> Delegation {
        self.reward_accounts.delegation(reward_address)
    }

    fn get_datum(&self, datum_hash: &Hash) -> Option<PlutusData> {
        self.datum_table.get(datum_hash).cloned()
    }

    fn await_tx(&mut self, tx_hash: &Hash) -> bool {
        if self.pending_txs.contains(tx_hash) {
            self.await_block(1);
        }

        self.confirmed_txs.contains(tx_hash)
    }

    fn submit_tx(&mut self, tx: &[u8]) -> Result<Hash, EmulatorError> {
        self.submit_transaction(tx)
    }

    fn evaluate_tx(&self, tx: &[u8]) -> Result<Vec<EvalRedeemer>, EmulatorError> {
        self.evaluate_transaction(tx)
    }
}
