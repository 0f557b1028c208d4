#![cfg_attr(test, allow(dead_code, unused_macros, unused_imports))]
#![deny(rust_2018_idioms)]

/// Module containing the ledger's chain data types
pub mod chain;

/// Module containing transaction types
pub mod transaction;

/// Module containing the ledger and mempool output stores
pub mod utxo_pool;

/// Module containing reward account bookkeeping
pub mod staking;

/// Module containing the table of known datums
pub mod datum_table;

/// Module containing the initial accounts
pub mod genesis;

/// Module containing the codec capability trait
pub mod codec;

/// Module containing error definitions
pub mod error;

/// Serialization boilerplate to allow serializing some data structures as
/// hexadecimal strings.
pub mod serialization_helpers;
