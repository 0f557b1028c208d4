//! Reference implementation of the ledger codec: CBOR transactions, bech32 addresses,
//! secp256k1 witnesses and native scripts.

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

pub mod account;
pub mod address;
pub mod cbor;
pub mod native_script;
pub mod signing;

pub use account::{account_from_secret_key, generate_account, GeneratedAccount};
pub use cbor::CborCodec;
pub use signing::sign_transaction;
