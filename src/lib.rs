//! Deterministic in-process emulator of a UTxO ledger.
//!
//! The [Emulator](emulator::Emulator) owns the ledger, the mempool, the reward
//! accounts and the datum table, validates submitted transactions with
//! `emulator_validations` and moves simulated time forward on request.
#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

pub mod clock;
pub mod emulator;
pub mod error;
pub mod logger;
pub mod provider;

pub use crate::{
    emulator::Emulator,
    error::EmulatorError,
    provider::{AddressOrCredential, Provider},
};
