//! # Default per-environment values
//!
//! This module contains the per-environment default values of the
//! emulator settings.
use std::time::Duration;

use emulator_data_structures::chain::ProtocolParameters;

/// Trait defining all the configuration params that have a suitable
/// default value depending on the environment.
pub trait Defaults {
    /// Default log level
    fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::Info
    }

    /// Default number of slots per block: `20`
    fn emulator_block_slot_width(&self) -> u64 {
        20
    }

    /// Default slot length: one second
    fn emulator_slot_length(&self) -> Duration {
        Duration::from_millis(1000)
    }

    /// Network id used for addresses
    fn emulator_network_id(&self) -> u8;

    /// Default protocol parameters
    fn protocol_parameters(&self) -> ProtocolParameters {
        ProtocolParameters::default()
    }
}

/// Struct that will implement all the mainnet defaults
pub struct Mainnet;

/// Struct that will implement all the testnet defaults
pub struct Testnet;

impl Defaults for Mainnet {
    fn emulator_network_id(&self) -> u8 {
        1
    }
}

impl Defaults for Testnet {
    fn emulator_network_id(&self) -> u8 {
        0
    }
}
