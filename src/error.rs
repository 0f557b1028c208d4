//! Error type definitions for the emulator.

use thiserror::Error;

use emulator_config::loaders::toml::Error as ConfigError;
use emulator_data_structures::{
    chain::Unit,
    error::{CodecError, TransactionError},
};

/// Failure of an emulator operation
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// The submitted transaction was rejected
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    /// The codec could not decode or hash a value
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The configuration file could not be loaded
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    /// The codec renders addresses for another network than the configured one
    #[error("Configured network id {config} does not match the codec network id {codec}")]
    NetworkMismatch { config: u8, codec: u8 },
    /// A genesis account sets more than one of `hash`, `as_hash` and `inline`
    #[error("Genesis account {index} sets more than one of hash, as_hash and inline")]
    ConflictingOutputData { index: usize },
    /// No committed output holds the unit
    #[error("No output holds unit {unit}")]
    UnitNotFound { unit: Unit },
    /// The unit is held by more than one committed output
    #[error("Unit {unit} is held by {count} outputs, it must be an NFT or held by one address")]
    UnitNotUnique { unit: Unit, count: usize },
}
