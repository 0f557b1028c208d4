//! # Config
//!
//! This module contains the `Config` struct, which holds every setting of
//! the emulator. `Config` is __total__: each field has a value. The
//! loaders return a [PartialConfig](PartialConfig) instead, where every
//! field is optional, and `Config::from_partial` fills the gaps with the
//! defaults of the selected environment.
//!
//! ```
//! use emulator_config::config::{Config, PartialConfig};
//!
//! // Default config for testnet
//! let config = Config::from_partial(&PartialConfig::default());
//! assert_eq!(config, Config::default());
//! ```
use std::time::Duration;

use log::{warn, LevelFilter};
use serde::{Deserialize, Deserializer, Serialize};

use emulator_data_structures::chain::{ProtocolParameters, UnixTime};

use crate::defaults::{Defaults, Mainnet, Testnet};

/// Possible values for the "environment" configuration param.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    /// Addresses are rendered with mainnet prefixes
    #[serde(rename = "mainnet")]
    Mainnet,
    /// Addresses are rendered with testnet prefixes
    #[default]
    #[serde(rename = "testnet")]
    Testnet,
}

/// The total configuration object
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Environment whose defaults fill the missing fields
    pub environment: Environment,
    /// Clock and network settings
    pub emulator: Emulator,
    /// Logging settings
    pub log: Log,
    /// Parameters returned by `get_protocol_parameters`
    pub protocol_parameters: ProtocolParameters,
}

/// Partial version of [Config](Config), as read from a file
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PartialConfig {
    /// See [Config::environment](Config::environment)
    #[serde(default)]
    pub environment: Environment,
    /// See [Config::emulator](Config::emulator)
    #[serde(default)]
    pub emulator: PartialEmulator,
    /// See [Config::log](Config::log)
    #[serde(default)]
    pub log: PartialLog,
    /// Overrides the default protocol parameters as a whole
    #[serde(default)]
    pub protocol_parameters: Option<ProtocolParameters>,
}

/// Clock and network configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Emulator {
    /// Number of slots per block
    pub block_slot_width: u64,
    /// Duration of a slot
    pub slot_length: Duration,
    /// Network id used when rendering addresses
    pub network_id: u8,
    /// Unix time in milliseconds of slot 0. The wall clock is used when missing.
    pub genesis_time: Option<UnixTime>,
}

/// Partial version of [Emulator](Emulator)
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PartialEmulator {
    /// See [Emulator::block_slot_width](Emulator::block_slot_width)
    #[serde(default)]
    pub block_slot_width: Option<u64>,
    /// See [Emulator::slot_length](Emulator::slot_length)
    #[serde(
        default,
        deserialize_with = "from_millis",
        rename = "slot_length_millis"
    )]
    pub slot_length: Option<Duration>,
    /// See [Emulator::network_id](Emulator::network_id)
    #[serde(default)]
    pub network_id: Option<u8>,
    /// See [Emulator::genesis_time](Emulator::genesis_time)
    #[serde(default)]
    pub genesis_time: Option<UnixTime>,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Log {
    /// Level filter for the emulator logger
    pub level: LevelFilter,
}

/// Partial version of [Log](Log)
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PartialLog {
    /// See [Log::level](Log::level)
    #[serde(default)]
    pub level: Option<LevelFilter>,
}

fn from_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match u64::deserialize(deserializer) {
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(_) => None,
    })
}

impl Config {
    /// Build a total config from a partial one, using the defaults of
    /// `config.environment` for the missing fields
    pub fn from_partial(config: &PartialConfig) -> Self {
        let defaults: &dyn Defaults = match config.environment {
            Environment::Mainnet => &Mainnet,
            Environment::Testnet => &Testnet,
        };

        let mut emulator = Emulator::from_partial(&config.emulator, defaults);
        if emulator.block_slot_width == 0 {
            emulator.block_slot_width = defaults.emulator_block_slot_width();
            warn!(
                "A block slot width of 0 is not allowed, using {} instead",
                emulator.block_slot_width
            );
        }

        Config {
            environment: config.environment,
            emulator,
            log: Log::from_partial(&config.log, defaults),
            protocol_parameters: config
                .protocol_parameters
                .to_owned()
                .unwrap_or_else(|| defaults.protocol_parameters()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_partial(&PartialConfig::default())
    }
}

impl Emulator {
    /// Fill the missing fields of `config` from `defaults`
    pub fn from_partial(config: &PartialEmulator, defaults: &dyn Defaults) -> Self {
        Emulator {
            block_slot_width: config
                .block_slot_width
                .unwrap_or_else(|| defaults.emulator_block_slot_width()),
            slot_length: config
                .slot_length
                .unwrap_or_else(|| defaults.emulator_slot_length()),
            network_id: config
                .network_id
                .unwrap_or_else(|| defaults.emulator_network_id()),
            genesis_time: config.genesis_time,
        }
    }
}

impl Log {
    /// Fill the missing fields of `config` from `defaults`
    pub fn from_partial(config: &PartialLog, defaults: &dyn Defaults) -> Self {
        Log {
            level: config.level.unwrap_or_else(|| defaults.log_level()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulator_default_from_partial() {
        let partial = PartialEmulator::default();
        let config = Emulator::from_partial(&partial, &Testnet);

        assert_eq!(config.block_slot_width, 20);
        assert_eq!(config.slot_length, Duration::from_millis(1000));
        assert_eq!(config.network_id, 0);
        assert_eq!(config.genesis_time, None);
    }

    #[test]
    fn test_emulator_from_partial() {
        let partial = PartialEmulator {
            block_slot_width: Some(5),
            slot_length: Some(Duration::from_millis(200)),
            network_id: Some(1),
            genesis_time: Some(1_600_000_000_000),
        };
        let config = Emulator::from_partial(&partial, &Testnet);

        assert_eq!(config.block_slot_width, 5);
        assert_eq!(config.slot_length, Duration::from_millis(200));
        assert_eq!(config.network_id, 1);
        assert_eq!(config.genesis_time, Some(1_600_000_000_000));
    }

    #[test]
    fn test_mainnet_defaults() {
        let config = Config::from_partial(&PartialConfig {
            environment: Environment::Mainnet,
            ..PartialConfig::default()
        });

        assert_eq!(config.emulator.network_id, 1);
        assert_eq!(config.log.level, LevelFilter::Info);
    }

    #[test]
    fn test_zero_block_slot_width_uses_default() {
        let config = Config::from_partial(&PartialConfig {
            emulator: PartialEmulator {
                block_slot_width: Some(0),
                ..PartialEmulator::default()
            },
            ..PartialConfig::default()
        });

        assert_eq!(config.emulator.block_slot_width, 20);
    }
}
