//! Logger setup for binaries and tests embedding the emulator.

use std::path::Path;

use emulator_config::{config::Log, loaders, Config};

use crate::error::EmulatorError;

/// Install an `env_logger` that shows messages of the emulator crates up to
/// `log.level` and messages of other crates up to `Info`.
///
/// Fails if a logger is already installed.
pub fn init_logger(log: &Log) -> Result<(), log::SetLoggerError> {
    log::info!("Setting emulator log level to: {}", log.level);

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log::LevelFilter::Info)
        .filter_module("emulator", log.level)
        .try_init()
}

/// Load a TOML configuration file and merge it over the environment defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, EmulatorError> {
    let path = path.as_ref().to_string_lossy();
    let partial = loaders::toml::from_file(&path)?;

    Ok(Config::from_partial(&partial))
}
