//! Load the configuration from a file or a `String` written in [Toml format](https://en.wikipedia.org/wiki/TOML)

use std::fs::File;
use std::io;
use std::io::Read;
use std::result;

use crate::config::PartialConfig;

/// Error type denoting the different errors this module can fail with.
/// Parsing the configuration from Toml might fail with a
/// `toml::de::Error`, but loading that configuration from a file
/// might also fail with a `std::io::Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Indicates there was an error when trying to load configuration from a file.
    #[error(transparent)]
    IOError(io::Error),
    /// Indicates there was an error when trying to build a
    /// `PartialConfig` instance out of the Toml string given.
    #[error(transparent)]
    ParseError(toml::de::Error),
}

/// Just like `std::result::Result` but with the error param fixed to
/// `Error` type in this module.
pub type Result<T> = result::Result<T, Error>;

/// Load configuration from a file written in Toml format.
pub fn from_file(filename: &str) -> Result<PartialConfig> {
    let mut contents = String::new();
    read_file_contents(filename, &mut contents).map_err(Error::IOError)?;
    from_str(&contents)
}

#[cfg(not(test))]
fn read_file_contents(filename: &str, contents: &mut String) -> io::Result<usize> {
    let mut file = File::open(filename)?;
    file.read_to_string(contents)
}

#[cfg(test)]
fn read_file_contents(_filename: &str, _contents: &mut String) -> io::Result<usize> {
    Ok(0)
}

/// Load configuration from a string written in Toml format.
pub fn from_str(contents: &str) -> Result<PartialConfig> {
    toml::from_str(contents).map_err(Error::ParseError)
}
