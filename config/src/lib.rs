//! # Emulator configuration
//!
//! Loading and merging of the emulator settings: clock constants, network
//! id, log level and the protocol parameters handed out to callers.
#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

pub mod config;
pub mod defaults;
pub mod loaders;

pub use crate::config::{Config, PartialConfig};
