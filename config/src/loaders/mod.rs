//! Loaders producing a [PartialConfig](crate::config::PartialConfig)

pub mod toml;
