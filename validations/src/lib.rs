//! Validations

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Module containing the logic used to apply an accepted transaction to the emulator state
pub mod consolidation;
/// Module containing validations
pub mod validations;
/// Module containing witness bookkeeping
pub mod witnessing;

#[cfg(test)]
mod tests;
