//! Initial accounts the emulator is seeded with.

use serde::{Deserialize, Serialize};

use crate::chain::{Address, Assets, Hash, PlutusData, Script};

/// Extra data attached to a genesis output.
///
/// At most one of `hash`, `as_hash` and `inline` may be set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputData {
    /// Datum hash stored on the output
    pub hash: Option<Hash>,
    /// Datum whose hash is stored on the output
    pub as_hash: Option<PlutusData>,
    /// Datum stored inline on the output
    pub inline: Option<PlutusData>,
    /// Reference script stored on the output
    pub script_ref: Option<Script>,
}

impl OutputData {
    /// Number of datum fields that are set
    pub fn datum_fields(&self) -> usize {
        [
            self.hash.is_some(),
            self.as_hash.is_some(),
            self.inline.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Address and value of one genesis output
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmulatorAccount {
    /// Owner of the output
    pub address: Address,
    /// Value of the output
    pub assets: Assets,
    /// Optional datum and reference script
    #[serde(default)]
    pub output_data: Option<OutputData>,
}

impl EmulatorAccount {
    /// An account without output data
    pub fn new(address: Address, assets: Assets) -> Self {
        Self {
            address,
            assets,
            output_data: None,
        }
    }
}
