use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use emulator_crypto::hash::{Sha256, HASH_224_LENGTH};

use crate::serialization_helpers::hex_bytes;

/// Slot number (starting from 0)
pub type Slot = u64;

/// Unix timestamp in milliseconds
pub type UnixTime = i64;

/// Amount of the base currency
pub type Lovelace = u64;

/// Bech32 encoded payment address
pub type Address = String;

/// Bech32 encoded reward (stake) address
pub type RewardAddress = String;

/// Bech32 encoded stake pool identifier
pub type PoolId = String;

/// Concatenation of policy id and asset name, both in hex, or `lovelace`
pub type Unit = String;

/// Unit used for the base currency inside an `Assets` bundle
pub const LOVELACE: &str = "lovelace";

/// Error returned when a hexadecimal hash cannot be parsed
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HashParseError {
    /// The string is not valid hexadecimal
    #[error("failed to parse hex string: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The decoded bytes do not have the expected length
    #[error("invalid hash length: expected {expected} bytes, found {found}")]
    InvalidLength {
        /// Expected number of bytes
        expected: usize,
        /// Number of bytes found
        found: usize,
    },
}

/// Digest type
pub type SHA256 = [u8; 32];

/// Hash of a transaction body or of a datum
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Hash {
    /// SHA-256 Hash
    SHA256(SHA256),
}

impl Default for Hash {
    fn default() -> Hash {
        Hash::SHA256([0; 32])
    }
}

impl From<Sha256> for Hash {
    fn from(x: Sha256) -> Self {
        Hash::SHA256(x.0)
    }
}

impl Hash {
    /// Raw bytes of the hash
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Hash::SHA256(x) => x,
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hash::SHA256(x) => f.write_str(&hex::encode(x)),
        }
    }
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let found = bytes.len();
        let hash: SHA256 = bytes
            .try_into()
            .map_err(|_| HashParseError::InvalidLength {
                expected: 32,
                found,
            })?;

        Ok(Hash::SHA256(hash))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}

macro_rules! hash224_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name {
            /// 224-bit digest
            pub hash: [u8; HASH_224_LENGTH],
        }

        impl $name {
            /// Build from a byte slice of exactly 28 bytes
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashParseError> {
                let hash = bytes
                    .try_into()
                    .map_err(|_| HashParseError::InvalidLength {
                        expected: HASH_224_LENGTH,
                        found: bytes.len(),
                    })?;

                Ok(Self { hash })
            }

            /// Raw bytes of the hash
            pub fn as_bytes(&self) -> &[u8] {
                &self.hash
            }
        }

        impl From<[u8; HASH_224_LENGTH]> for $name {
            fn from(hash: [u8; HASH_224_LENGTH]) -> Self {
                Self { hash }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.hash))
            }
        }

        impl FromStr for $name {
            type Err = HashParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_bytes(&hex::decode(s)?)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;

                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hash224_type!(
    /// Hash of a verification key
    KeyHash
);

hash224_type!(
    /// Hash of a script, also used as minting policy id
    ScriptHash
);

/// Payment or stake credential
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Credential {
    /// Controlled by the holder of a signing key
    Key(KeyHash),
    /// Controlled by a native or plutus script
    Script(ScriptHash),
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Key(key_hash) => write!(f, "key:{}", key_hash),
            Credential::Script(script_hash) => write!(f, "script:{}", script_hash),
        }
    }
}

/// Credentials that can be extracted from an address
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddressDetails {
    /// Credential that controls spending from the address
    pub payment_credential: Option<Credential>,
    /// Credential that controls the stake of the address
    pub stake_credential: Option<Credential>,
}

/// Unspent output data structure (equivalent of Bitcoin's UTXO)
/// It is used to locate the output by its transaction identifier and its position
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OutputPointer {
    /// Hash of the transaction that created the output
    pub transaction_id: Hash,
    /// Position of the output inside that transaction
    pub output_index: u32,
}

impl fmt::Display for OutputPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.output_index)
    }
}

/// Error returned when an output pointer cannot be parsed from its `<hash>#<index>` form
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OutputPointerParseError {
    /// Missing `#` separator
    #[error("output pointer must have the form <tx_hash>#<output_index>")]
    MissingDelimiter,
    /// The transaction hash is not valid
    #[error("invalid transaction hash: {0}")]
    Hash(#[from] HashParseError),
    /// The output index is not a valid number
    #[error("invalid output index: {0}")]
    Index(#[from] std::num::ParseIntError),
}

impl FromStr for OutputPointer {
    type Err = OutputPointerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hash, index) = s
            .split_once('#')
            .ok_or(OutputPointerParseError::MissingDelimiter)?;

        Ok(OutputPointer {
            transaction_id: hash.parse()?,
            output_index: index.parse()?,
        })
    }
}

/// Bundle of base currency and native assets, indexed by unit
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Assets(BTreeMap<Unit, u64>);

impl Assets {
    /// An empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle holding only base currency
    pub fn from_lovelace(lovelace: Lovelace) -> Self {
        Self::new().with(LOVELACE, lovelace)
    }

    /// Builder-style insertion
    pub fn with<U: Into<Unit>>(mut self, unit: U, quantity: u64) -> Self {
        self.insert(unit, quantity);

        self
    }

    /// Set the quantity of `unit`
    pub fn insert<U: Into<Unit>>(&mut self, unit: U, quantity: u64) -> Option<u64> {
        self.0.insert(unit.into(), quantity)
    }

    /// Quantity of `unit`, zero when absent
    pub fn get(&self, unit: &str) -> u64 {
        self.0.get(unit).copied().unwrap_or(0)
    }

    /// Quantity of base currency
    pub fn lovelace(&self) -> Lovelace {
        self.get(LOVELACE)
    }

    /// Add every quantity in `other` to this bundle
    pub fn add(&mut self, other: &Assets) {
        for (unit, quantity) in other.iter() {
            let entry = self.0.entry(unit.clone()).or_insert(0);
            *entry = entry.saturating_add(*quantity);
        }
    }

    /// Iterate over units and quantities in unit order
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, Unit, u64> {
        self.0.iter()
    }

    /// Returns `true` if the bundle holds nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Unit, u64)> for Assets {
    fn from_iter<I: IntoIterator<Item = (Unit, u64)>>(iter: I) -> Self {
        Assets(iter.into_iter().collect())
    }
}

/// Plutus data in its serialized form
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PlutusData(#[serde(with = "hex_bytes")] pub Vec<u8>);

impl PlutusData {
    /// Decode plutus data from its hexadecimal representation
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(PlutusData)
    }
}

impl fmt::Display for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Datum attached to an output
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DatumOption {
    /// Only the hash of the datum is stored in the output
    Hash(Hash),
    /// The datum itself is stored in the output
    Inline(PlutusData),
}

/// Script language
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum ScriptKind {
    /// Signature and time-lock predicate
    Native,
    /// Plutus language version 1
    PlutusV1,
    /// Plutus language version 2
    PlutusV2,
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptKind::Native => "Native",
            ScriptKind::PlutusV1 => "PlutusV1",
            ScriptKind::PlutusV2 => "PlutusV2",
        };

        f.write_str(name)
    }
}

/// Serialized script tagged with its language
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Script language
    pub kind: ScriptKind,
    /// Serialized script
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

impl Script {
    /// Returns `true` for native scripts
    pub fn is_native(&self) -> bool {
        self.kind == ScriptKind::Native
    }
}

/// Output of a transaction
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Address that locks the output
    pub address: Address,
    /// Value held by the output
    pub assets: Assets,
    /// Optional datum, inline or referenced by hash
    #[serde(default)]
    pub datum: Option<DatumOption>,
    /// Optional script made available to transactions that reference this output
    #[serde(default)]
    pub script_ref: Option<Script>,
}

impl TransactionOutput {
    /// An output holding `assets` at `address`, without datum or script
    pub fn new(address: Address, assets: Assets) -> Self {
        Self {
            address,
            assets,
            datum: None,
            script_ref: None,
        }
    }

    /// Hash of the datum, only when the output stores the datum by hash
    pub fn datum_hash(&self) -> Option<Hash> {
        match &self.datum {
            Some(DatumOption::Hash(hash)) => Some(*hash),
            _ => None,
        }
    }

    /// Inline datum, if any
    pub fn inline_datum(&self) -> Option<&PlutusData> {
        match &self.datum {
            Some(DatumOption::Inline(datum)) => Some(datum),
            _ => None,
        }
    }
}

/// Unspent transaction output, identified by its output pointer
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    /// Location of the output
    pub out_ref: OutputPointer,
    /// The output itself
    pub output: TransactionOutput,
}

/// Delegation state of a reward address
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    /// Pool the stake is delegated to, if any
    pub pool_id: Option<PoolId>,
    /// Rewards accrued and not yet withdrawn
    pub rewards: Lovelace,
}

/// Protocol parameters consumed by fee and size calculations of transaction builders.
/// The emulator hands them out but never interprets or mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParameters {
    /// Fee per byte of transaction
    pub min_fee_a: u64,
    /// Constant fee per transaction
    pub min_fee_b: u64,
    /// Maximum transaction size in bytes
    pub max_tx_size: u32,
    /// Maximum serialized value size in bytes
    pub max_val_size: u32,
    /// Stake key registration deposit
    pub key_deposit: Lovelace,
    /// Pool registration deposit
    pub pool_deposit: Lovelace,
    /// DRep registration deposit
    pub drep_deposit: Lovelace,
    /// Governance action deposit
    pub gov_action_deposit: Lovelace,
    /// Price per unit of memory
    pub price_mem: f64,
    /// Price per execution step
    pub price_step: f64,
    /// Maximum memory units per transaction
    pub max_tx_ex_mem: u64,
    /// Maximum execution steps per transaction
    pub max_tx_ex_steps: u64,
    /// Minimum output value per serialized byte
    pub coins_per_utxo_byte: Lovelace,
    /// Collateral as a percentage of the fee
    pub collateral_percentage: u32,
    /// Maximum number of collateral inputs
    pub max_collateral_inputs: u32,
    /// Fee per byte of reference scripts
    pub min_fee_ref_script_cost_per_byte: u64,
    /// Cost models indexed by script language
    pub cost_models: BTreeMap<String, Vec<i64>>,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            min_fee_a: 44,
            min_fee_b: 155_381,
            max_tx_size: 16_384,
            max_val_size: 5_000,
            key_deposit: 2_000_000,
            pool_deposit: 500_000_000,
            drep_deposit: 500_000_000,
            gov_action_deposit: 100_000_000_000,
            price_mem: 0.0577,
            price_step: 0.0000721,
            max_tx_ex_mem: 14_000_000,
            max_tx_ex_steps: 10_000_000_000,
            coins_per_utxo_byte: 4_310,
            collateral_percentage: 150,
            max_collateral_inputs: 3,
            min_fee_ref_script_cost_per_byte: 15,
            cost_models: BTreeMap::new(),
        }
    }
}
