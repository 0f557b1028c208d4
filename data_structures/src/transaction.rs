use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    chain::{
        Credential, KeyHash, Lovelace, OutputPointer, PlutusData, PoolId, RewardAddress, Script,
        ScriptHash, Slot, TransactionOutput,
    },
    serialization_helpers::hex_bytes,
};

/// Purpose a redeemer is attached to
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum RedeemerTag {
    /// Spending a script-locked input
    Spend,
    /// Minting or burning under a script policy
    Mint,
    /// Publishing a certificate with a script stake credential
    Cert,
    /// Withdrawing rewards from a script reward address
    Reward,
    /// Voting with a script credential
    Voting,
    /// Proposing a governance action guarded by a script
    Proposing,
}

impl fmt::Display for RedeemerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RedeemerTag::Spend => "spend",
            RedeemerTag::Mint => "mint",
            RedeemerTag::Cert => "cert",
            RedeemerTag::Reward => "reward",
            RedeemerTag::Voting => "voting",
            RedeemerTag::Proposing => "proposing",
        };

        f.write_str(tag)
    }
}

/// Execution budget
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExUnits {
    /// Memory units
    pub mem: u64,
    /// CPU steps
    pub steps: u64,
}

/// Plutus data plus an execution budget for one script purpose
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Redeemer {
    /// Kind of purpose
    pub tag: RedeemerTag,
    /// Index of the purpose inside its list (inputs, policies, certificates, withdrawals)
    pub index: u32,
    /// Redeemer argument
    pub data: PlutusData,
    /// Budget claimed by the transaction
    pub ex_units: ExUnits,
}

/// Redeemer report returned by transaction evaluation
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EvalRedeemer {
    /// Budget of the redeemer
    pub ex_units: ExUnits,
    /// Index of the redeemer purpose
    pub redeemer_index: u32,
    /// Kind of purpose
    pub redeemer_tag: RedeemerTag,
}

impl From<&Redeemer> for EvalRedeemer {
    fn from(redeemer: &Redeemer) -> Self {
        EvalRedeemer {
            ex_units: redeemer.ex_units,
            redeemer_index: redeemer.index,
            redeemer_tag: redeemer.tag,
        }
    }
}

/// Verification key together with its signature of the transaction hash
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VkeyWitness {
    /// Serialized verification key
    #[serde(with = "hex_bytes")]
    pub vkey: Vec<u8>,
    /// Serialized signature
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// Signatures, scripts, datums and redeemers attached to a transaction
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessSet {
    /// Key witnesses
    pub vkey_witnesses: Vec<VkeyWitness>,
    /// Native, PlutusV1 and PlutusV2 scripts
    pub scripts: Vec<Script>,
    /// Datums
    pub plutus_data: Vec<PlutusData>,
    /// Redeemers
    pub redeemers: Vec<Redeemer>,
}

impl WitnessSet {
    /// Scripts of the native language
    pub fn native_scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts.iter().filter(|script| script.is_native())
    }

    /// Scripts of any plutus language version
    pub fn plutus_scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts.iter().filter(|script| !script.is_native())
    }
}

/// Certificate included in a transaction body.
///
/// Only stake registration, deregistration and delegation have an effect on the emulated
/// ledger; any other certificate kind is carried as `Other` and accepted unconditionally.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Certificate {
    /// Register a stake credential
    StakeRegistration {
        /// Credential being registered
        stake_credential: Credential,
    },
    /// Deregister a stake credential
    StakeDeregistration {
        /// Credential being deregistered
        stake_credential: Credential,
    },
    /// Delegate a registered stake credential to a pool
    StakeDelegation {
        /// Credential being delegated
        stake_credential: Credential,
        /// Target pool
        pool_id: PoolId,
    },
    /// Any certificate not tracked by the emulator
    Other {
        /// Name of the certificate kind
        kind: String,
    },
}

/// Withdrawal of accrued rewards
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Reward address the rewards are withdrawn from
    pub reward_address: RewardAddress,
    /// Withdrawn amount
    pub amount: Lovelace,
}

/// Assets minted (positive) or burned (negative) under one policy
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PolicyMint {
    /// Hash of the minting policy script
    pub policy_id: ScriptHash,
    /// Quantities indexed by hex asset name
    pub assets: BTreeMap<String, i64>,
}

/// Body of a transaction, the part covered by the transaction hash
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionBody {
    /// Outputs being spent
    pub inputs: Vec<OutputPointer>,
    /// Outputs being created
    pub outputs: Vec<TransactionOutput>,
    /// Fee paid by the transaction
    pub fee: Lovelace,
    /// Last slot (inclusive) in which the transaction is valid
    pub ttl: Option<Slot>,
    /// First slot (inclusive) in which the transaction is valid
    pub validity_interval_start: Option<Slot>,
    /// Certificates
    pub certs: Vec<Certificate>,
    /// Reward withdrawals
    pub withdrawals: Vec<Withdrawal>,
    /// Minted and burned assets
    pub mint: Vec<PolicyMint>,
    /// Collateral inputs
    pub collateral_inputs: Vec<OutputPointer>,
    /// Key hashes that must sign the transaction
    pub required_signers: Vec<KeyHash>,
    /// Outputs read but not spent
    pub reference_inputs: Vec<OutputPointer>,
}

/// Transaction: body plus witness set
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Body
    pub body: TransactionBody,
    /// Witness set
    pub witness_set: WitnessSet,
}
