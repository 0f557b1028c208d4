//! Read and submit interface shared by the emulator and real chain providers.

use emulator_data_structures::{
    chain::{
        Address, Credential, Delegation, Hash, OutputPointer, PlutusData, ProtocolParameters,
        Utxo,
    },
    codec::LedgerCodec,
    transaction::EvalRedeemer,
};

use crate::error::EmulatorError;

/// Selects outputs either by exact address or by payment credential
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddressOrCredential {
    /// Outputs locked by this address
    Address(Address),
    /// Outputs whose address has this payment credential
    Credential(Credential),
}

impl AddressOrCredential {
    /// Whether the output belongs to this address or credential.
    ///
    /// Outputs whose address cannot be decomposed never match a credential.
    pub fn matches<C: LedgerCodec>(&self, codec: &C, utxo: &Utxo) -> bool {
        match self {
            AddressOrCredential::Address(address) => *address == utxo.output.address,
            AddressOrCredential::Credential(credential) => codec
                .address_details(&utxo.output.address)
                .map(|details| details.payment_credential.as_ref() == Some(credential))
                .unwrap_or(false),
        }
    }
}

impl From<Address> for AddressOrCredential {
    fn from(address: Address) -> Self {
        AddressOrCredential::Address(address)
    }
}

impl From<&str> for AddressOrCredential {
    fn from(address: &str) -> Self {
        AddressOrCredential::Address(address.to_string())
    }
}

impl From<Credential> for AddressOrCredential {
    fn from(credential: Credential) -> Self {
        AddressOrCredential::Credential(credential)
    }
}

/// Chain access used by transaction builders
pub trait Provider {
    /// Protocol parameters in effect
    fn get_protocol_parameters(&self) -> ProtocolParameters;

    /// Unspent outputs of an address or payment credential
    fn get_utxos(&self, address_or_credential: &AddressOrCredential) -> Vec<Utxo>;

    /// Unspent outputs of an address or payment credential that hold some `unit`
    fn get_utxos_with_unit(
        &self,
        address_or_credential: &AddressOrCredential,
        unit: &str,
    ) -> Vec<Utxo>;

    /// The single unspent output holding `unit`
    fn get_utxo_by_unit(&self, unit: &str) -> Result<Utxo, EmulatorError>;

    /// Known outputs among `out_refs`, in request order. Unknown pointers are skipped.
    fn get_utxos_by_out_ref(&self, out_refs: &[OutputPointer]) -> Vec<Utxo>;

    /// Delegation and rewards of a reward address
    fn get_delegation(&self, reward_address: &str) -> Delegation;

    /// Datum with the given hash, if known
    fn get_datum(&self, datum_hash: &Hash) -> Option<PlutusData>;

    /// Wait until the transaction is confirmed. Returns whether it was.
    fn await_tx(&mut self, tx_hash: &Hash) -> bool;

    /// Submit a serialized transaction and return its hash
    fn submit_tx(&mut self, tx: &[u8]) -> Result<Hash, EmulatorError>;

    /// Execution units of every redeemer of a serialized transaction
    fn evaluate_tx(&self, tx: &[u8]) -> Result<Vec<EvalRedeemer>, EmulatorError>;
}
