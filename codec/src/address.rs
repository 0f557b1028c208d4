//! Shelley-style bech32 addresses.
//!
//! The first byte of an address is a header: the high nibble selects the address type
//! (and whether each credential is a key or a script), the low nibble holds the network
//! id. Credentials follow as 28-byte hashes.

use bech32::{Bech32, Hrp};

use emulator_crypto::hash::HASH_224_LENGTH;
use emulator_data_structures::{
    chain::{Address, AddressDetails, Credential, KeyHash, RewardAddress, ScriptHash},
    error::CodecError,
};

/// Network id of the main network; any other id is a test network
pub const MAINNET_NETWORK_ID: u8 = 1;

const BASE_KEY_KEY: u8 = 0b0000;
const BASE_SCRIPT_KEY: u8 = 0b0001;
const BASE_KEY_SCRIPT: u8 = 0b0010;
const BASE_SCRIPT_SCRIPT: u8 = 0b0011;
const ENTERPRISE_KEY: u8 = 0b0110;
const ENTERPRISE_SCRIPT: u8 = 0b0111;
const REWARD_KEY: u8 = 0b1110;
const REWARD_SCRIPT: u8 = 0b1111;

fn payment_hrp(network_id: u8) -> &'static str {
    if network_id == MAINNET_NETWORK_ID {
        "addr"
    } else {
        "addr_test"
    }
}

fn reward_hrp(network_id: u8) -> &'static str {
    if network_id == MAINNET_NETWORK_ID {
        "stake"
    } else {
        "stake_test"
    }
}

fn header(address_type: u8, network_id: u8) -> u8 {
    (address_type << 4) | (network_id & 0x0f)
}

fn encode(hrp: &str, bytes: &[u8]) -> Result<String, CodecError> {
    let hrp = Hrp::parse(hrp).map_err(|e| CodecError::Encoding(format!("address prefix: {}", e)))?;

    bech32::encode::<Bech32>(hrp, bytes)
        .map_err(|e| CodecError::Encoding(format!("address: {}", e)))
}

fn credential_bytes(credential: &Credential) -> &[u8] {
    match credential {
        Credential::Key(key_hash) => key_hash.as_bytes(),
        Credential::Script(script_hash) => script_hash.as_bytes(),
    }
}

/// Address with both a payment and a stake credential
pub fn base_address(
    network_id: u8,
    payment: &Credential,
    stake: &Credential,
) -> Result<Address, CodecError> {
    let address_type = match (payment, stake) {
        (Credential::Key(_), Credential::Key(_)) => BASE_KEY_KEY,
        (Credential::Script(_), Credential::Key(_)) => BASE_SCRIPT_KEY,
        (Credential::Key(_), Credential::Script(_)) => BASE_KEY_SCRIPT,
        (Credential::Script(_), Credential::Script(_)) => BASE_SCRIPT_SCRIPT,
    };
    let mut bytes = vec![header(address_type, network_id)];
    bytes.extend_from_slice(credential_bytes(payment));
    bytes.extend_from_slice(credential_bytes(stake));

    encode(payment_hrp(network_id), &bytes)
}

/// Address with a payment credential only
pub fn enterprise_address(network_id: u8, payment: &Credential) -> Result<Address, CodecError> {
    let address_type = match payment {
        Credential::Key(_) => ENTERPRISE_KEY,
        Credential::Script(_) => ENTERPRISE_SCRIPT,
    };
    let mut bytes = vec![header(address_type, network_id)];
    bytes.extend_from_slice(credential_bytes(payment));

    encode(payment_hrp(network_id), &bytes)
}

/// Reward address controlled by a stake credential
pub fn reward_address(network_id: u8, stake: &Credential) -> Result<RewardAddress, CodecError> {
    let address_type = match stake {
        Credential::Key(_) => REWARD_KEY,
        Credential::Script(_) => REWARD_SCRIPT,
    };
    let mut bytes = vec![header(address_type, network_id)];
    bytes.extend_from_slice(credential_bytes(stake));

    encode(reward_hrp(network_id), &bytes)
}

fn read_credential(
    address: &str,
    bytes: &[u8],
    is_script: bool,
) -> Result<Credential, CodecError> {
    let invalid = |msg: String| CodecError::Address {
        address: address.to_string(),
        msg,
    };

    if is_script {
        ScriptHash::from_bytes(bytes)
            .map(Credential::Script)
            .map_err(|e| invalid(e.to_string()))
    } else {
        KeyHash::from_bytes(bytes)
            .map(Credential::Key)
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Decompose a bech32 address into its credentials
pub fn address_details(address: &str) -> Result<AddressDetails, CodecError> {
    let invalid = |msg: String| CodecError::Address {
        address: address.to_string(),
        msg,
    };

    let (hrp, bytes) = bech32::decode(address).map_err(|e| invalid(e.to_string()))?;
    let hrp = hrp.to_lowercase();
    if !(hrp.starts_with("addr") || hrp.starts_with("stake")) {
        return Err(invalid(format!("unknown prefix {}", hrp)));
    }

    let (&first, body) = bytes
        .split_first()
        .ok_or_else(|| invalid("empty address".to_string()))?;
    let address_type = first >> 4;

    let expected_len = match address_type {
        BASE_KEY_KEY..=BASE_SCRIPT_SCRIPT => 2 * HASH_224_LENGTH,
        ENTERPRISE_KEY | ENTERPRISE_SCRIPT | REWARD_KEY | REWARD_SCRIPT => HASH_224_LENGTH,
        other => return Err(invalid(format!("unsupported address type {}", other))),
    };
    if body.len() != expected_len {
        return Err(invalid(format!(
            "expected {} bytes of credentials, found {}",
            expected_len,
            body.len()
        )));
    }

    let details = match address_type {
        BASE_KEY_KEY..=BASE_SCRIPT_SCRIPT => {
            let (payment, stake) = body.split_at(HASH_224_LENGTH);
            AddressDetails {
                payment_credential: Some(read_credential(
                    address,
                    payment,
                    address_type & 0b01 != 0,
                )?),
                stake_credential: Some(read_credential(
                    address,
                    stake,
                    address_type & 0b10 != 0,
                )?),
            }
        }
        ENTERPRISE_KEY | ENTERPRISE_SCRIPT => AddressDetails {
            payment_credential: Some(read_credential(
                address,
                body,
                address_type == ENTERPRISE_SCRIPT,
            )?),
            stake_credential: None,
        },
        _ => AddressDetails {
            payment_credential: None,
            stake_credential: Some(read_credential(
                address,
                body,
                address_type == REWARD_SCRIPT,
            )?),
        },
    };

    Ok(details)
}
