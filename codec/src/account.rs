use rand::RngCore;

use emulator_crypto::secp256k1::SecretKey;
use emulator_data_structures::{
    chain::{Address, Assets, Credential, KeyHash},
    error::CodecError,
    genesis::EmulatorAccount,
};

use crate::{address::enterprise_address, cbor::key_hash_of};

/// Key pair and enterprise address of an emulator account
#[derive(Clone, Debug)]
pub struct GeneratedAccount {
    /// Signing key
    pub secret_key: SecretKey,
    /// Hash of the verification key
    pub key_hash: KeyHash,
    /// Enterprise address locked by `key_hash`
    pub address: Address,
    /// Initial funds
    pub assets: Assets,
}

impl GeneratedAccount {
    /// Genesis entry funding this account
    pub fn to_emulator_account(&self) -> EmulatorAccount {
        EmulatorAccount::new(self.address.clone(), self.assets.clone())
    }
}

/// Build the account controlled by `secret_key`
pub fn account_from_secret_key(
    network_id: u8,
    secret_key: SecretKey,
    assets: Assets,
) -> Result<GeneratedAccount, CodecError> {
    let key_hash = key_hash_of(&secret_key);
    let address = enterprise_address(network_id, &Credential::Key(key_hash))?;

    Ok(GeneratedAccount {
        secret_key,
        key_hash,
        address,
        assets,
    })
}

/// Create an account with a fresh random signing key
pub fn generate_account(network_id: u8, assets: Assets) -> Result<GeneratedAccount, CodecError> {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    let secret_key = loop {
        rng.fill_bytes(&mut bytes);
        // Out of range values are astronomically unlikely
        if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
            break secret_key;
        }
    };

    let account = account_from_secret_key(network_id, secret_key, assets)?;
    log::debug!("Generated account {}", account.address);

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::address_details;

    #[test]
    fn generated_accounts_are_distinct() {
        let a = generate_account(0, Assets::from_lovelace(1)).unwrap();
        let b = generate_account(0, Assets::from_lovelace(1)).unwrap();

        assert_ne!(a.address, b.address);
        assert_eq!(
            address_details(&a.address).unwrap().payment_credential,
            Some(Credential::Key(a.key_hash))
        );
    }

    #[test]
    fn account_from_fixed_key() {
        let secret_key = SecretKey::from_slice(&[0x43; 32]).unwrap();
        let account =
            account_from_secret_key(0, secret_key, Assets::from_lovelace(5_000_000)).unwrap();
        let genesis = account.to_emulator_account();

        assert!(account.address.starts_with("addr_test1"));
        assert_eq!(genesis.address, account.address);
        assert_eq!(genesis.assets.lovelace(), 5_000_000);
        assert_eq!(genesis.output_data, None);
    }
}
