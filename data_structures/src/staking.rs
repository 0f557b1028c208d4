use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::{Delegation, Lovelace, PoolId, RewardAddress};

/// Registration and delegation state of one reward address
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RewardAccountState {
    /// Whether the stake credential is currently registered
    pub registered_stake: bool,
    /// Delegated pool and accrued rewards
    pub delegation: Delegation,
}

/// Reward accounts indexed by reward address.
///
/// An account is created the first time its stake credential is registered and is
/// never removed afterwards: deregistration only clears the flag and the pool.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RewardAccounts {
    accounts: BTreeMap<RewardAddress, RewardAccountState>,
}

impl RewardAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reward_address: &str) -> Option<&RewardAccountState> {
        self.accounts.get(reward_address)
    }

    /// Returns `true` if the account exists and is registered
    pub fn is_registered(&self, reward_address: &str) -> bool {
        self.accounts
            .get(reward_address)
            .map(|account| account.registered_stake)
            .unwrap_or(false)
    }

    /// Delegation of the account, or no pool and zero rewards for unknown addresses
    pub fn delegation(&self, reward_address: &str) -> Delegation {
        self.accounts
            .get(reward_address)
            .map(|account| account.delegation.clone())
            .unwrap_or_default()
    }

    /// Mark the account as registered, creating it if needed
    pub fn register(&mut self, reward_address: RewardAddress) {
        self.accounts
            .entry(reward_address)
            .or_default()
            .registered_stake = true;
    }

    /// Clear the registration and the delegated pool. Accrued rewards are kept.
    pub fn deregister(&mut self, reward_address: &str) {
        if let Some(account) = self.accounts.get_mut(reward_address) {
            account.registered_stake = false;
            account.delegation.pool_id = None;
        }
    }

    /// Record the pool the account delegates to
    pub fn delegate(&mut self, reward_address: RewardAddress, pool_id: PoolId) {
        self.accounts
            .entry(reward_address)
            .or_default()
            .delegation
            .pool_id = Some(pool_id);
    }

    /// Subtract `amount` from the accrued rewards.
    ///
    /// Returns `false` and leaves the account untouched if it does not exist or holds
    /// less than `amount`.
    pub fn withdraw(&mut self, reward_address: &str, amount: Lovelace) -> bool {
        let Some(account) = self.accounts.get_mut(reward_address) else {
            return false;
        };
        match account.delegation.rewards.checked_sub(amount) {
            Some(rewards) => {
                account.delegation.rewards = rewards;
                true
            }
            None => false,
        }
    }

    /// Add `amount` to every registered account that delegates to a pool.
    /// Returns the number of accounts that received rewards.
    pub fn distribute(&mut self, amount: Lovelace) -> usize {
        let mut count = 0;
        for account in self.accounts.values_mut() {
            if account.registered_stake && account.delegation.pool_id.is_some() {
                account.delegation.rewards = account.delegation.rewards.saturating_add(amount);
                count += 1;
            }
        }

        count
    }

    pub fn iter(
        &self,
    ) -> std::collections::btree_map::Iter<'_, RewardAddress, RewardAccountState> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
