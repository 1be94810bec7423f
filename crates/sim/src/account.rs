//! Simulation accounts: an address plus the key that signs for it.

use std::fmt;

use ed25519_dalek::SigningKey;
use rand::RngCore;

use dmarket_types::Address;

use crate::rng::SimRng;

#[derive(Clone)]
pub struct SimAccount {
    pub address: Address,
    pub signing_key: SigningKey,
}

impl SimAccount {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let address = Address::from_public_key(signing_key.verifying_key().as_bytes());
        SimAccount {
            address,
            signing_key,
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl fmt::Debug for SimAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Generate `n` accounts whose keys are drawn from `rng`.
pub fn random_accounts(rng: &mut SimRng, n: usize) -> Vec<SimAccount> {
    (0..n)
        .map(|_| {
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            SimAccount::from_secret(secret)
        })
        .collect()
}

/// Exact address match within the accessible account set.
pub fn find_account<'a>(accounts: &'a [SimAccount], address: &Address) -> Option<&'a SimAccount> {
    accounts.iter().find(|a| &a.address == address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::sim_rng;

    #[test]
    fn random_accounts_are_reproducible() {
        let a = random_accounts(&mut sim_rng(11), 4);
        let b = random_accounts(&mut sim_rng(11), 4);
        let addrs_a: Vec<_> = a.iter().map(|x| x.address.clone()).collect();
        let addrs_b: Vec<_> = b.iter().map(|x| x.address.clone()).collect();
        assert_eq!(addrs_a, addrs_b);
    }

    #[test]
    fn find_account_matches_exactly() {
        let accounts = random_accounts(&mut sim_rng(2), 3);
        let target = accounts[2].address.clone();
        assert_eq!(
            find_account(&accounts, &target).map(|a| &a.address),
            Some(&target)
        );
        assert!(find_account(&accounts, &Address::new("dm1nobody")).is_none());
    }

    #[test]
    fn address_derives_from_verifying_key() {
        let account = SimAccount::from_secret([9u8; 32]);
        assert_eq!(
            account.address,
            Address::from_public_key(&account.public_key())
        );
    }
}
