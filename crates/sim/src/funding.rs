//! Funding guard and fee policy.
//!
//! Underfunded accounts are common in randomized runs and uninteresting, so
//! both the guard and the fee policy report failure as plain values that the
//! operations turn into no-op outcomes.

use rand::seq::SliceRandom;
use rand::Rng;

use dmarket_types::{Coin, Coins};

use crate::rng::SimRng;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("spendable {spendable}{denom} is below twice the deposit {deposit}{denom}")]
pub struct Underfunded {
    pub denom: String,
    pub spendable: u128,
    pub deposit: u128,
}

/// Reserve `deposit` out of `spendable`.
///
/// Requires at least twice the deposit so the remainder still leaves room
/// for fees. Returns what is left after setting the deposit aside.
pub fn reserve_deposit(spendable: &Coins, deposit: &Coin) -> Result<Coins, Underfunded> {
    let have = spendable.amount_of(&deposit.denom);
    let underfunded = || Underfunded {
        denom: deposit.denom.clone(),
        spendable: have,
        deposit: deposit.amount,
    };
    if have < deposit.amount.saturating_mul(2) {
        return Err(underfunded());
    }
    spendable.checked_sub_coin(deposit).ok_or_else(underfunded)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("no coins found for random fees")]
    NoSpendableCoins,

    #[error("fee policy failed: {0}")]
    Policy(String),
}

/// Derives the fee for a transaction from what the signer can spend.
pub trait FeePolicy: Send + Sync {
    fn fees(&self, rng: &mut SimRng, spendable: &Coins) -> Result<Coins, FeeError>;
}

/// Random single-denomination fee.
///
/// Picks a random denomination with a non-zero balance and charges a random
/// amount in `[1, balance]`. An empty balance pays no fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFees;

impl FeePolicy for RandomFees {
    fn fees(&self, rng: &mut SimRng, spendable: &Coins) -> Result<Coins, FeeError> {
        if spendable.is_empty() {
            return Ok(Coins::new());
        }

        let mut coins: Vec<Coin> = spendable.iter().collect();
        coins.shuffle(rng);
        let coin = coins
            .into_iter()
            .find(|c| !c.is_zero())
            .ok_or(FeeError::NoSpendableCoins)?;

        let amount = rng.gen_range(1..=coin.amount);
        Ok(Coins::from(Coin::new(coin.denom, amount)))
    }
}
