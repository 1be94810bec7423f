//! Coin amounts and multi-denomination balances.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single-denomination amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Encoded as a decimal string so it survives buffered (tagged) decoding.
    #[serde(with = "amount_string")]
    pub amount: u128,
}

mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Coin {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A balance across denominations.
///
/// Kept sorted by denom with zero entries removed, so two `Coins` holding the
/// same amounts always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(BTreeMap<String, u128>);

impl Coins {
    pub fn new() -> Self {
        Coins(BTreeMap::new())
    }

    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Self {
        let mut out = Coins::new();
        for coin in coins {
            out.add(&coin);
        }
        out
    }

    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate coins in denom order.
    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0
            .iter()
            .map(|(denom, amount)| Coin::new(denom.clone(), *amount))
    }

    pub fn add(&mut self, coin: &Coin) {
        if coin.is_zero() {
            return;
        }
        let entry = self.0.entry(coin.denom.clone()).or_insert(0);
        *entry = entry.saturating_add(coin.amount);
    }

    /// Subtract every coin in `other`, or `None` if any denom would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut out = self.clone();
        for (denom, amount) in &other.0 {
            let have = out.amount_of(denom);
            let left = have.checked_sub(*amount)?;
            if left == 0 {
                out.0.remove(denom);
            } else {
                out.0.insert(denom.clone(), left);
            }
        }
        Some(out)
    }

    pub fn checked_sub_coin(&self, coin: &Coin) -> Option<Coins> {
        self.checked_sub(&Coins::from(coin.clone()))
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Coins::from_coins([coin])
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}
