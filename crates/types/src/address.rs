//! Account addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Human-readable prefix carried by every derived address.
pub const ADDRESS_PREFIX: &str = "dm1";

/// Number of hash bytes kept when deriving an address from a public key.
const ADDRESS_LEN: usize = 20;

/// An opaque account address.
///
/// Addresses compare by exact string match; the harness never parses them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Address(raw.into())
    }

    /// Derive an address from raw public key bytes:
    /// `dm1` followed by the hex of the first 20 bytes of `sha256(key)`.
    pub fn from_public_key(key: &[u8]) -> Self {
        let digest = Sha256::digest(key);
        let hex: String = digest[..ADDRESS_LEN]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Address(format!("{}{}", ADDRESS_PREFIX, hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}
