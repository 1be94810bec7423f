//! Simulation configuration.
//!
//! `SimConfig` is read from TOML; every field has a default so a config file
//! only needs the values it changes. Operation weights live in the
//! `[params]` table and are looked up through [`AppParams`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for param '{key}': {source}")]
    InvalidParam {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Free-form simulation parameters keyed by name.
///
/// A key that is present must decode to the requested type; a missing key
/// falls back to the caller's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppParams(BTreeMap<String, serde_json::Value>);

impl AppParams {
    pub fn new() -> Self {
        AppParams(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.0.get(key) {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidParam {
                    key: key.to_string(),
                    source,
                })
            }
            None => Ok(default),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub seed: u64,
    pub blocks: u64,
    pub ops_per_block: usize,
    /// Number of simulation accounts created at genesis.
    pub accounts: usize,
    /// How many of those accounts register as providers.
    pub providers: usize,
    /// Orders posted by random accounts at the start of each block.
    pub orders_per_block: usize,
    pub initial_balance: u128,
    /// Order prices are drawn from `[1, max_order_price]`.
    pub max_order_price: u128,
    pub denom: String,
    pub bid_deposit: u128,
    pub chain_id: String,
    pub params: AppParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: 42,
            blocks: 20,
            ops_per_block: 10,
            accounts: 10,
            providers: 5,
            orders_per_block: 2,
            initial_balance: 10_000_000,
            max_order_price: 1_000,
            denom: "ustake".to_string(),
            bid_deposit: 500_000,
            chain_id: "dmarket-sim".to_string(),
            params: AppParams::new(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts == 0 {
            return Err(ConfigError::Invalid("accounts must be positive".into()));
        }
        if self.providers > self.accounts {
            return Err(ConfigError::Invalid(format!(
                "providers ({}) exceeds accounts ({})",
                self.providers, self.accounts
            )));
        }
        if self.max_order_price == 0 {
            return Err(ConfigError::Invalid("max_order_price must be positive".into()));
        }
        if self.bid_deposit == 0 {
            return Err(ConfigError::Invalid("bid_deposit must be positive".into()));
        }
        if self.denom.is_empty() {
            return Err(ConfigError::Invalid("denom must not be empty".into()));
        }
        Ok(())
    }
}
