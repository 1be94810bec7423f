//! Weighted operation registry.
//!
//! Weights come from [`AppParams`]: a present key overrides the default, a
//! missing key keeps it. A weight of zero disables the operation.

use std::sync::Arc;

use rand::Rng;

use dmarket_node::Keepers;
use dmarket_types::Coin;

use crate::config::{AppParams, ConfigError};
use crate::error::SimError;
use crate::funding::FeePolicy;
use crate::operations::{Operation, SimulateCloseBid, SimulateCloseLease, SimulateCreateBid};
use crate::outcome::OperationKind;
use crate::rng::SimRng;

pub const OP_WEIGHT_MSG_CREATE_BID: &str = "op_weight_msg_create_bid";
pub const OP_WEIGHT_MSG_CLOSE_BID: &str = "op_weight_msg_close_bid";
pub const OP_WEIGHT_MSG_CLOSE_LEASE: &str = "op_weight_msg_close_lease";

pub const DEFAULT_WEIGHT_MSG_CREATE_BID: u32 = 100;
pub const DEFAULT_WEIGHT_MSG_CLOSE_BID: u32 = 100;
pub const DEFAULT_WEIGHT_MSG_CLOSE_LEASE: u32 = 10;

pub struct WeightedOperation {
    pub weight: u32,
    pub op: Box<dyn Operation>,
}

impl WeightedOperation {
    pub fn new(weight: u32, op: Box<dyn Operation>) -> Self {
        WeightedOperation { weight, op }
    }

    pub fn kind(&self) -> OperationKind {
        self.op.kind()
    }
}

#[derive(Default)]
pub struct WeightedOperations {
    ops: Vec<WeightedOperation>,
}

impl WeightedOperations {
    pub fn new(ops: Vec<WeightedOperation>) -> Self {
        WeightedOperations { ops }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightedOperation> {
        self.ops.iter()
    }

    pub fn total_weight(&self) -> u64 {
        self.ops.iter().map(|w| u64::from(w.weight)).sum()
    }

    /// Pick one operation with probability proportional to its weight.
    pub fn select(&self, rng: &mut SimRng) -> Result<&WeightedOperation, SimError> {
        let total = self.total_weight();
        if total == 0 {
            return Err(SimError::NoOperations);
        }

        let choice = rng.gen_range(0..total);
        let mut cumulative = 0u64;
        for op in &self.ops {
            cumulative += u64::from(op.weight);
            if choice < cumulative {
                return Ok(op);
            }
        }
        Err(SimError::NoOperations)
    }
}

/// The registry used by simulation runs: create-bid, close-bid and
/// close-lease, weighted from `params`.
pub fn weighted_operations(
    params: &AppParams,
    keepers: Keepers,
    deposit: Coin,
    fees: Arc<dyn FeePolicy>,
) -> Result<WeightedOperations, ConfigError> {
    let create_bid = params.get_or(OP_WEIGHT_MSG_CREATE_BID, DEFAULT_WEIGHT_MSG_CREATE_BID)?;
    let close_bid = params.get_or(OP_WEIGHT_MSG_CLOSE_BID, DEFAULT_WEIGHT_MSG_CLOSE_BID)?;
    let close_lease = params.get_or(OP_WEIGHT_MSG_CLOSE_LEASE, DEFAULT_WEIGHT_MSG_CLOSE_LEASE)?;

    Ok(WeightedOperations::new(vec![
        WeightedOperation::new(
            create_bid,
            Box::new(SimulateCreateBid::new(keepers.clone(), deposit, fees.clone())),
        ),
        WeightedOperation::new(close_bid, Box::new(SimulateCloseBid::new(keepers, fees))),
        WeightedOperation::new(close_lease, Box::new(SimulateCloseLease::new())),
    ]))
}

/// The default weight of every operation, keyed as in `[params]`.
pub fn default_params() -> AppParams {
    let mut params = AppParams::new();
    params.insert(OP_WEIGHT_MSG_CREATE_BID, DEFAULT_WEIGHT_MSG_CREATE_BID.into());
    params.insert(OP_WEIGHT_MSG_CLOSE_BID, DEFAULT_WEIGHT_MSG_CLOSE_BID.into());
    params.insert(OP_WEIGHT_MSG_CLOSE_LEASE, DEFAULT_WEIGHT_MSG_CLOSE_LEASE.into());
    params
}
