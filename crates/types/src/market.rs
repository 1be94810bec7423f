//! Order, Bid and Lease records and their identifiers.
//!
//! A Bid identifier is its Order identifier plus the bidding provider, and a
//! Lease identifier is exactly the identifier of the Bid it was created from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::coin::Coin;

// ──────────────────────────────────────────────
// Identifiers
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub owner: Address,
    pub dseq: u64,
    pub gseq: u32,
    pub oseq: u32,
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.owner, self.dseq, self.gseq, self.oseq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BidId {
    pub owner: Address,
    pub dseq: u64,
    pub gseq: u32,
    pub oseq: u32,
    pub provider: Address,
}

impl BidId {
    pub fn new(order: &OrderId, provider: Address) -> Self {
        BidId {
            owner: order.owner.clone(),
            dseq: order.dseq,
            gseq: order.gseq,
            oseq: order.oseq,
            provider,
        }
    }

    pub fn order_id(&self) -> OrderId {
        OrderId {
            owner: self.owner.clone(),
            dseq: self.dseq,
            gseq: self.gseq,
            oseq: self.oseq,
        }
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.order_id(), self.provider)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(pub BidId);

impl LeaseId {
    pub fn bid_id(&self) -> &BidId {
        &self.0
    }
}

impl From<&BidId> for LeaseId {
    fn from(bid: &BidId) -> Self {
        LeaseId(bid.clone())
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ──────────────────────────────────────────────
// States
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Open,
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidState {
    Open,
    /// Matched: the bid won its order and a lease exists for it.
    Active,
    /// Another bid won the order.
    Lost,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseState {
    Active,
    Closed,
}

// ──────────────────────────────────────────────
// Records
// ──────────────────────────────────────────────

/// A posted unit of demand awaiting bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub state: OrderState,
    /// Highest price the owner will accept.
    pub price: Coin,
}

impl Order {
    pub fn price(&self) -> &Coin {
        &self.price
    }

    pub fn owner(&self) -> &Address {
        &self.id.owner
    }
}

/// A provider's offer against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub state: BidState,
    pub price: Coin,
    /// Amount held in escrow while the bid is open or active.
    pub deposit: Coin,
}

impl Bid {
    pub fn provider(&self) -> &Address {
        &self.id.provider
    }
}

/// The fulfillment record created when a bid is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub state: LeaseState,
    pub price: Coin,
}

/// A registered provider able to bid on orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub owner: Address,
}
