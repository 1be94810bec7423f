use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dmarket_types::{
    Address, Bid, BidId, Coins, Lease, LeaseId, Order, OrderId, OrderState, Provider,
};

use crate::error::DeliverError;
use crate::tx::SignedTx;

/// Signing and sequence metadata of an on-chain account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: Address,
    /// Raw ed25519 verifying key bytes.
    pub public_key: [u8; 32],
    pub account_number: u64,
    pub sequence: u64,
}

/// Resolves addresses to account metadata.
pub trait AccountKeeper: Send + Sync {
    fn account(&self, address: &Address) -> Option<BaseAccount>;
}

/// Reads spendable balances.
pub trait BankKeeper: Send + Sync {
    /// Coins the account can spend right now (escrowed funds excluded).
    fn spendable_coins(&self, address: &Address) -> Coins;
}

/// Read-only view over the market collections.
///
/// Every call observes the state at call time. Two calls are not isolated
/// from each other: a transaction delivered in between is visible to the
/// second one.
pub trait MarketKeeper: Send + Sync {
    /// Orders currently in `state`, in identifier order.
    fn orders_by_state(&self, state: OrderState) -> Vec<Order>;

    /// Visit every bid in identifier order until the visitor breaks.
    fn visit_bids(&self, visitor: &mut dyn FnMut(&Bid) -> ControlFlow<()>);

    fn lease(&self, id: &LeaseId) -> Option<Lease>;

    fn order(&self, id: &OrderId) -> Option<Order>;

    fn bid(&self, id: &BidId) -> Option<Bid>;
}

/// Lists registered providers.
pub trait ProviderKeeper: Send + Sync {
    fn providers(&self) -> Vec<Provider>;
}

/// Opaque transaction delivery against the authoritative state machine.
///
/// Implementations may block while the transaction is processed; there is
/// no timeout on this side.
#[async_trait]
pub trait TxDeliverer: Send + Sync {
    async fn deliver(&self, tx: SignedTx) -> Result<(), DeliverError>;
}

/// The read capabilities an operation generator is constructed with.
#[derive(Clone)]
pub struct Keepers {
    pub accounts: Arc<dyn AccountKeeper>,
    pub bank: Arc<dyn BankKeeper>,
    pub market: Arc<dyn MarketKeeper>,
    pub providers: Arc<dyn ProviderKeeper>,
}

impl Keepers {
    /// Build a `Keepers` where a single value serves every capability.
    pub fn from_node<N>(node: Arc<N>) -> Self
    where
        N: AccountKeeper + BankKeeper + MarketKeeper + ProviderKeeper + 'static,
    {
        Keepers {
            accounts: node.clone(),
            bank: node.clone(),
            market: node.clone(),
            providers: node,
        }
    }
}
