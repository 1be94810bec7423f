//! In-memory reference implementation of the market state machine.
//!
//! `MemoryNode` implements every capability trait so the harness can run end
//! to end without a real chain. State lives in ordered maps, so iteration
//! order (and with it every simulation run) is deterministic.
//!
//! Delivery follows an ante-then-handler model: signature, account, chain,
//! sequence and fee checks run first and their effects (fee deduction,
//! sequence bump) persist even when the message handler rejects.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;

use dmarket_types::{
    Address, Bid, BidId, BidState, Coin, Coins, Lease, LeaseId, LeaseState, MarketError, Msg,
    Order, OrderId, OrderState, Provider,
};

use crate::error::DeliverError;
use crate::traits::{
    AccountKeeper, BankKeeper, BaseAccount, MarketKeeper, ProviderKeeper, TxDeliverer,
};
use crate::tx::SignedTx;

#[derive(Debug, Clone, Default)]
struct NodeState {
    accounts: BTreeMap<Address, BaseAccount>,
    balances: BTreeMap<Address, Coins>,
    providers: BTreeSet<Address>,
    orders: BTreeMap<OrderId, Order>,
    bids: BTreeMap<BidId, Bid>,
    leases: BTreeMap<LeaseId, Lease>,
    next_account_number: u64,
    next_dseq: u64,
    height: u64,
}

pub struct MemoryNode {
    chain_id: String,
    state: RwLock<NodeState>,
}

impl MemoryNode {
    pub fn new(chain_id: impl Into<String>) -> Self {
        MemoryNode {
            chain_id: chain_id.into(),
            state: RwLock::new(NodeState {
                next_dseq: 1,
                ..NodeState::default()
            }),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn height(&self) -> u64 {
        self.read().height
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Genesis and driver hooks ─────────────────────────────────────────────

    /// Create an account holding `coins`. Account numbers are assigned in
    /// creation order starting at 0.
    pub fn add_account(&self, public_key: [u8; 32], coins: Coins) -> BaseAccount {
        let mut state = self.write();
        let address = Address::from_public_key(&public_key);
        let account = BaseAccount {
            address: address.clone(),
            public_key,
            account_number: state.next_account_number,
            sequence: 0,
        };
        state.next_account_number += 1;
        state.accounts.insert(address.clone(), account.clone());
        state.balances.insert(address, coins);
        account
    }

    pub fn register_provider(&self, owner: Address) {
        self.write().providers.insert(owner);
    }

    /// Post a new open order owned by `owner`.
    pub fn create_order(&self, owner: Address, price: Coin) -> OrderId {
        let mut state = self.write();
        let id = OrderId {
            owner,
            dseq: state.next_dseq,
            gseq: 1,
            oseq: 1,
        };
        state.next_dseq += 1;
        state.orders.insert(
            id.clone(),
            Order {
                id: id.clone(),
                state: OrderState::Open,
                price,
            },
        );
        id
    }

    /// Close the current block: match every open order that has open bids.
    ///
    /// The lowest-priced bid wins (ties broken by provider address). The
    /// winner becomes active with a lease, the others are marked lost and
    /// their deposits refunded. Returns the number of leases created.
    pub fn end_block(&self) -> usize {
        let mut state = self.write();
        state.height += 1;

        let open_orders: Vec<OrderId> = state
            .orders
            .values()
            .filter(|o| o.state == OrderState::Open)
            .map(|o| o.id.clone())
            .collect();

        let mut matched = 0;
        for order_id in open_orders {
            let mut candidates: Vec<Bid> = state
                .bids
                .values()
                .filter(|b| b.id.order_id() == order_id && b.state == BidState::Open)
                .cloned()
                .collect();
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by(|a, b| {
                a.price
                    .amount
                    .cmp(&b.price.amount)
                    .then_with(|| a.id.provider.cmp(&b.id.provider))
            });

            let winner = candidates.remove(0);
            for lost in candidates {
                state.refund(&lost);
                if let Some(bid) = state.bids.get_mut(&lost.id) {
                    bid.state = BidState::Lost;
                }
            }
            if let Some(bid) = state.bids.get_mut(&winner.id) {
                bid.state = BidState::Active;
            }
            let lease_id = LeaseId::from(&winner.id);
            state.leases.insert(
                lease_id.clone(),
                Lease {
                    id: lease_id,
                    state: LeaseState::Active,
                    price: winner.price.clone(),
                },
            );
            if let Some(order) = state.orders.get_mut(&order_id) {
                order.state = OrderState::Active;
            }
            matched += 1;
        }

        tracing::debug!(height = state.height, matched, "end block");
        matched
    }
}

impl NodeState {
    fn refund(&mut self, bid: &Bid) {
        self.balances
            .entry(bid.id.provider.clone())
            .or_default()
            .add(&bid.deposit);
    }

    /// Signature-independent checks and their persistent effects.
    fn ante(
        &mut self,
        chain_id: &str,
        tx: &SignedTx,
        key: &VerifyingKey,
    ) -> Result<(), DeliverError> {
        let body = &tx.body;
        let signer = body.signer().ok_or(DeliverError::NoMessages)?;

        let account = self
            .accounts
            .get(signer)
            .ok_or_else(|| DeliverError::UnknownAccount(signer.clone()))?;
        if account.public_key != key.to_bytes() {
            return Err(DeliverError::PublicKeyMismatch(signer.clone()));
        }
        if body.chain_id != chain_id {
            return Err(DeliverError::WrongChain {
                expected: chain_id.to_string(),
                got: body.chain_id.clone(),
            });
        }
        if body.account_number != account.account_number {
            return Err(DeliverError::AccountNumberMismatch {
                address: signer.clone(),
                expected: account.account_number,
                got: body.account_number,
            });
        }
        if body.sequence != account.sequence {
            return Err(DeliverError::SequenceMismatch {
                expected: account.sequence,
                got: body.sequence,
            });
        }

        let balance = self.balances.get(signer).cloned().unwrap_or_default();
        let remaining = balance
            .checked_sub(&body.fee)
            .ok_or_else(|| DeliverError::InsufficientFee(body.fee.to_string()))?;

        let signer = signer.clone();
        self.balances.insert(signer.clone(), remaining);
        if let Some(account) = self.accounts.get_mut(&signer) {
            account.sequence += 1;
        }
        Ok(())
    }

    fn apply(&mut self, msg: &Msg) -> Result<(), MarketError> {
        match msg {
            Msg::CreateBid {
                order,
                provider,
                price,
                deposit,
            } => self.create_bid(order, provider, price, deposit),
            Msg::CloseBid { bid } => self.close_bid(bid),
            Msg::CloseLease { lease } => self.close_lease(lease),
        }
    }

    fn create_bid(
        &mut self,
        order_id: &OrderId,
        provider: &Address,
        price: &Coin,
        deposit: &Coin,
    ) -> Result<(), MarketError> {
        let order = self
            .orders
            .get(order_id)
            .ok_or_else(|| MarketError::OrderNotFound(order_id.clone()))?;
        if order.state != OrderState::Open {
            return Err(MarketError::OrderNotOpen(order_id.clone()));
        }
        if !self.providers.contains(provider) {
            return Err(MarketError::UnknownProvider(provider.to_string()));
        }
        if provider == order.owner() {
            return Err(MarketError::ProviderIsOrderOwner(order_id.clone()));
        }
        if price.denom != order.price.denom || price.amount > order.price.amount {
            return Err(MarketError::PriceTooHigh {
                bid: price.to_string(),
                order: order.price.to_string(),
            });
        }
        if deposit.is_zero() {
            return Err(MarketError::InvalidDeposit(deposit.to_string()));
        }

        let bid_id = BidId::new(order_id, provider.clone());
        if self.bids.contains_key(&bid_id) {
            return Err(MarketError::BidExists(bid_id));
        }

        let balance = self.balances.get(provider).cloned().unwrap_or_default();
        let remaining = balance
            .checked_sub_coin(deposit)
            .ok_or_else(|| MarketError::InsufficientFunds(deposit.to_string()))?;
        self.balances.insert(provider.clone(), remaining);

        self.bids.insert(
            bid_id.clone(),
            Bid {
                id: bid_id,
                state: BidState::Open,
                price: price.clone(),
                deposit: deposit.clone(),
            },
        );
        Ok(())
    }

    fn close_bid(&mut self, bid_id: &BidId) -> Result<(), MarketError> {
        let bid = self
            .bids
            .get(bid_id)
            .cloned()
            .ok_or_else(|| MarketError::BidNotFound(bid_id.clone()))?;

        match bid.state {
            BidState::Closed | BidState::Lost => {
                return Err(MarketError::BidAlreadyClosed(bid_id.clone()));
            }
            BidState::Open => {}
            BidState::Active => {
                let lease_id = LeaseId::from(bid_id);
                let lease = self
                    .leases
                    .get_mut(&lease_id)
                    .ok_or_else(|| MarketError::LeaseNotFound(lease_id.clone()))?;
                if lease.state != LeaseState::Active {
                    return Err(MarketError::LeaseNotActive(lease_id));
                }
                lease.state = LeaseState::Closed;
                if let Some(order) = self.orders.get_mut(&bid_id.order_id()) {
                    order.state = OrderState::Closed;
                }
            }
        }

        self.refund(&bid);
        if let Some(stored) = self.bids.get_mut(bid_id) {
            stored.state = BidState::Closed;
        }
        Ok(())
    }

    fn close_lease(&mut self, lease_id: &LeaseId) -> Result<(), MarketError> {
        let lease = self
            .leases
            .get_mut(lease_id)
            .ok_or_else(|| MarketError::LeaseNotFound(lease_id.clone()))?;
        if lease.state != LeaseState::Active {
            return Err(MarketError::LeaseNotActive(lease_id.clone()));
        }
        lease.state = LeaseState::Closed;

        let bid_id = lease_id.bid_id().clone();
        if let Some(bid) = self.bids.get(&bid_id).cloned() {
            self.refund(&bid);
            if let Some(stored) = self.bids.get_mut(&bid_id) {
                stored.state = BidState::Closed;
            }
        }
        if let Some(order) = self.orders.get_mut(&bid_id.order_id()) {
            order.state = OrderState::Closed;
        }
        Ok(())
    }
}

// ── Capability implementations ───────────────────────────────────────────────

impl AccountKeeper for MemoryNode {
    fn account(&self, address: &Address) -> Option<BaseAccount> {
        self.read().accounts.get(address).cloned()
    }
}

impl BankKeeper for MemoryNode {
    fn spendable_coins(&self, address: &Address) -> Coins {
        self.read().balances.get(address).cloned().unwrap_or_default()
    }
}

impl MarketKeeper for MemoryNode {
    fn orders_by_state(&self, state: OrderState) -> Vec<Order> {
        self.read()
            .orders
            .values()
            .filter(|o| o.state == state)
            .cloned()
            .collect()
    }

    fn visit_bids(&self, visitor: &mut dyn FnMut(&Bid) -> ControlFlow<()>) {
        // Snapshot first so the visitor may call back into the node.
        let bids: Vec<Bid> = self.read().bids.values().cloned().collect();
        for bid in &bids {
            if visitor(bid).is_break() {
                break;
            }
        }
    }

    fn lease(&self, id: &LeaseId) -> Option<Lease> {
        self.read().leases.get(id).cloned()
    }

    fn order(&self, id: &OrderId) -> Option<Order> {
        self.read().orders.get(id).cloned()
    }

    fn bid(&self, id: &BidId) -> Option<Bid> {
        self.read().bids.get(id).cloned()
    }
}

impl ProviderKeeper for MemoryNode {
    fn providers(&self) -> Vec<Provider> {
        self.read()
            .providers
            .iter()
            .map(|owner| Provider {
                owner: owner.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl TxDeliverer for MemoryNode {
    async fn deliver(&self, tx: SignedTx) -> Result<(), DeliverError> {
        let key = tx.verify()?;
        let mut state = self.write();
        state.ante(&self.chain_id, &tx, &key)?;

        // Messages apply atomically on a scratch copy.
        let mut next = state.clone();
        for msg in &tx.body.msgs {
            next.apply(msg)?;
        }
        *state = next;
        Ok(())
    }
}
