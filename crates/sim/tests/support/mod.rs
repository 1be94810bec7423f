//! Fixture keepers and a scripted deliverer for operation tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dmarket_node::{
    AccountKeeper, BankKeeper, BaseAccount, DeliverError, Keepers, MarketKeeper, ProviderKeeper,
    SignedTx, TxDeliverer,
};
use dmarket_sim::{random_accounts, sim_rng, SimAccount};
use dmarket_types::{
    Address, Bid, BidId, BidState, Coin, Coins, Lease, LeaseId, LeaseState, Msg, Order, OrderId,
    OrderState, Provider,
};

pub const DENOM: &str = "ustake";

pub fn stake(amount: u128) -> Coin {
    Coin::new(DENOM, amount)
}

/// Static market state. Nothing changes between reads.
#[derive(Default)]
pub struct Fixture {
    pub accounts: BTreeMap<Address, BaseAccount>,
    pub balances: BTreeMap<Address, Coins>,
    pub orders: Vec<Order>,
    pub bids: Vec<Bid>,
    pub leases: Vec<Lease>,
    pub providers: Vec<Address>,
}

impl Fixture {
    pub fn with_accounts(accounts: &[SimAccount], balance: u128) -> Self {
        let mut fixture = Fixture::default();
        for (n, account) in accounts.iter().enumerate() {
            fixture.accounts.insert(
                account.address.clone(),
                BaseAccount {
                    address: account.address.clone(),
                    public_key: account.public_key(),
                    account_number: n as u64,
                    sequence: 0,
                },
            );
            fixture
                .balances
                .insert(account.address.clone(), Coins::from(stake(balance)));
        }
        fixture
    }

    pub fn set_balance(&mut self, address: &Address, amount: u128) {
        self.balances
            .insert(address.clone(), Coins::from(stake(amount)));
    }

    pub fn add_order(&mut self, owner: &Address, dseq: u64, state: OrderState) -> OrderId {
        let id = OrderId {
            owner: owner.clone(),
            dseq,
            gseq: 1,
            oseq: 1,
        };
        self.orders.push(Order {
            id: id.clone(),
            state,
            price: stake(50),
        });
        id
    }

    pub fn add_bid(
        &mut self,
        order: &OrderId,
        provider: &Address,
        state: BidState,
        lease: Option<LeaseState>,
    ) -> BidId {
        let id = BidId::new(order, provider.clone());
        self.bids.push(Bid {
            id: id.clone(),
            state,
            price: stake(50),
            deposit: stake(10),
        });
        if let Some(lease_state) = lease {
            self.leases.push(Lease {
                id: LeaseId::from(&id),
                state: lease_state,
                price: stake(50),
            });
        }
        id
    }

    pub fn into_keepers(self) -> Keepers {
        Keepers::from_node(Arc::new(self))
    }
}

impl AccountKeeper for Fixture {
    fn account(&self, address: &Address) -> Option<BaseAccount> {
        self.accounts.get(address).cloned()
    }
}

impl BankKeeper for Fixture {
    fn spendable_coins(&self, address: &Address) -> Coins {
        self.balances.get(address).cloned().unwrap_or_default()
    }
}

impl MarketKeeper for Fixture {
    fn orders_by_state(&self, state: OrderState) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.state == state)
            .cloned()
            .collect()
    }

    fn visit_bids(&self, visitor: &mut dyn FnMut(&Bid) -> ControlFlow<()>) {
        for bid in &self.bids {
            if visitor(bid).is_break() {
                break;
            }
        }
    }

    fn lease(&self, id: &LeaseId) -> Option<Lease> {
        self.leases.iter().find(|l| &l.id == id).cloned()
    }

    fn order(&self, id: &OrderId) -> Option<Order> {
        self.orders.iter().find(|o| &o.id == id).cloned()
    }

    fn bid(&self, id: &BidId) -> Option<Bid> {
        self.bids.iter().find(|b| &b.id == id).cloned()
    }
}

impl ProviderKeeper for Fixture {
    fn providers(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .map(|owner| Provider {
                owner: owner.clone(),
            })
            .collect()
    }
}

/// Records every submitted transaction and answers from a script.
/// An exhausted script accepts.
#[derive(Default)]
pub struct ScriptedDeliverer {
    responses: Mutex<VecDeque<Result<(), DeliverError>>>,
    submitted: Mutex<Vec<SignedTx>>,
}

impl ScriptedDeliverer {
    pub fn accepting() -> Self {
        ScriptedDeliverer::default()
    }

    pub fn replying(response: Result<(), DeliverError>) -> Self {
        let deliverer = ScriptedDeliverer::default();
        deliverer.responses.lock().unwrap().push_back(response);
        deliverer
    }

    pub fn submitted(&self) -> Vec<SignedTx> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_msgs(&self) -> Vec<Msg> {
        self.submitted()
            .into_iter()
            .flat_map(|tx| tx.body.msgs)
            .collect()
    }
}

#[async_trait]
impl TxDeliverer for ScriptedDeliverer {
    async fn deliver(&self, tx: SignedTx) -> Result<(), DeliverError> {
        tx.verify()?;
        self.submitted.lock().unwrap().push(tx);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

pub fn accounts(n: usize) -> Vec<SimAccount> {
    random_accounts(&mut sim_rng(1234), n)
}
