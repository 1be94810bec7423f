//! MemoryNode delivery tests.
//!
//! Drives the reference node through signed transactions and checks the
//! ante checks, the message handlers and block-end matching.

use std::ops::ControlFlow;

use dmarket_node::{
    gen_tx, AccountKeeper, BankKeeper, DeliverError, MarketKeeper, MemoryNode, SignedTx, TxBody,
    TxDeliverer, DEFAULT_GEN_TX_GAS,
};
use dmarket_types::{
    Address, BidId, BidState, Coin, Coins, LeaseId, LeaseState, MarketError, Msg, OrderState,
};
use ed25519_dalek::SigningKey;

const DENOM: &str = "ustake";

struct Actor {
    key: SigningKey,
    address: Address,
}

fn actor(node: &MemoryNode, seed: u8, balance: u128) -> Actor {
    let key = SigningKey::from_bytes(&[seed; 32]);
    let account = node.add_account(
        key.verifying_key().to_bytes(),
        Coins::from(Coin::new(DENOM, balance)),
    );
    Actor {
        key,
        address: account.address,
    }
}

fn sign(node: &MemoryNode, who: &Actor, msg: Msg, fee: u128) -> SignedTx {
    let account = node.account(&who.address).expect("account exists");
    let body = TxBody {
        chain_id: node.chain_id().to_string(),
        msgs: vec![msg],
        fee: Coins::from(Coin::new(DENOM, fee)),
        gas: DEFAULT_GEN_TX_GAS,
        account_number: account.account_number,
        sequence: account.sequence,
    };
    gen_tx(body, &who.key).expect("sign")
}

fn create_bid_msg(order: &dmarket_types::OrderId, provider: &Actor) -> Msg {
    Msg::create_bid(
        order.clone(),
        provider.address.clone(),
        Coin::new(DENOM, 50),
        Coin::new(DENOM, 10),
    )
}

// ──────────────────────────────────────────────
// Ante checks
// ──────────────────────────────────────────────

#[tokio::test]
async fn stale_sequence_is_rejected() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let first = sign(&node, &provider, create_bid_msg(&order, &provider), 1);
    let stale = first.clone();
    node.deliver(first).await.unwrap();

    let err = node.deliver(stale).await.unwrap_err();
    assert_eq!(
        err,
        DeliverError::SequenceMismatch {
            expected: 1,
            got: 0
        }
    );
}

#[tokio::test]
async fn wrong_chain_is_rejected() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let mut tx = sign(
        &node,
        &owner,
        Msg::close_bid(BidId::new(
            &node.create_order(owner.address.clone(), Coin::new(DENOM, 1)),
            owner.address.clone(),
        )),
        0,
    );
    tx.body.chain_id = "other".to_string();
    // Re-sign so only the chain id is wrong.
    let tx = gen_tx(tx.body, &owner.key).unwrap();
    assert!(matches!(
        node.deliver(tx).await,
        Err(DeliverError::WrongChain { .. })
    ));
}

#[tokio::test]
async fn foreign_key_cannot_sign_for_account() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let tx = sign(&node, &provider, create_bid_msg(&order, &provider), 1);
    let forged = gen_tx(tx.body, &owner.key).unwrap();
    assert_eq!(
        node.deliver(forged).await,
        Err(DeliverError::PublicKeyMismatch(provider.address.clone()))
    );
}

#[tokio::test]
async fn fee_and_sequence_persist_when_message_fails() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    // Owner bidding on their own order: ante passes, handler rejects.
    node.register_provider(owner.address.clone());
    let tx = sign(&node, &owner, create_bid_msg(&order, &owner), 7);
    let err = node.deliver(tx).await.unwrap_err();

    assert_eq!(
        err,
        DeliverError::Market(MarketError::ProviderIsOrderOwner(order.clone()))
    );
    assert_eq!(node.spendable_coins(&owner.address).amount_of(DENOM), 993);
    assert_eq!(node.account(&owner.address).unwrap().sequence, 1);
}

#[tokio::test]
async fn fee_above_balance_is_rejected() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 5);
    let provider = actor(&node, 2, 5);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let tx = sign(&node, &provider, create_bid_msg(&order, &provider), 6);
    assert!(matches!(
        node.deliver(tx).await,
        Err(DeliverError::InsufficientFee(_))
    ));
}

// ──────────────────────────────────────────────
// Market handlers
// ──────────────────────────────────────────────

#[tokio::test]
async fn create_bid_escrows_deposit() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let tx = sign(&node, &provider, create_bid_msg(&order, &provider), 1);
    node.deliver(tx).await.unwrap();

    let bid_id = BidId::new(&order, provider.address.clone());
    let bid = node.bid(&bid_id).unwrap();
    assert_eq!(bid.state, BidState::Open);
    assert_eq!(node.spendable_coins(&provider.address).amount_of(DENOM), 989);
}

#[tokio::test]
async fn duplicate_bid_reports_bid_exists() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let tx = sign(&node, &provider, create_bid_msg(&order, &provider), 1);
    node.deliver(tx).await.unwrap();
    let again = sign(&node, &provider, create_bid_msg(&order, &provider), 1);

    assert_eq!(
        node.deliver(again).await,
        Err(DeliverError::Market(MarketError::BidExists(BidId::new(
            &order,
            provider.address.clone()
        ))))
    );
}

#[tokio::test]
async fn unregistered_provider_is_rejected() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let stranger = actor(&node, 3, 1_000);
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let tx = sign(&node, &stranger, create_bid_msg(&order, &stranger), 1);
    assert!(matches!(
        node.deliver(tx).await,
        Err(DeliverError::Market(MarketError::UnknownProvider(_)))
    ));
}

#[tokio::test]
async fn end_block_matches_lowest_bid() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let cheap = actor(&node, 2, 1_000);
    let pricey = actor(&node, 3, 1_000);
    node.register_provider(cheap.address.clone());
    node.register_provider(pricey.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));

    let low = Msg::create_bid(
        order.clone(),
        cheap.address.clone(),
        Coin::new(DENOM, 40),
        Coin::new(DENOM, 10),
    );
    let high = Msg::create_bid(
        order.clone(),
        pricey.address.clone(),
        Coin::new(DENOM, 90),
        Coin::new(DENOM, 10),
    );
    node.deliver(sign(&node, &cheap, low, 0)).await.unwrap();
    node.deliver(sign(&node, &pricey, high, 0)).await.unwrap();

    assert_eq!(node.end_block(), 1);
    assert_eq!(node.height(), 1);

    let won = BidId::new(&order, cheap.address.clone());
    let lost = BidId::new(&order, pricey.address.clone());
    assert_eq!(node.bid(&won).unwrap().state, BidState::Active);
    assert_eq!(node.bid(&lost).unwrap().state, BidState::Lost);
    assert_eq!(
        node.lease(&LeaseId::from(&won)).unwrap().state,
        LeaseState::Active
    );
    assert_eq!(node.order(&order).unwrap().state, OrderState::Active);
    // Losing deposit refunded.
    assert_eq!(node.spendable_coins(&pricey.address).amount_of(DENOM), 1_000);
}

#[tokio::test]
async fn close_active_bid_closes_lease_and_order() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));
    node.deliver(sign(&node, &provider, create_bid_msg(&order, &provider), 0))
        .await
        .unwrap();
    node.end_block();

    let bid_id = BidId::new(&order, provider.address.clone());
    node.deliver(sign(&node, &provider, Msg::close_bid(bid_id.clone()), 0))
        .await
        .unwrap();

    assert_eq!(node.bid(&bid_id).unwrap().state, BidState::Closed);
    assert_eq!(
        node.lease(&LeaseId::from(&bid_id)).unwrap().state,
        LeaseState::Closed
    );
    assert_eq!(node.order(&order).unwrap().state, OrderState::Closed);
    assert_eq!(node.spendable_coins(&provider.address).amount_of(DENOM), 1_000);

    let again = sign(&node, &provider, Msg::close_bid(bid_id.clone()), 0);
    assert_eq!(
        node.deliver(again).await,
        Err(DeliverError::Market(MarketError::BidAlreadyClosed(bid_id)))
    );
}

#[tokio::test]
async fn close_lease_by_owner() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));
    node.deliver(sign(&node, &provider, create_bid_msg(&order, &provider), 0))
        .await
        .unwrap();
    node.end_block();

    let lease = LeaseId::from(&BidId::new(&order, provider.address.clone()));
    node.deliver(sign(&node, &owner, Msg::close_lease(lease.clone()), 0))
        .await
        .unwrap();
    assert_eq!(node.lease(&lease).unwrap().state, LeaseState::Closed);
    assert_eq!(node.order(&order).unwrap().state, OrderState::Closed);
}

#[tokio::test]
async fn visit_bids_stops_on_break() {
    let node = MemoryNode::new("sim");
    let owner = actor(&node, 1, 1_000);
    let provider = actor(&node, 2, 1_000);
    node.register_provider(provider.address.clone());
    for _ in 0..3 {
        let order = node.create_order(owner.address.clone(), Coin::new(DENOM, 100));
        node.deliver(sign(&node, &provider, create_bid_msg(&order, &provider), 0))
            .await
            .unwrap();
    }

    let mut seen = 0;
    node.visit_bids(&mut |_| {
        seen += 1;
        if seen == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(seen, 2);
}
