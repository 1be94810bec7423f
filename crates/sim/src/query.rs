//! Read-only scans over the live market state.
//!
//! Each function returns a snapshot taken at call time. Nothing here is
//! isolated from later deliveries, so a target found now may have changed by
//! the time its request is submitted; the classifier handles that.

use std::ops::ControlFlow;

use dmarket_node::{MarketKeeper, ProviderKeeper};
use dmarket_types::{Bid, BidState, LeaseId, LeaseState, Order, OrderState, Provider};

pub fn orders_with_state(market: &dyn MarketKeeper, state: OrderState) -> Vec<Order> {
    market.orders_by_state(state)
}

pub fn providers(providers: &dyn ProviderKeeper) -> Vec<Provider> {
    providers.providers()
}

/// Bids eligible for closing: the bid is active and so is its lease.
pub fn matched_bids(market: &dyn MarketKeeper) -> Vec<Bid> {
    let mut bids = Vec::new();
    market.visit_bids(&mut |bid| {
        if bid.state == BidState::Active {
            let lease = market.lease(&LeaseId::from(&bid.id));
            if matches!(lease, Some(ref l) if l.state == LeaseState::Active) {
                bids.push(bid.clone());
            }
        }
        ControlFlow::Continue(())
    });
    bids
}
