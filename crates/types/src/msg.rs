//! Transition requests understood by the market state machine.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::coin::Coin;
use crate::market::{BidId, LeaseId, OrderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    CreateBid {
        order: OrderId,
        provider: Address,
        price: Coin,
        deposit: Coin,
    },
    CloseBid {
        bid: BidId,
    },
    CloseLease {
        lease: LeaseId,
    },
}

impl Msg {
    pub fn create_bid(order: OrderId, provider: Address, price: Coin, deposit: Coin) -> Self {
        Msg::CreateBid {
            order,
            provider,
            price,
            deposit,
        }
    }

    pub fn close_bid(bid: BidId) -> Self {
        Msg::CloseBid { bid }
    }

    pub fn close_lease(lease: LeaseId) -> Self {
        Msg::CloseLease { lease }
    }

    /// The account expected to sign this message.
    pub fn signer(&self) -> &Address {
        match self {
            Msg::CreateBid { provider, .. } => provider,
            Msg::CloseBid { bid } => &bid.provider,
            Msg::CloseLease { lease } => &lease.0.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_bid_is_signed_by_provider() {
        let order = OrderId {
            owner: Address::new("dm1owner"),
            dseq: 1,
            gseq: 1,
            oseq: 1,
        };
        let bid = BidId::new(&order, Address::new("dm1prov"));
        let msg = Msg::close_bid(bid);
        assert_eq!(msg.signer(), &Address::new("dm1prov"));
    }

    #[test]
    fn serializes_with_type_tag() {
        let order = OrderId {
            owner: Address::new("dm1owner"),
            dseq: 1,
            gseq: 1,
            oseq: 1,
        };
        let msg = Msg::create_bid(
            order,
            Address::new("dm1prov"),
            Coin::new("ustake", 5),
            Coin::new("ustake", 10),
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "create_bid");
        assert_eq!(json["provider"], "dm1prov");
        assert_eq!(json["deposit"]["amount"], "10");

        let decoded: Msg = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, msg);
    }
}
