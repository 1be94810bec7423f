//! dmarket-types: shared records for the Order → Bid → Lease marketplace.
//!
//! These types are the vocabulary shared by the reference node and the
//! randomized operation harness. They carry no business rules beyond
//! construction helpers; state transitions live in `dmarket-node`.

pub mod address;
pub mod coin;
pub mod error;
pub mod market;
pub mod msg;

pub use address::Address;
pub use coin::{Coin, Coins};
pub use error::MarketError;
pub use market::{
    Bid, BidId, BidState, Lease, LeaseId, LeaseState, Order, OrderId, OrderState, Provider,
};
pub use msg::Msg;

/// Module route recorded on every operation message.
pub const MODULE_NAME: &str = "market";
