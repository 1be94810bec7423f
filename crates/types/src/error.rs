use crate::market::{BidId, LeaseId, OrderId};

/// Rejections raised by the market state machine when a message is invalid
/// for the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("order not open: {0}")]
    OrderNotOpen(OrderId),

    /// A bid from this provider already exists for the order.
    #[error("bid already exists: {0}")]
    BidExists(BidId),

    #[error("provider and order owner cannot be the same: {0}")]
    ProviderIsOrderOwner(OrderId),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("bid price {bid} above order price {order}")]
    PriceTooHigh { bid: String, order: String },

    #[error("invalid deposit: {0}")]
    InvalidDeposit(String),

    #[error("insufficient funds for deposit {0}")]
    InsufficientFunds(String),

    #[error("bid not found: {0}")]
    BidNotFound(BidId),

    #[error("bid already closed: {0}")]
    BidAlreadyClosed(BidId),

    #[error("lease not found: {0}")]
    LeaseNotFound(LeaseId),

    #[error("lease not active: {0}")]
    LeaseNotActive(LeaseId),
}
