use dmarket_types::{Address, MarketError};

/// All errors a `TxDeliverer` can return for a submitted transaction.
///
/// Everything except `Market` is raised before the message handler runs
/// (signature, account and fee checks).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliverError {
    /// The signature does not verify against the embedded public key.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("transaction carries no messages")]
    NoMessages,

    /// The signer has no account on the node.
    #[error("unknown account: {0}")]
    UnknownAccount(Address),

    /// The embedded public key does not belong to the signing account.
    #[error("public key does not match account {0}")]
    PublicKeyMismatch(Address),

    #[error("wrong chain id: expected {expected}, got {got}")]
    WrongChain { expected: String, got: String },

    #[error("account number mismatch for {address}: expected {expected}, got {got}")]
    AccountNumberMismatch {
        address: Address,
        expected: u64,
        got: u64,
    },

    /// The transaction was built against a stale sequence.
    #[error("account sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u64, got: u64 },

    /// The signer cannot cover the declared fee.
    #[error("insufficient funds to pay fee {0}")]
    InsufficientFee(String),

    /// The message handler rejected the transition.
    #[error(transparent)]
    Market(#[from] MarketError),
}
