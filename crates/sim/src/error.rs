use dmarket_node::{DeliverError, TxError};
use dmarket_types::Address;

use crate::config::ConfigError;
use crate::outcome::OperationKind;

/// Hard failures of a simulation step or run.
///
/// No-op and expected-rejection outcomes are values, never errors. Anything
/// in this enum means either the fixture is inconsistent or the state
/// machine misbehaved.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An address with on-chain state has no simulation account.
    #[error("{kind}: no simulation account for address {address}")]
    AccountNotFound {
        kind: OperationKind,
        address: Address,
    },

    /// A simulation account has no account on the node.
    #[error("{kind}: account {address} not found on chain")]
    AccountMissingOnChain {
        kind: OperationKind,
        address: Address,
    },

    #[error("{kind}: unable to generate tx: {source}")]
    TxGeneration {
        kind: OperationKind,
        #[source]
        source: TxError,
    },

    /// The node rejected a request for a reason the operation does not expect.
    #[error("{kind}: unable to deliver tx: {source}")]
    Delivery {
        kind: OperationKind,
        #[source]
        source: DeliverError,
    },

    #[error("no operation has a positive weight")]
    NoOperations,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
