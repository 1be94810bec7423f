mod error;
mod memory;
mod traits;
mod tx;

pub use error::DeliverError;
pub use memory::MemoryNode;
pub use traits::{
    AccountKeeper, BankKeeper, BaseAccount, Keepers, MarketKeeper, ProviderKeeper, TxDeliverer,
};
pub use tx::{gen_tx, SignedTx, TxBody, TxError, DEFAULT_GEN_TX_GAS};
