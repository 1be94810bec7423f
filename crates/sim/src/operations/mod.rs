//! Randomized market operations.
//!
//! Each operation reads live market state through its [`Keepers`], picks an
//! eligible target with the step's RNG, and either returns a no-op outcome
//! or signs and submits one request through the [`SimContext`] deliverer.
//!
//! [`Keepers`]: dmarket_node::Keepers

mod close_bid;
mod close_lease;
mod create_bid;

pub use close_bid::SimulateCloseBid;
pub use close_lease::SimulateCloseLease;
pub use create_bid::SimulateCreateBid;

use async_trait::async_trait;

use dmarket_node::{gen_tx, BaseAccount, TxBody, TxDeliverer, DEFAULT_GEN_TX_GAS};
use dmarket_types::{Coins, Msg};

use crate::account::SimAccount;
use crate::error::SimError;
use crate::outcome::{classify_delivery, OperationKind, OperationMsg};
use crate::rng::SimRng;

/// Per-step environment shared by every operation.
#[derive(Clone, Copy)]
pub struct SimContext<'a> {
    pub app: &'a dyn TxDeliverer,
    pub accounts: &'a [SimAccount],
    pub chain_id: &'a str,
}

/// One randomized operation generator.
///
/// `simulate` returns `Ok` for every outcome the run should record and keep
/// going after, including no-ops and expected rejections. `Err` stops the run.
#[async_trait]
pub trait Operation: Send + Sync {
    fn kind(&self) -> OperationKind;

    async fn simulate(
        &self,
        rng: &mut SimRng,
        ctx: &SimContext<'_>,
    ) -> Result<OperationMsg, SimError>;
}

/// Sign `msg` as `signer` and submit it, then classify the result.
///
/// Account number and sequence come from `account` as it was read; they are
/// not re-read here.
pub(crate) async fn sign_and_deliver(
    kind: OperationKind,
    ctx: &SimContext<'_>,
    signer: &SimAccount,
    account: &BaseAccount,
    msg: Msg,
    fee: Coins,
) -> Result<OperationMsg, SimError> {
    let body = TxBody {
        chain_id: ctx.chain_id.to_string(),
        msgs: vec![msg.clone()],
        fee,
        gas: DEFAULT_GEN_TX_GAS,
        account_number: account.account_number,
        sequence: account.sequence,
    };
    let tx = gen_tx(body, &signer.signing_key)
        .map_err(|source| SimError::TxGeneration { kind, source })?;

    let result = ctx.app.deliver(tx).await;
    let out = classify_delivery(kind, msg, result)?;
    tracing::debug!(
        operation = %kind,
        outcome = %out.outcome,
        comment = %out.comment,
        "delivered"
    );
    Ok(out)
}
