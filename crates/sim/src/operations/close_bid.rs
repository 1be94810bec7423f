use std::sync::Arc;

use async_trait::async_trait;

use dmarket_node::Keepers;
use dmarket_types::Msg;

use crate::error::SimError;
use crate::funding::FeePolicy;
use crate::outcome::{OperationKind, OperationMsg};
use crate::query;
use crate::rng::SimRng;
use crate::select::{pick, resolve_account};

use super::{sign_and_deliver, Operation, SimContext};

/// Close a random matched bid, signed by its provider.
pub struct SimulateCloseBid {
    keepers: Keepers,
    fees: Arc<dyn FeePolicy>,
}

impl SimulateCloseBid {
    pub fn new(keepers: Keepers, fees: Arc<dyn FeePolicy>) -> Self {
        SimulateCloseBid { keepers, fees }
    }
}

#[async_trait]
impl Operation for SimulateCloseBid {
    fn kind(&self) -> OperationKind {
        OperationKind::CloseBid
    }

    async fn simulate(
        &self,
        rng: &mut SimRng,
        ctx: &SimContext<'_>,
    ) -> Result<OperationMsg, SimError> {
        let kind = self.kind();

        let bids = query::matched_bids(self.keepers.market.as_ref());
        let Some(bid) = pick(rng, &bids) else {
            return Ok(OperationMsg::no_op(kind, "no matched bids found"));
        };

        let signer = resolve_account(kind, ctx.accounts, bid.provider())?;
        let account = self.keepers.accounts.account(&signer.address).ok_or_else(|| {
            SimError::AccountMissingOnChain {
                kind,
                address: signer.address.clone(),
            }
        })?;

        let spendable = self.keepers.bank.spendable_coins(&signer.address);
        let fee = match self.fees.fees(rng, &spendable) {
            Ok(fee) => fee,
            Err(err) => {
                return Ok(OperationMsg::no_op(
                    kind,
                    format!("unable to generate fees: {}", err),
                ))
            }
        };

        let msg = Msg::close_bid(bid.id.clone());
        sign_and_deliver(kind, ctx, signer, &account, msg, fee).await
    }
}
