use std::sync::Arc;

use async_trait::async_trait;

use dmarket_node::Keepers;
use dmarket_types::{Coin, Msg, OrderState};

use crate::error::SimError;
use crate::funding::{reserve_deposit, FeePolicy};
use crate::outcome::{OperationKind, OperationMsg};
use crate::query;
use crate::rng::SimRng;
use crate::select::{pick, resolve_account};

use super::{sign_and_deliver, Operation, SimContext};

/// Bid on a random open order from a random provider.
pub struct SimulateCreateBid {
    keepers: Keepers,
    deposit: Coin,
    fees: Arc<dyn FeePolicy>,
}

impl SimulateCreateBid {
    pub fn new(keepers: Keepers, deposit: Coin, fees: Arc<dyn FeePolicy>) -> Self {
        SimulateCreateBid {
            keepers,
            deposit,
            fees,
        }
    }
}

#[async_trait]
impl Operation for SimulateCreateBid {
    fn kind(&self) -> OperationKind {
        OperationKind::CreateBid
    }

    async fn simulate(
        &self,
        rng: &mut SimRng,
        ctx: &SimContext<'_>,
    ) -> Result<OperationMsg, SimError> {
        let kind = self.kind();

        let orders = query::orders_with_state(self.keepers.market.as_ref(), OrderState::Open);
        let Some(order) = pick(rng, &orders) else {
            return Ok(OperationMsg::no_op(kind, "no open orders found"));
        };

        let providers = query::providers(self.keepers.providers.as_ref());
        let Some(provider) = pick(rng, &providers) else {
            return Ok(OperationMsg::no_op(kind, "no providers found"));
        };

        let signer = resolve_account(kind, ctx.accounts, &provider.owner)?;

        if &signer.address == order.owner() {
            return Ok(OperationMsg::no_op(
                kind,
                "provider and order owner cannot be same",
            ));
        }

        let account = self.keepers.accounts.account(&signer.address).ok_or_else(|| {
            SimError::AccountMissingOnChain {
                kind,
                address: signer.address.clone(),
            }
        })?;

        let spendable = self.keepers.bank.spendable_coins(&signer.address);
        let remaining = match reserve_deposit(&spendable, &self.deposit) {
            Ok(remaining) => remaining,
            Err(err) => {
                tracing::debug!(provider = %signer.address, %err, "underfunded");
                return Ok(OperationMsg::no_op(kind, "out of money"));
            }
        };

        let fee = match self.fees.fees(rng, &remaining) {
            Ok(fee) => fee,
            Err(err) => {
                return Ok(OperationMsg::no_op(
                    kind,
                    format!("unable to generate fees: {}", err),
                ))
            }
        };

        let msg = Msg::create_bid(
            order.id.clone(),
            signer.address.clone(),
            order.price.clone(),
            self.deposit.clone(),
        );
        sign_and_deliver(kind, ctx, signer, &account, msg, fee).await
    }
}
