use async_trait::async_trait;

use crate::error::SimError;
use crate::outcome::{OperationKind, OperationMsg};
use crate::rng::SimRng;

use super::{Operation, SimContext};

/// Lease closing is not simulated yet; every step is a no-op.
///
/// It stays registered so its weight still counts toward the schedule.
/// TODO: pick an active lease, sign as the order owner and submit
/// `Msg::CloseLease` once owner-side fee handling is settled.
#[derive(Debug, Default)]
pub struct SimulateCloseLease;

impl SimulateCloseLease {
    pub fn new() -> Self {
        SimulateCloseLease
    }
}

#[async_trait]
impl Operation for SimulateCloseLease {
    fn kind(&self) -> OperationKind {
        OperationKind::CloseLease
    }

    async fn simulate(
        &self,
        _rng: &mut SimRng,
        _ctx: &SimContext<'_>,
    ) -> Result<OperationMsg, SimError> {
        Ok(OperationMsg::no_op(self.kind(), "skipping"))
    }
}
