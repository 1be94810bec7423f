//! Randomized operation harness for the Order → Bid → Lease workflow.
//!
//! Each simulation step picks one weighted operation, reads live market
//! state to find an eligible target, synthesizes a signed transition
//! request, submits it and classifies the result:
//!
//! 1. nothing eligible, or a precondition fails: `Outcome::NoOp`
//! 2. the node accepts: `Outcome::Accepted`
//! 3. the node rejects for a reason the operation expects (lost race,
//!    duplicate): `Outcome::Rejected`
//! 4. anything else: `SimError`, which stops the run
//!
//! Every random choice draws from a single seeded [`rng::SimRng`], so a run
//! is reproducible from its seed.

pub mod account;
pub mod config;
pub mod error;
pub mod funding;
pub mod operations;
pub mod outcome;
pub mod query;
pub mod rng;
pub mod runner;
pub mod select;
pub mod weights;

pub use account::{find_account, random_accounts, SimAccount};
pub use config::{AppParams, ConfigError, SimConfig};
pub use error::SimError;
pub use funding::{reserve_deposit, FeeError, FeePolicy, RandomFees, Underfunded};
pub use operations::{
    Operation, SimContext, SimulateCloseBid, SimulateCloseLease, SimulateCreateBid,
};
pub use outcome::{classify_delivery, OperationKind, OperationMsg, Outcome};
pub use rng::{rand_idx, sim_rng, SimRng};
pub use runner::{OperationRecord, Simulation, SimulationFailure, SimulationReport};
pub use weights::{default_params, weighted_operations, WeightedOperation, WeightedOperations};
