//! Block-by-block simulation driver.
//!
//! A run builds a fresh [`MemoryNode`], funds the simulation accounts,
//! registers providers, then for every block posts new orders, runs the
//! configured number of weighted operation steps and closes the block.
//! The first `SimError` stops the run.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use dmarket_node::{Keepers, MemoryNode};
use dmarket_types::{Coin, Coins};

use crate::account::random_accounts;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::funding::{FeePolicy, RandomFees};
use crate::operations::SimContext;
use crate::outcome::{OperationKind, Outcome};
use crate::rng::{rand_idx, sim_rng};
use crate::weights::weighted_operations;

/// One executed simulation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    pub block: u64,
    pub step: usize,
    pub kind: OperationKind,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub accepted: u64,
    pub no_op: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl OutcomeTally {
    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Accepted => self.accepted += 1,
            Outcome::NoOp => self.no_op += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.accepted + self.no_op + self.rejected + self.failed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub blocks_run: u64,
    pub leases_created: u64,
    pub records: Vec<OperationRecord>,
    pub tallies: BTreeMap<OperationKind, OutcomeTally>,
}

impl SimulationReport {
    pub fn new(seed: u64) -> Self {
        SimulationReport {
            seed,
            ..SimulationReport::default()
        }
    }

    fn record(&mut self, record: OperationRecord) {
        self.tallies
            .entry(record.kind)
            .or_default()
            .count(record.outcome);
        self.records.push(record);
    }

    pub fn tally(&self, kind: OperationKind) -> OutcomeTally {
        self.tallies.get(&kind).copied().unwrap_or_default()
    }

    /// Number of steps per outcome, summed over every kind.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "seed {}: {} blocks, {} steps, {} leases",
            self.seed,
            self.blocks_run,
            self.records.len(),
            self.leases_created
        )?;
        writeln!(
            f,
            "{:<12} {:>9} {:>9} {:>9} {:>9}",
            "operation", "accepted", "no-op", "rejected", "failed"
        )?;
        for kind in OperationKind::ALL {
            let t = self.tally(kind);
            writeln!(
                f,
                "{:<12} {:>9} {:>9} {:>9} {:>9}",
                kind.name(),
                t.accepted,
                t.no_op,
                t.rejected,
                t.failed
            )?;
        }
        Ok(())
    }
}

/// A run stopped by a hard failure.
///
/// Carries the seed and position so the run can be replayed, plus the report
/// up to and including the failed step.
#[derive(Debug, thiserror::Error)]
#[error("simulation failed at block {block} step {step} (seed {seed}): {error}")]
pub struct SimulationFailure {
    pub seed: u64,
    pub block: u64,
    pub step: usize,
    #[source]
    pub error: SimError,
    pub report: SimulationReport,
}

pub struct Simulation {
    config: SimConfig,
    fees: Arc<dyn FeePolicy>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Simulation {
            config,
            fees: Arc::new(RandomFees),
        }
    }

    pub fn with_fee_policy(mut self, fees: Arc<dyn FeePolicy>) -> Self {
        self.fees = fees;
        self
    }

    pub async fn run(&self) -> Result<SimulationReport, SimulationFailure> {
        let config = &self.config;
        let mut report = SimulationReport::new(config.seed);

        let fail = |block, step, error: SimError, report: SimulationReport| SimulationFailure {
            seed: config.seed,
            block,
            step,
            error,
            report,
        };

        if let Err(e) = config.validate() {
            return Err(fail(0, 0, e.into(), report));
        }

        let mut rng = sim_rng(config.seed);
        let node = Arc::new(MemoryNode::new(config.chain_id.clone()));

        let accounts = random_accounts(&mut rng, config.accounts);
        for account in &accounts {
            node.add_account(
                account.public_key(),
                Coins::from(Coin::new(config.denom.clone(), config.initial_balance)),
            );
        }
        for account in accounts.iter().take(config.providers) {
            node.register_provider(account.address.clone());
        }

        let ops = match weighted_operations(
            &config.params,
            Keepers::from_node(node.clone()),
            Coin::new(config.denom.clone(), config.bid_deposit),
            self.fees.clone(),
        ) {
            Ok(ops) => ops,
            Err(e) => return Err(fail(0, 0, e.into(), report)),
        };

        tracing::info!(
            seed = config.seed,
            blocks = config.blocks,
            accounts = accounts.len(),
            providers = config.providers,
            "starting simulation"
        );

        let ctx = SimContext {
            app: &*node,
            accounts: &accounts,
            chain_id: &config.chain_id,
        };

        for block in 1..=config.blocks {
            for _ in 0..config.orders_per_block {
                let owner = &accounts[rand_idx(&mut rng, accounts.len())];
                let price = rng.gen_range(1..=config.max_order_price);
                node.create_order(owner.address.clone(), Coin::new(config.denom.clone(), price));
            }

            for step in 0..config.ops_per_block {
                let op = match ops.select(&mut rng) {
                    Ok(op) => op,
                    Err(e) => return Err(fail(block, step, e, report)),
                };
                let kind = op.kind();

                match op.op.simulate(&mut rng, &ctx).await {
                    Ok(out) => report.record(OperationRecord {
                        block,
                        step,
                        kind,
                        outcome: out.outcome,
                        comment: out.comment,
                        error: None,
                    }),
                    Err(e) => {
                        tracing::warn!(block, step, operation = %kind, error = %e, "step failed");
                        report.record(OperationRecord {
                            block,
                            step,
                            kind,
                            outcome: Outcome::Failed,
                            comment: String::new(),
                            error: Some(e.to_string()),
                        });
                        report.blocks_run = block - 1;
                        return Err(fail(block, step, e, report));
                    }
                }
            }

            let leases = node.end_block();
            report.leases_created += leases as u64;
            report.blocks_run = block;
            tracing::debug!(block, leases, "block closed");
        }

        tracing::info!(
            seed = config.seed,
            steps = report.records.len(),
            leases = report.leases_created,
            "simulation finished"
        );
        Ok(report)
    }
}
