//! Operation kinds, outcomes and delivery classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use dmarket_node::DeliverError;
use dmarket_types::{MarketError, Msg, MODULE_NAME};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    CreateBid,
    CloseBid,
    CloseLease,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::CreateBid,
        OperationKind::CloseBid,
        OperationKind::CloseLease,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::CreateBid => "create-bid",
            OperationKind::CloseBid => "close-bid",
            OperationKind::CloseLease => "close-lease",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a simulation step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The node applied the request.
    Accepted,
    /// No request was submitted: nothing eligible, a precondition failed,
    /// funds were short, or the operation is disabled.
    NoOp,
    /// The node refused the request for a reason the operation expects
    /// (lost race, duplicate). Not applied, not a fault.
    Rejected,
    /// The step raised a `SimError`. Only ever set on run records.
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Accepted => "accepted",
            Outcome::NoOp => "no-op",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        })
    }
}

/// Result of one operation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMsg {
    pub route: String,
    pub kind: OperationKind,
    pub outcome: Outcome,
    /// Human-readable reason; empty for accepted steps.
    pub comment: String,
    /// The submitted request, when one was built.
    pub msg: Option<Msg>,
}

impl OperationMsg {
    pub fn no_op(kind: OperationKind, comment: impl Into<String>) -> Self {
        OperationMsg {
            route: MODULE_NAME.to_string(),
            kind,
            outcome: Outcome::NoOp,
            comment: comment.into(),
            msg: None,
        }
    }

    pub fn accepted(kind: OperationKind, msg: Msg) -> Self {
        OperationMsg {
            route: MODULE_NAME.to_string(),
            kind,
            outcome: Outcome::Accepted,
            comment: String::new(),
            msg: Some(msg),
        }
    }

    pub fn rejected(kind: OperationKind, msg: Msg, reason: &DeliverError) -> Self {
        OperationMsg {
            route: MODULE_NAME.to_string(),
            kind,
            outcome: Outcome::Rejected,
            comment: reason.to_string(),
            msg: Some(msg),
        }
    }

    /// Whether the step changed state.
    pub fn ok(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

/// Whether `err` is a rejection `kind` anticipates under live, evolving state.
///
/// A stale sequence is expected for every kind: the sequence is captured
/// before the funding guard runs and is not revalidated.
pub fn is_expected_rejection(kind: OperationKind, err: &DeliverError) -> bool {
    match err {
        DeliverError::SequenceMismatch { .. } => true,
        DeliverError::Market(market) => matches!(
            (kind, market),
            (OperationKind::CreateBid, MarketError::BidExists(_))
                | (
                    OperationKind::CloseBid,
                    MarketError::BidAlreadyClosed(_) | MarketError::LeaseNotActive(_)
                )
        ),
        _ => false,
    }
}

/// Map a delivery result onto an outcome.
///
/// Unrecognized delivery errors are returned as `SimError::Delivery`, the
/// failure a state machine regression would surface as.
pub fn classify_delivery(
    kind: OperationKind,
    msg: Msg,
    result: Result<(), DeliverError>,
) -> Result<OperationMsg, SimError> {
    match result {
        Ok(()) => Ok(OperationMsg::accepted(kind, msg)),
        Err(err) if is_expected_rejection(kind, &err) => {
            Ok(OperationMsg::rejected(kind, msg, &err))
        }
        Err(source) => Err(SimError::Delivery { kind, source }),
    }
}
