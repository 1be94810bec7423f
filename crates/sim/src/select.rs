//! Candidate selection and account resolution.

use dmarket_types::Address;

use crate::account::{find_account, SimAccount};
use crate::error::SimError;
use crate::outcome::OperationKind;
use crate::rng::{rand_idx, SimRng};

/// Pick one element uniformly, or `None` when there is nothing to pick.
///
/// An empty candidate list is a legitimate state ("nothing to do"), not an
/// error; callers turn it into a no-op outcome.
pub fn pick<'a, T>(rng: &mut SimRng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rand_idx(rng, items.len()))
}

/// Map an address with on-chain state to its simulation account.
///
/// Every such address is expected to resolve; a miss means the fixture and
/// the node disagree, which is a hard failure.
pub fn resolve_account<'a>(
    kind: OperationKind,
    accounts: &'a [SimAccount],
    address: &Address,
) -> Result<&'a SimAccount, SimError> {
    find_account(accounts, address).ok_or_else(|| SimError::AccountNotFound {
        kind,
        address: address.clone(),
    })
}
