//! # Domain Invariants
//!
//! Checks the reference host runs at every frame boundary.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Depth grows by one per nested call | [`check_nested_frame_invariant`] |
//! | Depth stays within the host limit | [`check_call_depth_invariant`] |
//! | Coins are conserved by transfers | [`check_value_conservation_invariant`] |

use crate::domain::context::CallContext;
use crate::domain::value_objects::CallerFrame;

/// A nested frame sits exactly one level below its parent and names the
/// parent contract as its innermost caller.
#[must_use]
pub fn check_nested_frame_invariant(parent: &CallContext, child: &CallContext) -> bool {
    child.depth() == parent.depth() + 1
        && child.chain().first() == Some(&CallerFrame::Contract(parent.contract().clone()))
        && child.chain()[1..] == *parent.chain()
}

/// Depth must not exceed `max_depth`.
#[must_use]
pub fn check_call_depth_invariant(ctx: &CallContext, max_depth: u32) -> bool {
    ctx.depth() <= max_depth
}

/// Total coins across the touched holders must be unchanged.
#[must_use]
pub fn check_value_conservation_invariant(before: &[u64], after: &[u64]) -> bool {
    let sum = |v: &[u64]| v.iter().map(|x| u128::from(*x)).sum::<u128>();
    sum(before) == sum(after)
}

// =============================================================================
// TESTS
// =============================================================================
