//! Checkout is explicitly out of scope (§1: "the index/working-copy updater
//! ('unpack trees')... not specified here") - this module only defines the
//! seam [`merge::merge_switch_to_result`](crate::merge::merge_switch_to_result)
//! calls through. Callers that want an actual worktree update supply a
//! [`Checkout`] implementation; this crate never touches the filesystem.

use crate::error::OrtResult;
use crate::hash::Oid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStrategy {
    /// Refuse if the worktree has local modifications the checkout would
    /// clobber.
    Safe,
    Force,
}

impl Default for CheckoutStrategy {
    fn default() -> Self {
        CheckoutStrategy::Safe
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CheckoutOpts {
    pub strategy: CheckoutStrategy,
}

impl CheckoutOpts {
    pub fn forced() -> Self {
        Self { strategy: CheckoutStrategy::Force }
    }
}

/// The two-way checkout hook `merge_switch_to_result` drives (§6): move the
/// worktree/index from `from` to `to`. A no-op implementation is a
/// perfectly valid (if unusual) choice for callers that only want the
/// in-memory merge result.
pub trait Checkout {
    fn checkout(&self, from: Oid, to: Oid, opts: CheckoutOpts) -> OrtResult<()>;
}

/// Does nothing; used by tests and by callers that only want the merged
/// tree id and don't maintain a worktree at all.
pub struct NullCheckout;

impl Checkout for NullCheckout {
    fn checkout(&self, _from: Oid, _to: Oid, _opts: CheckoutOpts) -> OrtResult<()> {
        Ok(())
    }
}
