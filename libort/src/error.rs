//! Error handling follows the same split the rest of the workspace uses:
//! `anyhow` for the ambient "something went wrong, here's context" case, and
//! a small concrete type (downcastable out of the `anyhow::Error`) for the
//! one outcome callers actually want to match on.
//!
//! §7 of the design draws a three-way distinction that this module exists to
//! encode:
//! - hard failures (the object store or checkout blew up) surface as
//!   [`MergeError`] and make their way into `MergeResult::clean == -1`,
//! - conflicts are data, not errors - they never appear here,
//! - broken invariants (§3) are bugs and go through `bug!`, not this type.

use crate::hash::Oid;
use thiserror::Error;

pub type OrtResult<T> = Result<T, OrtGenericError>;
pub type OrtGenericError = anyhow::Error;

/// The hard-failure case from §7: the object store or checkout failed in a
/// way collection/writing cannot paper over. Carries the three tree ids so
/// the message is reproducible without the caller having to thread them
/// through separately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(
    "merging trees failed (base {base}, side1 {side1}, side2 {side2}): {reason}"
)]
pub struct MergeError {
    pub base: Oid,
    pub side1: Oid,
    pub side2: Oid,
    pub reason: String,
}

impl MergeError {
    pub fn new(base: Oid, side1: Oid, side2: Oid, reason: impl Into<String>) -> Self {
        Self { base, side1, side2, reason: reason.into() }
    }
}

pub trait OrtResultExt {
    /// Internal-consistency violations (§3 invariants, §4.5 accounting) are
    /// bugs and must never be treated as an ordinary recoverable error.
    fn is_hard_failure(&self) -> bool;
}

impl<T> OrtResultExt for OrtResult<T> {
    fn is_hard_failure(&self) -> bool {
        match self {
            Ok(..) => false,
            Err(err) => err.downcast_ref::<MergeError>().is_some(),
        }
    }
}
