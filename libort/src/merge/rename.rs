//! C3: the rename detector hook. §1 treats "no renames" as a
//! correct-but-degraded mode rather than a missing feature, so the default
//! [`NoRenameDetection`] is a perfectly valid production choice, not just a
//! test stub.

use crate::error::OrtResult;
use crate::merge::path_table::PathTable;

/// Given the populated path table (post-C2), decide whether anything needs
/// rewriting to account for renamed paths. A real implementation is free to
/// move a conflicted entry's version on side *i* from one path to another
/// and update `pathnames[i]` - as long as it preserves every invariant in
/// §3, nothing downstream needs to know renames happened at all.
pub trait RenameDetector {
    /// Returns whether the path table is still "clean" with respect to
    /// rename handling (not to be confused with a path's own merge
    /// cleanliness) - i.e. whether anything was left unresolved that only a
    /// smarter rename detector could have fixed.
    fn detect_renames(&self, table: &mut PathTable) -> OrtResult<bool>;
}

/// The stub from §4.3: reports clean, touches nothing.
pub struct NoRenameDetection;

impl RenameDetector for NoRenameDetection {
    fn detect_renames(&self, _table: &mut PathTable) -> OrtResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_clean_and_is_a_no_op() {
        let mut table = PathTable::new();
        assert!(NoRenameDetection.detect_renames(&mut table).unwrap());
        assert!(table.is_empty());
    }
}
