//! The content-merge hook C4 calls for the "both sides modify" case (§4.4's
//! last row). §1/§9 are explicit that the actual three-way textual merge
//! (with conflict markers) is out of scope and left unimplemented here -
//! this module only specifies the seam.

use crate::error::OrtResult;
use crate::obj::Version;
use crate::path::OrtPath;

pub struct ContentMergeInput {
    pub base: Version,
    pub side1: Version,
    pub side2: Version,
    /// `pathnames[i]` for the three sides, which may differ from the
    /// entry's own key if a rename moved the path (§4.4: "content-merge
    /// hook with `(base, side1, side2, pathnames)`").
    pub pathnames: [OrtPath; 3],
}

pub struct ContentMergeOutput {
    pub result: Version,
    pub clean: bool,
}

/// Implemented by whatever textual (or binary) three-way merge the caller
/// has on hand. Returning `clean: false` leaves the path conflicted with
/// `result` as the provisional content, same as the no-hook degraded mode.
pub trait ContentMerge {
    fn merge_content(&self, path: OrtPath, input: ContentMergeInput) -> OrtResult<ContentMergeOutput>;
}

/// No hook configured: every both-sides-modified path stays conflicted with
/// side1's content, the degraded mode §4.4 specifies when the hook is
/// absent.
pub struct NoContentMerge;

impl ContentMerge for NoContentMerge {
    fn merge_content(&self, _path: OrtPath, input: ContentMergeInput) -> OrtResult<ContentMergeOutput> {
        Ok(ContentMergeOutput { result: input.side1, clean: false })
    }
}
