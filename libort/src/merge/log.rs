//! C8: the diagnostic log. Per-path, append-only; sorted by path only when
//! drained (§4.8), so C2/C4 never pay for sorting while the merge is still
//! running.

use crate::path::OrtPath;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct LogMessage {
    pub text: String,
    /// "skip under remerge-diff" from §4.8 - a path-agnostic flag some
    /// callers use to suppress noise when re-deriving a merge's diff.
    pub skip_remerge_diff: bool,
}

#[derive(Debug, Default)]
pub struct MergeLog {
    messages: FxHashMap<OrtPath, Vec<LogMessage>>,
}

impl MergeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: OrtPath, text: impl Into<String>) {
        self.push_with(path, text, false)
    }

    pub fn push_with(&mut self, path: OrtPath, text: impl Into<String>, skip_remerge_diff: bool) {
        let text = text.into();
        trace!("merge log [{}]: {}", path, text);
        self.messages.entry(path).or_default().push(LogMessage { text, skip_remerge_diff });
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drains the log, returning `(path, messages)` pairs sorted by path -
    /// the only point at which sort order is imposed (§5: "the log's
    /// emission order is sorted by path").
    pub fn drain_sorted(&mut self) -> Vec<(OrtPath, Vec<LogMessage>)> {
        let mut entries: Vec<_> = self.messages.drain().collect();
        entries.sort_by_key(|(path, _)| *path);
        entries
    }
}
