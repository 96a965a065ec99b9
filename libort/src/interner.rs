//! A thread-local arena that [`crate::path::OrtPath`] interns into.
//!
//! Same shape as `libbit`'s `bumpalo`-backed `Interner` - paths live for the
//! lifetime of the process (the arena is never reset), which is fine for a
//! merge driver that processes one merge and exits, or one merge per
//! long-lived worker thread.

use bumpalo::Bump;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use crate::path::OrtPath;

pub(crate) struct PathInterner {
    arena: Bump,
    seen: FxHashSet<&'static OsStr>,
}

impl PathInterner {
    fn new() -> Self {
        Self { arena: Bump::new(), seen: FxHashSet::default() }
    }

    pub(crate) fn intern_path(&mut self, path: impl AsRef<OsStr>) -> OrtPath {
        let path = path.as_ref();
        if let Some(&existing) = self.seen.get(path) {
            return OrtPath::new(existing);
        }
        let bytes = self.arena.alloc_slice_copy(path.as_bytes());
        // SAFETY: the arena never shrinks or frees, so this is effectively
        // `'static` for as long as the thread-local lives.
        let bytes: &'static [u8] = unsafe { std::mem::transmute(bytes) };
        let interned = OsStr::from_bytes(bytes);
        self.seen.insert(interned);
        OrtPath::new(interned)
    }

    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

thread_local! {
    static INTERNER: RefCell<PathInterner> = RefCell::new(PathInterner::new());
}

pub(crate) fn with_path_interner<R>(f: impl FnOnce(&mut PathInterner) -> R) -> R {
    INTERNER.with(|interner| f(&mut interner.borrow_mut()))
}

/// Number of distinct paths interned on this thread so far. Exposed for the
/// accounting-invariant tests in §8 (every path in the merged tree/conflict
/// set traces back to an interned entry, nothing is fabricated).
pub fn interned_path_count() -> usize {
    with_path_interner(PathInterner::len)
}
