/// Marks an invariant violation (see §7 "internal consistency violations" in
/// the design notes): these are bugs, never a user-facing outcome, so we
/// abort loudly rather than try to recover.
macro_rules! bug {
    ($($arg:tt)*) => {{
        eprintln!("BUG!");
        unreachable!($($arg)*)
    }};
}

