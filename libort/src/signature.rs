//! Authorship for the virtual commits C7 fabricates when reducing multiple
//! merge bases (§4.7). These commits are never written to the object store -
//! they exist only so the driver has something to recurse on - so the
//! signature only needs to be well-formed, not configured by the caller.

use std::fmt::{self, Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochTime(i64);

impl EpochTime {
    pub fn new(seconds: i64) -> Self {
        Self(seconds)
    }

    pub fn now() -> Self {
        // tests want determinism: commit content (and thus oid, if these were
        // ever hashed) must not depend on wall-clock time.
        if cfg!(test) {
            return Self(0);
        }
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        Self(secs as i64)
    }
}

/// Timezone offset in minutes, git's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeZoneOffset(i32);

impl TimeZoneOffset {
    pub fn utc() -> Self {
        Self(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub time: EpochTime,
    pub offset: TimeZoneOffset,
}

impl Timestamp {
    pub fn now() -> Self {
        Self { time: EpochTime::now(), offset: TimeZoneOffset::utc() }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.offset.0 < 0 { '-' } else { '+' };
        write!(f, "{} {}{:02}{:02}", self.time.0, sign, self.offset.0.abs() / 60, self.offset.0.abs() % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: Timestamp,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), time: Timestamp::now() }
    }

    /// The author/committer the recursive driver (§4.7) attributes virtual
    /// merge-base commits to - these never become visible to users, so a
    /// fixed identity avoids needing the caller's config machinery here.
    pub fn virtual_merge_base() -> Self {
        Self::new("ort", "ort@localhost")
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.time)
    }
}
