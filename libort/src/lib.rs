//! `libort` implements the in-memory core of a three-way tree merge: given a
//! common ancestor tree and two side trees it produces a merged tree object
//! plus a set of index entries describing what merged cleanly and what is
//! still conflicted.
//!
//! The crate is deliberately agnostic about where trees and blobs live. A
//! [`store::ObjectStore`] implementation supplies object bytes; this crate
//! only ever reads trees through that trait and writes new trees back
//! through it.
//! Likewise, checking the result out onto disk, running a textual three-way
//! blob merge, and detecting renames are all pluggable - see [`merge::rename`]
//! and [`merge::content`].

#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

pub mod checkout;
pub mod error;
pub mod hash;
pub mod index;
pub mod interner;
pub mod merge;
pub mod obj;
pub mod path;
pub mod serialize;
pub mod signature;
pub mod store;
