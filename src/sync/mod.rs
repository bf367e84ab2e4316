//! Region locking.

pub mod lockset;

pub use lockset::{LockSet, LockSetGuard, RegionLocks};
