//! Strongly-typed identifiers for records, names and databases.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index of a declaration record within its database's arena.
///
/// `DeclId(0)` is the permanently reserved sentinel: it never names a real
/// record and every accessor treats it as "absent".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    /// The null reference.
    pub const NULL: Self = Self(0);

    /// Whether this is the null reference.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The index as a `usize`, for slice addressing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeclId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Byte offset of a NUL-terminated name within a string pool.
///
/// `NameOffset(0)` always resolves to the empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameOffset(pub u32);

impl NameOffset {
    /// The "no name" offset.
    pub const EMPTY: Self = Self(0);

    /// Whether this offset denotes an unnamed record.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NameOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for unique [`DbId`] allocation.
static DB_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identity of a database.
///
/// Two databases never share an id within a process, even when one is a
/// byte-identical reload of the other. Reference handles carry it so that
/// handles from different databases never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbId(u64);

impl DbId {
    /// Allocate a fresh, unique database id. Thread-safe.
    pub fn next() -> Self {
        Self(DB_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db#{}", self.0)
    }
}
