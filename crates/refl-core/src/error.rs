//! Error types shared by the refl crates.
//!
//! Wrong-kind *reads* are not errors anywhere in refl: accessors return a
//! zero or null value instead. The enums here cover construction failures
//! and the one query shape that must distinguish "empty" from "wrong kind".

use thiserror::Error;

use crate::id::DeclId;
use crate::kind::DeclKind;

/// Errors raised while building or reconstructing a database.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DbError {
    /// The allocator could not grow a backing buffer.
    #[error("allocation failed growing {what} to {requested} entries")]
    AllocationFailed {
        /// Which buffer was being grown.
        what: &'static str,
        /// Requested capacity.
        requested: usize,
    },
    /// A buffer would outgrow its 32-bit index or offset space.
    #[error("{what} capacity exceeded (limit {limit})")]
    CapacityExceeded {
        /// Which buffer overflowed.
        what: &'static str,
        /// Maximum number of entries.
        limit: usize,
    },
    /// The id is null or past the end of the arena.
    #[error("unknown declaration {id} (arena length {len})")]
    UnknownDecl {
        /// The offending id.
        id: DeclId,
        /// Arena length at the time of the call.
        len: usize,
    },
    /// A kind-specific write was attempted on a record of another kind.
    #[error("declaration {id} is a {found}, expected {expected}")]
    KindMismatch {
        /// The record written to.
        id: DeclId,
        /// Description of the accepted kinds.
        expected: &'static str,
        /// The record's actual kind.
        found: DeclKind,
    },
    /// A record refers to an index outside the arena.
    #[error("declaration {id} has {field} -> {target}, past arena length {len}")]
    DanglingReference {
        /// The referring record.
        id: DeclId,
        /// Which link field.
        field: &'static str,
        /// The out-of-range target.
        target: u32,
        /// Arena length.
        len: usize,
    },
    /// A record's name offset lies outside the string pool.
    #[error("declaration {id} has name offset {offset}, past pool length {len}")]
    DanglingName {
        /// The referring record.
        id: DeclId,
        /// The out-of-range offset.
        offset: u32,
        /// Pool length.
        len: usize,
    },
    /// Raw parts do not form a valid database.
    #[error("corrupt database: {detail}")]
    Corrupt {
        /// Human-readable description.
        detail: String,
    },
    /// A set-once link that a declaration needed is already taken.
    #[error("declaration {id} already has a {field} link")]
    AlreadyLinked {
        /// The record whose link is taken.
        id: DeclId,
        /// Which link field.
        field: &'static str,
    },
    /// `close()` was called with no open container.
    #[error("no open container to close")]
    NoOpenContainer,
    /// A build finished with containers still open.
    #[error("{depth} container(s) still open at finish")]
    UnclosedContainer {
        /// Number of open containers.
        depth: usize,
    },
    /// The database configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from validating a database configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An initial capacity was zero.
    #[error("{field} must be at least 1")]
    ZeroCapacity {
        /// The offending configuration field.
        field: &'static str,
    },
}

/// Errors from child-list queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The record is not a container of the requested kind.
    #[error("expected {expected} container, found {found}")]
    NotAContainer {
        /// Container kind the query requires.
        expected: DeclKind,
        /// The record's actual kind.
        found: DeclKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = DbError::KindMismatch {
            id: DeclId(4),
            expected: "array",
            found: DeclKind::Struct,
        };
        assert_eq!(e.to_string(), "declaration 4 is a struct, expected array");

        let q = QueryError::NotAContainer {
            expected: DeclKind::Enum,
            found: DeclKind::Union,
        };
        assert_eq!(q.to_string(), "expected enum container, found union");
    }
}
