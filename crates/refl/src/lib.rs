//! refl: compact, relocatable reflection metadata for C-family declarations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all refl sub-crates. For most users, adding `refl` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use refl::prelude::*;
//!
//! // Describe `struct point { int x; int y; };`
//! let mut db = DeclDb::new().unwrap();
//! let mut b = DeclBuilder::new(&mut db);
//! let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
//! b.begin_struct("point").unwrap();
//! b.field("x", int).unwrap();
//! b.field("y", int).unwrap();
//! b.close().unwrap();
//! b.finish().unwrap();
//!
//! // Persist and reload.
//! let mut bytes = Vec::new();
//! refl::file::write_db(&mut bytes, &db).unwrap();
//! let db = refl::file::read_db(bytes.as_slice()).unwrap();
//!
//! // Count, then fill.
//! let mut types = vec![DeclId::NULL; db.types(None)];
//! db.types(Some(&mut types));
//! let point = db.get(types[0]);
//! assert!(point.is_struct());
//! let names: Vec<_> = point.children().map(|f| f.name()).collect();
//! assert_eq!(names, ["x", "y"]);
//! assert_eq!(point.type_width(), 64);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `refl-core` | Ids, kinds, attribute flags, records, errors |
//! | [`db`] | `refl-db` | Database, handles, queries, builder, layout |
//! | [`file`] | `refl-file` | Binary store and load |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`refl-core`).
///
/// [`types::DeclKind`], [`types::DeclAttrs`], [`types::DeclRecord`] and the
/// error enums.
pub use refl_core as types;

/// The declaration database (`refl-db`).
///
/// [`db::DeclDb`] owns the graph, [`db::DeclRef`] reads it and
/// [`db::DeclBuilder`] threads it.
pub use refl_db as db;

/// Binary persistence (`refl-file`).
///
/// [`file::save`] and [`file::load`] for paths, [`file::write_db`] and
/// [`file::read_db`] for streams.
pub use refl_file as file;

/// Common imports for typical refl usage.
///
/// ```rust
/// use refl::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use refl_core::{DeclAttrs, DeclId, DeclKind, DeclRecord, Payload};

    // Errors
    pub use refl_core::{DbError, QueryError};
    pub use refl_file::FileError;

    // Database
    pub use refl_db::{DbConfig, DbStats, DeclBuilder, DeclClass, DeclDb, DeclRef};
}
