//! Core types for the refl declaration graph.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the database, the file codec and the tooling:
//! record identifiers, the closed [`DeclKind`] tag set, the [`DeclAttrs`]
//! bitset, the tagged [`Payload`] and the fixed-shape [`DeclRecord`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attrs;
pub mod error;
pub mod id;
pub mod kind;
pub mod record;

pub use attrs::DeclAttrs;
pub use error::{ConfigError, DbError, QueryError};
pub use id::{DbId, DeclId, NameOffset};
pub use kind::DeclKind;
pub use record::{DeclRecord, Payload};
