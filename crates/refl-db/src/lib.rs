//! Declaration database for refl.
//!
//! A [`DeclDb`] owns two append-only buffers: an arena of fixed-shape
//! [`DeclRecord`](refl_core::DeclRecord)s addressed by
//! [`DeclId`](refl_core::DeclId), and a NUL-separated string pool addressed
//! by byte offset. Records link to one another by index only, so the whole
//! graph can be persisted and reloaded without fix-ups.
//!
//! - [`DeclBuilder`] threads sibling and child links while a producer walks
//!   a source tree.
//! - [`DeclRef`] reads the graph through kind-guarded accessors that return
//!   zero or null on mismatch rather than failing.
//! - The query methods on [`DeclDb`] and [`DeclRef`] enumerate top-level
//!   declarations and container members with a count-then-fill protocol.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod builder;
pub mod config;
pub mod database;
pub mod handle;
pub mod intrinsics;
pub mod layout;
pub mod pool;
pub mod query;
pub mod stats;

pub use arena::DeclArena;
pub use builder::DeclBuilder;
pub use config::DbConfig;
pub use database::DeclDb;
pub use handle::DeclRef;
pub use intrinsics::{IntrinsicDef, INTRINSICS};
pub use pool::StringPool;
pub use query::{DeclClass, Members};
pub use stats::DbStats;

pub use refl_core;
