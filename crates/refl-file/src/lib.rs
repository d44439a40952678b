//! Binary persistence for refl declaration databases.
//!
//! A database is stored as a fixed header, its record arena verbatim, its
//! string pool verbatim and a checksum. Because records link by index and
//! names by pool offset, loading needs no fix-ups: the sections are read
//! back, validated and adopted as-is.
//!
//! # Architecture
//!
//! - [`write_db`] / [`save`] encode a [`DeclDb`](refl_db::DeclDb) to any
//!   `Write` sink or to a path
//! - [`read_db`] / [`load`] decode and validate from any `Read` source or
//!   from a path
//! - [`codec`] holds the primitive and per-section encoders
//!
//! # Format
//!
//! ```text
//! [MAGIC "REFL"] [VERSION u16] [RECORD_SIZE u16] [record_count u32]
//! [pool_len u32] [root u32] [reserved u32]
//! [record 0] [record 1] ... [record N-1]      (RECORD_SIZE bytes each)
//! [string pool]                              (pool_len bytes)
//! [FNV-1a 64 of records ++ string pool]
//! ```
//!
//! All integers are little-endian. A store after a load reproduces the
//! input byte for byte.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod reader;
pub mod writer;

pub use codec::FileHeader;
pub use error::FileError;
pub use hash::{checksum, Fnv1a};
pub use reader::{load, read_db};
pub use writer::{save, write_db};

/// Magic bytes at the start of every database file.
pub const MAGIC: [u8; 4] = *b"REFL";

/// Current binary format version.
pub const FORMAT_VERSION: u16 = 1;

/// Encoded size of one record in bytes.
pub const RECORD_SIZE: u16 = 32;

/// Encoded size of the header in bytes.
pub const HEADER_SIZE: usize = 24;
