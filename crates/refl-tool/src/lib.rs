//! Support library for the `refltool` binary.
//!
//! [`cli`] defines the argument surface; [`dump`] renders a loaded
//! database as fixed-width record tables or per-kind statistics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod dump;

pub use cli::{Cli, Mode};
pub use dump::{dump, write_stats, DumpFormat};
