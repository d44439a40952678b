//! Error types for database persistence.

use std::io;

use refl_core::{DbError, DeclKind};
use thiserror::Error;

/// Errors that can occur while storing or loading a database file.
#[derive(Debug, Error)]
pub enum FileError {
    /// An I/O error occurred during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The file does not start with `b"REFL"`.
    #[error("invalid magic bytes (expected b\"REFL\")")]
    InvalidMagic,
    /// The format version is not supported by this build.
    #[error("unsupported format version {found}")]
    UnsupportedVersion {
        /// The version found in the file.
        found: u16,
    },
    /// The header declares a record size other than [`RECORD_SIZE`](crate::RECORD_SIZE).
    #[error("unsupported record size {found}")]
    BadRecordSize {
        /// The size found in the file.
        found: u16,
    },
    /// The stream ended inside a section.
    #[error("file truncated in {section}")]
    Truncated {
        /// Which section was being read.
        section: &'static str,
    },
    /// A record carries a kind tag outside the known set.
    #[error("record {index} has unknown kind tag {tag}")]
    UnknownKind {
        /// Record index.
        index: u32,
        /// The unrecognized tag.
        tag: u8,
    },
    /// A record carries attribute bits outside the known set.
    #[error("record {index} has unknown attribute bits {bits:#x}")]
    UnknownAttrs {
        /// Record index.
        index: u32,
        /// The full attribute word.
        bits: u32,
    },
    /// A reserved field is non-zero.
    #[error("reserved bytes at offset {offset} are not zero")]
    NonZeroReserved {
        /// Byte offset of the reserved field from the start of the file.
        offset: u64,
    },
    /// A record of a payload-less kind carries payload bytes.
    #[error("record {index} of kind {kind} carries a payload")]
    ForeignPayload {
        /// Record index.
        index: u32,
        /// The record's kind.
        kind: DeclKind,
    },
    /// The stored checksum does not match the sections read.
    #[error("checksum mismatch: stored={stored:#018x}, computed={computed:#018x}")]
    ChecksumMismatch {
        /// Checksum from the trailer.
        stored: u64,
        /// Checksum computed over the sections read.
        computed: u64,
    },
    /// Bytes follow the checksum trailer.
    #[error("trailing data after checksum")]
    TrailingData,
    /// The sections decoded but do not form a valid database.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl FileError {
    /// Re-label an unexpected end of stream as truncation of `section`.
    pub(crate) fn in_section(self, section: &'static str) -> Self {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Self::Truncated { section },
            other => other,
        }
    }
}
