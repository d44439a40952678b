//! Binary encode/decode for the database file format.
//!
//! All integers are little-endian. Records are fixed-size, so the record
//! section needs no framing; the string pool is copied verbatim. No
//! compression, no alignment padding, no self-describing schema.

use std::io::{Read, Write};

use refl_core::{DeclAttrs, DeclId, DeclKind, DeclRecord, NameOffset, Payload};

use crate::error::FileError;
use crate::{FORMAT_VERSION, HEADER_SIZE, MAGIC, RECORD_SIZE};

// ── Primitives ──────────────────────────────────────────────────

/// Read exactly `N` bytes.
fn take<const N: usize>(r: &mut dyn Read) -> Result<[u8; N], FileError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn le_u16(r: &mut dyn Read) -> Result<u16, FileError> {
    take(r).map(u16::from_le_bytes)
}

fn le_u32(r: &mut dyn Read) -> Result<u32, FileError> {
    take(r).map(u32::from_le_bytes)
}

/// Read a little-endian u64, as used by the checksum trailer.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, FileError> {
    take(r).map(u64::from_le_bytes)
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), FileError> {
    Ok(w.write_all(&v.to_le_bytes())?)
}

// ── Header encode/decode ────────────────────────────────────────

/// The fixed-size file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Number of records, sentinel included.
    pub record_count: u32,
    /// String pool length in bytes.
    pub pool_len: u32,
    /// Index of the root record.
    pub root: u32,
}

/// Encode the file header.
pub fn encode_header(w: &mut dyn Write, header: &FileHeader) -> Result<(), FileError> {
    w.write_all(&MAGIC)?;
    w.write_all(&FORMAT_VERSION.to_le_bytes())?;
    w.write_all(&RECORD_SIZE.to_le_bytes())?;
    for word in [header.record_count, header.pool_len, header.root, 0] {
        w.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Decode and validate the file header.
pub fn decode_header(r: &mut dyn Read) -> Result<FileHeader, FileError> {
    if take::<4>(r)? != MAGIC {
        return Err(FileError::InvalidMagic);
    }

    let version = le_u16(r)?;
    if version != FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion { found: version });
    }
    let record_size = le_u16(r)?;
    if record_size != RECORD_SIZE {
        return Err(FileError::BadRecordSize { found: record_size });
    }

    let header = FileHeader {
        record_count: le_u32(r)?,
        pool_len: le_u32(r)?,
        root: le_u32(r)?,
    };
    if le_u32(r)? != 0 {
        return Err(FileError::NonZeroReserved {
            offset: HEADER_SIZE as u64 - 4,
        });
    }
    Ok(header)
}

// ── Record encode/decode ────────────────────────────────────────

/// Encode one record.
pub fn encode_record(w: &mut dyn Write, record: &DeclRecord) -> Result<(), FileError> {
    w.write_all(&[record.kind.as_u8(), 0, 0, 0])?;
    let words = [
        record.attrs.bits(),
        record.name.0,
        record.next.0,
        record.link.0,
        record.attr.0,
    ];
    for word in words {
        w.write_all(&word.to_le_bytes())?;
    }
    write_u64_le(w, record.payload.raw())
}

/// Decode the record at `index`.
///
/// Checks the tag, attribute bits, reserved bytes and payload shape.
/// Link ranges are checked once the whole arena is known.
pub fn decode_record(r: &mut dyn Read, index: u32) -> Result<DeclRecord, FileError> {
    let [tag, reserved @ ..] = take::<4>(r)?;
    let kind = DeclKind::from_u8(tag).ok_or(FileError::UnknownKind { index, tag })?;
    if reserved != [0u8; 3] {
        return Err(FileError::NonZeroReserved {
            offset: HEADER_SIZE as u64 + index as u64 * RECORD_SIZE as u64 + 1,
        });
    }

    let bits = le_u32(r)?;
    let attrs = DeclAttrs::from_bits(bits).ok_or(FileError::UnknownAttrs { index, bits })?;
    let name = NameOffset(le_u32(r)?);
    let next = DeclId(le_u32(r)?);
    let link = DeclId(le_u32(r)?);
    let attr = DeclId(le_u32(r)?);
    let raw = read_u64_le(r)?;
    let payload = Payload::from_raw(kind, raw).ok_or(FileError::ForeignPayload { index, kind })?;

    Ok(DeclRecord {
        kind,
        attrs,
        name,
        next,
        link,
        attr,
        payload,
    })
}
