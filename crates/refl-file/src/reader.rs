//! Database file reader.
//!
//! Loading is all-or-nothing: every section is read and checked, and the
//! database is only assembled once the checksum matches and the arena and
//! pool validate. A truncated stream is reported with the name of the
//! section it ended in.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use refl_core::DeclId;
use refl_db::DeclDb;

use crate::codec::{decode_header, decode_record, read_u64_le};
use crate::error::FileError;
use crate::hash::HashingReader;

/// Upper bound on records preallocated from an untrusted header.
const PREALLOC_RECORDS: usize = 4096;

/// Decode a database from `r`.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production code
/// can use `BufReader<File>`. The stream must end right after the
/// checksum.
pub fn read_db<R: Read>(mut r: R) -> Result<DeclDb, FileError> {
    let header = decode_header(&mut r).map_err(|e| e.in_section("header"))?;
    let count = header.record_count as usize;

    let mut hashed = HashingReader::new(&mut r);
    let mut records = Vec::with_capacity(count.min(PREALLOC_RECORDS));
    for index in 0..header.record_count {
        let record = decode_record(&mut hashed, index).map_err(|e| e.in_section("records"))?;
        records.push(record);
    }

    let mut pool = Vec::with_capacity((header.pool_len as usize).min(PREALLOC_RECORDS * 16));
    (&mut hashed)
        .take(header.pool_len as u64)
        .read_to_end(&mut pool)?;
    if pool.len() != header.pool_len as usize {
        return Err(FileError::Truncated { section: "strings" });
    }
    let computed = hashed.checksum();

    let stored = read_u64_le(&mut r).map_err(|e| e.in_section("checksum"))?;
    if stored != computed {
        return Err(FileError::ChecksumMismatch { stored, computed });
    }
    let mut extra = [0u8; 1];
    if r.read(&mut extra)? != 0 {
        return Err(FileError::TrailingData);
    }

    let db = DeclDb::from_raw_parts(records, pool, DeclId(header.root))?;
    tracing::debug!(
        records = db.len(),
        pool_bytes = db.pool_bytes().len(),
        "loaded declaration database"
    );
    Ok(db)
}

/// Load the database stored at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<DeclDb, FileError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "loading declaration database");
    read_db(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_db;
    use crate::HEADER_SIZE;
    use refl_core::{DbError, DeclAttrs, DeclKind};
    use refl_db::DeclBuilder;

    fn sample() -> DeclDb {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        b.begin_struct("pair").unwrap();
        b.field("x", int).unwrap();
        b.field("y", int).unwrap();
        b.close().unwrap();
        b.finish().unwrap();
        db
    }

    fn encoded(db: &DeclDb) -> Vec<u8> {
        let mut buf = Vec::new();
        write_db(&mut buf, db).unwrap();
        buf
    }

    /// Recompute the checksum trailer after patching the body.
    fn reseal(buf: &mut [u8]) {
        let end = buf.len() - 8;
        let sum = crate::hash::checksum(&buf[HEADER_SIZE..end]);
        buf[end..].copy_from_slice(&sum.to_le_bytes());
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let buf = encoded(&sample());
        let back = read_db(buf.as_slice()).unwrap();
        assert_eq!(encoded(&back), buf);
        let pair = back.root();
        assert_eq!(pair.name(), "pair");
        assert_eq!(pair.struct_fields(None), Ok(2));
        assert_eq!(pair.type_width(), 64);
    }

    #[test]
    fn loaded_db_finds_intrinsics() {
        let back = read_db(encoded(&sample()).as_slice()).unwrap();
        let i32_ = back.find_intrinsic(DeclAttrs::SINT, 32);
        assert_eq!(i32_.name(), "i32");
        assert_eq!(i32_.kind(), DeclKind::Intrinsic);
    }

    #[test]
    fn truncation_names_section() {
        let buf = encoded(&sample());
        let records_end = buf.len() - 8 - sample().pool_bytes().len();
        for (cut, section) in [
            (10, "header"),
            (HEADER_SIZE + 5, "records"),
            (records_end + 1, "strings"),
            (buf.len() - 3, "checksum"),
        ] {
            match read_db(&buf[..cut]) {
                Err(FileError::Truncated { section: s }) => assert_eq!(s, section, "cut at {cut}"),
                other => panic!("cut at {cut}: expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn corrupted_body_fails_checksum() {
        let mut buf = encoded(&sample());
        let last_pool_byte = buf.len() - 10;
        buf[last_pool_byte] ^= 0x20;
        assert!(matches!(
            read_db(buf.as_slice()),
            Err(FileError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut buf = encoded(&sample());
        buf.push(0);
        assert!(matches!(read_db(buf.as_slice()), Err(FileError::TrailingData)));
    }

    #[test]
    fn dangling_link_rejected_after_checksum() {
        let mut buf = encoded(&sample());
        // `link` of record 1 lives at offset 16 within the record.
        let at = HEADER_SIZE + 32 + 16;
        buf[at..at + 4].copy_from_slice(&9999u32.to_le_bytes());
        reseal(&mut buf);
        assert!(matches!(
            read_db(buf.as_slice()),
            Err(FileError::Db(DbError::DanglingReference { field: "link", .. }))
        ));
    }

    #[test]
    fn non_zero_sentinel_rejected() {
        let mut buf = encoded(&sample());
        buf[HEADER_SIZE + 8] = 1;
        reseal(&mut buf);
        assert!(matches!(
            read_db(buf.as_slice()),
            Err(FileError::Db(DbError::Corrupt { .. }))
        ));
    }

    #[test]
    fn non_utf8_name_rejected() {
        let mut buf = encoded(&sample());
        let last_name_byte = buf.len() - 10;
        buf[last_name_byte] = 0xff;
        reseal(&mut buf);
        assert!(matches!(
            read_db(buf.as_slice()),
            Err(FileError::Db(DbError::Corrupt { .. }))
        ));
    }

    #[test]
    fn zero_records_rejected() {
        let mut buf = Vec::new();
        crate::codec::encode_header(
            &mut buf,
            &crate::codec::FileHeader {
                record_count: 0,
                pool_len: 1,
                root: 0,
            },
        )
        .unwrap();
        buf.push(0);
        buf.extend_from_slice(&crate::hash::checksum(&[0]).to_le_bytes());
        assert!(matches!(
            read_db(buf.as_slice()),
            Err(FileError::Db(DbError::Corrupt { .. }))
        ));
    }

    #[test]
    fn huge_count_does_not_preallocate() {
        let mut buf = encoded(&DeclDb::empty());
        buf[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(read_db(buf.as_slice()).is_err());
    }
}
