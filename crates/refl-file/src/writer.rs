//! Database file writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use refl_db::DeclDb;

use crate::codec::{encode_header, encode_record, write_u64_le, FileHeader};
use crate::error::FileError;
use crate::hash::HashingWriter;
use crate::{HEADER_SIZE, RECORD_SIZE};

/// Encode `db` to `w` and return the number of bytes written.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use refl_db::DeclDb;
/// use refl_file::{read_db, write_db};
///
/// let db = DeclDb::new().unwrap();
/// let mut buf = Vec::new();
/// let n = write_db(&mut buf, &db).unwrap();
/// assert_eq!(n as usize, buf.len());
///
/// let back = read_db(buf.as_slice()).unwrap();
/// assert_eq!(back.records(), db.records());
/// ```
pub fn write_db<W: Write>(mut w: W, db: &DeclDb) -> Result<u64, FileError> {
    let records = db.records();
    let pool = db.pool_bytes();
    let header = FileHeader {
        record_count: records.len() as u32,
        pool_len: pool.len() as u32,
        root: db.root().id().0,
    };
    encode_header(&mut w, &header)?;

    let mut hashed = HashingWriter::new(&mut w);
    for record in records {
        encode_record(&mut hashed, record)?;
    }
    hashed.write_all(pool)?;
    let sum = hashed.checksum();
    write_u64_le(&mut w, sum)?;
    w.flush()?;

    let bytes = HEADER_SIZE as u64 + records.len() as u64 * RECORD_SIZE as u64 + pool.len() as u64 + 8;
    tracing::debug!(
        records = records.len(),
        pool_bytes = pool.len(),
        bytes,
        "stored declaration database"
    );
    Ok(bytes)
}

/// Write `db` to the file at `path`, replacing it if it exists.
pub fn save(path: impl AsRef<Path>, db: &DeclDb) -> Result<u64, FileError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let bytes = write_db(BufWriter::new(file), db)?;
    tracing::debug!(path = %path.display(), bytes, "saved declaration database");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::checksum;
    use refl_core::DeclAttrs;
    use refl_db::DeclBuilder;
    use refl_test_utils::FailingWriter;

    #[test]
    fn empty_db_is_header_sentinel_pool_and_trailer() {
        let db = DeclDb::empty();
        let mut buf = Vec::new();
        let n = write_db(&mut buf, &db).unwrap();
        assert_eq!(n, 24 + 32 + 1 + 8);
        assert_eq!(buf.len() as u64, n);
        let body = &buf[HEADER_SIZE..buf.len() - 8];
        let trailer = u64::from_le_bytes(buf[buf.len() - 8..].try_into().unwrap());
        assert_eq!(trailer, checksum(body));
    }

    #[test]
    fn header_records_root() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let t = b.typedef("t", int).unwrap();
        b.finish().unwrap();

        let mut buf = Vec::new();
        write_db(&mut buf, &db).unwrap();
        assert_eq!(&buf[16..20], &t.0.to_le_bytes());
        assert_eq!(&buf[8..12], &(db.len() as u32).to_le_bytes());
    }

    #[test]
    fn io_failure_propagates() {
        let db = DeclDb::new().unwrap();
        let mut sink = FailingWriter::new(40);
        assert!(matches!(write_db(&mut sink, &db), Err(FileError::Io(_))));
        assert_eq!(sink.written.len(), 40);
    }
}
