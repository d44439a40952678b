//! Benchmark profiles for the refl declaration database.
//!
//! Provides deterministic, pre-built databases for benchmarking:
//!
//! - [`header_profile`]: `n` structs of `fields` scalar members each, the
//!   shape a large C header produces
//! - [`FIELD_TYPES`]: the rotation of intrinsic types the fields use

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use refl_core::{DbError, DeclAttrs};
use refl_db::{DeclBuilder, DeclDb};

/// `(flags, width)` of the intrinsic types assigned to fields in turn.
pub const FIELD_TYPES: [(DeclAttrs, u64); 8] = [
    (DeclAttrs::SINT, 8),
    (DeclAttrs::UINT, 16),
    (DeclAttrs::SINT, 32),
    (DeclAttrs::UINT, 64),
    (DeclAttrs::FLOAT, 32),
    (DeclAttrs::FLOAT, 64),
    (DeclAttrs::VOID, 64),
    (DeclAttrs::SINT, 1),
];

/// Build `structs` top-level structs with `fields` members each.
///
/// Every struct also gets one typedef alias, so top-level type queries
/// see `2 * structs` results.
pub fn header_profile(structs: usize, fields: usize) -> Result<DeclDb, DbError> {
    let mut db = DeclDb::new()?;
    let mut b = DeclBuilder::new(&mut db);
    for s in 0..structs {
        let id = b.begin_struct(&format!("struct_{s}"))?;
        for f in 0..fields {
            let (attrs, width) = FIELD_TYPES[(s + f) % FIELD_TYPES.len()];
            let ty = b.intrinsic(attrs, width)?;
            b.field(&format!("field_{f}"), ty)?;
        }
        b.close()?;
        b.typedef(&format!("struct_{s}_t"), id)?;
    }
    b.finish()?;
    Ok(db)
}
