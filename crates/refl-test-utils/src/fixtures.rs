//! Prebuilt declaration graphs.
//!
//! - [`adjacent_structs`]: two structs declared back to back whose fields
//!   cover every integer, float and pointer-sized intrinsic.
//! - [`kitchen_sink`]: one of every kind, nested containers, bit-fields
//!   and attribute annotations.

use refl_core::{DeclAttrs, DeclId};
use refl_db::{DeclBuilder, DeclDb};

/// `(name, intrinsic flags, width)` of the first struct's fields.
pub const FIRST_FIELDS: [(&str, DeclAttrs, u64); 6] = [
    ("a", DeclAttrs::SINT, 1),
    ("b", DeclAttrs::SINT, 8),
    ("bu", DeclAttrs::UINT, 8),
    ("h", DeclAttrs::SINT, 16),
    ("hu", DeclAttrs::UINT, 16),
    ("w", DeclAttrs::SINT, 32),
];

/// `(name, intrinsic flags, width)` of the second struct's fields.
pub const SECOND_FIELDS: [(&str, DeclAttrs, u64); 6] = [
    ("wu", DeclAttrs::UINT, 32),
    ("d", DeclAttrs::SINT, 64),
    ("du", DeclAttrs::UINT, 64),
    ("f", DeclAttrs::FLOAT, 32),
    ("g", DeclAttrs::FLOAT, 64),
    ("p", DeclAttrs::VOID, 64),
];

/// Ids of the two structs built by [`adjacent_structs`].
#[derive(Clone, Copy, Debug)]
pub struct AdjacentStructs {
    pub first: DeclId,
    pub second: DeclId,
}

/// Two adjacent structs, `s1` with [`FIRST_FIELDS`] and `s2` with
/// [`SECOND_FIELDS`], each field typed by the matching catalog intrinsic.
pub fn adjacent_structs() -> (DeclDb, AdjacentStructs) {
    let mut db = DeclDb::new().expect("default config is valid");
    let mut b = DeclBuilder::new(&mut db);
    let first = build_struct(&mut b, "s1", &FIRST_FIELDS);
    let second = build_struct(&mut b, "s2", &SECOND_FIELDS);
    b.finish().expect("all containers closed");
    (db, AdjacentStructs { first, second })
}

fn build_struct(b: &mut DeclBuilder<'_>, name: &str, fields: &[(&str, DeclAttrs, u64)]) -> DeclId {
    let id = b.begin_struct(name).expect("declare struct");
    for &(field, attrs, width) in fields {
        let ty = b.intrinsic(attrs, width).expect("intrinsic");
        b.field(field, ty).expect("declare field");
    }
    b.close().expect("close struct");
    id
}

/// A graph touching every record kind.
///
/// Top level, in order: `u8_t` typedef, `mode` enum, `perms` set, `header`
/// struct (with a nested union and a member of it, a bit-field run, an array and a pointer
/// member), `limit` constant, `counter` variable, `tint` uniform and the
/// `hash` function. `header` carries `packed`, `aligned(16)` and
/// `section("data")` annotations.
pub fn kitchen_sink() -> DeclDb {
    let mut db = DeclDb::new().expect("default config is valid");
    build_kitchen_sink(&mut db).expect("kitchen sink builds");
    db
}

fn build_kitchen_sink(db: &mut DeclDb) -> Result<(), refl_core::DbError> {
    let mut b = DeclBuilder::new(db);
    let u8_ = b.intrinsic(DeclAttrs::UINT, 8)?;
    let i32_ = b.intrinsic(DeclAttrs::SINT, 32)?;
    let u32_ = b.intrinsic(DeclAttrs::UINT, 32)?;
    let f32_ = b.intrinsic(DeclAttrs::FLOAT, 32)?;
    let u64_ = b.intrinsic(DeclAttrs::UINT, 64)?;

    let u8_t = b.typedef("u8_t", u8_)?;

    b.begin_enum("mode", 32)?;
    b.constant("MODE_OFF", i32_, 0)?;
    b.constant("MODE_ON", i32_, 1)?;
    b.constant("MODE_AUTO", i32_, -1)?;
    b.close()?;

    b.begin_set("perms", 8)?;
    b.constant("READ", u8_, 1)?;
    b.constant("WRITE", u8_, 2)?;
    b.constant("EXEC", u8_, 4)?;
    b.close()?;

    let header = b.begin_struct("header")?;
    b.field("tag", u8_t)?;
    let value = b.begin_union("value_u")?;
    b.field("i", i32_)?;
    b.field("f", f32_)?;
    b.close()?;
    b.field("value", value)?;
    b.bitfield("kind", u32_, 4)?;
    b.bitfield("flags", u32_, 12)?;
    b.bitfield("", u32_, 0)?;
    b.bitfield("len", u32_, 16)?;
    let bytes = b.array(u8_, 8)?;
    b.field("bytes", bytes)?;
    let next = b.pointer(header)?;
    b.field("next", next)?;
    b.close()?;
    b.attribute(header, "packed")?;
    b.attribute_int(header, "aligned", 16)?;
    b.attribute_str(header, "section", "data")?;

    b.constant("limit", u32_, 4096)?;
    b.variable("counter", u64_, 0x2000)?;
    b.uniform("tint", f32_, 0x40)?;

    let hash = b.function("hash", u64_)?;
    let cbytes = b.pointer(u8_)?;
    b.param("data", cbytes)?;
    b.param("len", u64_)?;
    b.close()?;
    b.attribute_str(hash, "visibility", "default")?;

    b.finish()
}
