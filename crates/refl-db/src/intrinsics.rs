//! The intrinsic type catalog and intrinsic lookup.

use refl_core::{DeclAttrs, DeclKind};

use crate::database::DeclDb;
use crate::handle::DeclRef;

/// One entry of the intrinsic catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntrinsicDef {
    /// Canonical name.
    pub name: &'static str,
    /// Classification flags.
    pub attrs: DeclAttrs,
    /// Width in bits.
    pub width: u64,
}

const fn def(name: &'static str, attrs: DeclAttrs, width: u64) -> IntrinsicDef {
    IntrinsicDef { name, attrs, width }
}

/// Built-in scalar types installed into every fresh database, in
/// installation order.
///
/// Catalog entries are not flagged top-level: they are built-ins, not
/// source declarations.
pub const INTRINSICS: &[IntrinsicDef] = &[
    def("void", DeclAttrs::VOID, 0),
    def("ptr", DeclAttrs::VOID, 64),
    def("bool", DeclAttrs::SINT, 1),
    def("i8", DeclAttrs::SINT, 8),
    def("u8", DeclAttrs::UINT, 8),
    def("i16", DeclAttrs::SINT, 16),
    def("u16", DeclAttrs::UINT, 16),
    def("i32", DeclAttrs::SINT, 32),
    def("u32", DeclAttrs::UINT, 32),
    def("i64", DeclAttrs::SINT, 64),
    def("u64", DeclAttrs::UINT, 64),
    def("i128", DeclAttrs::SINT, 128),
    def("u128", DeclAttrs::UINT, 128),
    def("f16", DeclAttrs::FLOAT, 16),
    def("f32", DeclAttrs::FLOAT, 32),
    def("f64", DeclAttrs::FLOAT, 64),
    def("f128", DeclAttrs::FLOAT, 128),
    def("complex64", DeclAttrs::CFLOAT, 64),
    def("complex128", DeclAttrs::CFLOAT, 128),
];

impl DeclDb {
    /// Find the first intrinsic, in index order, whose width is exactly
    /// `width` and whose flags include every flag in `attrs`.
    ///
    /// Returns the null handle when nothing matches.
    pub fn find_intrinsic(&self, attrs: DeclAttrs, width: u64) -> DeclRef<'_> {
        self.intrinsic_ids()
            .iter()
            .map(|&id| self.get(id))
            .find(|r| {
                r.kind() == DeclKind::Intrinsic
                    && r.intrinsic_width() == width
                    && r.attrs().contains(attrs)
            })
            .unwrap_or_else(|| self.null())
    }
}
