//! The declaration attribute bitset.

use std::fmt;

bitflags::bitflags! {
    /// Attribute flags carried by every declaration record.
    ///
    /// The numeric classification bits (`VOID`, `SINT`, `UINT`, `FLOAT`,
    /// `CFLOAT`) describe intrinsics; the qualifier bits describe the use
    /// of a type at a typedef, field or parameter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct DeclAttrs: u32 {
        /// Declared at the outermost scope of its source unit.
        const TOP = 1 << 0;
        /// No value (void, or an untyped pointer-sized intrinsic).
        const VOID = 1 << 1;
        /// Signed integer.
        const SINT = 1 << 2;
        /// Unsigned integer.
        const UINT = 1 << 3;
        /// Binary floating point.
        const FLOAT = 1 << 4;
        /// Complex floating point.
        const CFLOAT = 1 << 5;
        /// `const` qualified.
        const CONST = 1 << 6;
        /// `volatile` qualified.
        const VOLATILE = 1 << 7;
        /// `restrict` qualified.
        const RESTRICT = 1 << 8;
        /// Field with an explicit bit width.
        const BITFIELD = 1 << 9;
        /// Output (return) parameter.
        const OUT = 1 << 10;
    }
}

impl DeclAttrs {
    /// Space-separated lowercase flag names, or `-` when empty.
    pub fn describe(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DeclAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
