//! Reference handles and kind-guarded accessors.
//!
//! A [`DeclRef`] pairs a borrowed database with a record index. It is the
//! only way callers read the graph. Every accessor checks the record's kind
//! first and yields a zero or null value on mismatch; none of them fail.

use std::fmt;

use refl_core::{DeclAttrs, DeclId, DeclKind, DeclRecord};

use crate::database::DeclDb;
use crate::layout;

/// A (database, index) pair identifying one declaration record.
///
/// Index 0 is the null handle: it reads as the zero record, matches no
/// predicate and resolves every link to itself.
#[derive(Clone, Copy)]
pub struct DeclRef<'db> {
    db: &'db DeclDb,
    id: DeclId,
}

impl<'db> DeclRef<'db> {
    pub(crate) fn new(db: &'db DeclDb, id: DeclId) -> Self {
        Self { db, id }
    }

    /// The owning database.
    pub fn db(&self) -> &'db DeclDb {
        self.db
    }

    /// The record index.
    pub fn id(&self) -> DeclId {
        self.id
    }

    /// Whether this is the null handle.
    pub fn is_null(&self) -> bool {
        self.id.is_null()
    }

    /// The underlying record.
    pub fn record(&self) -> &'db DeclRecord {
        self.db.record(self.id)
    }

    /// A handle to another record of the same database.
    pub fn lookup(&self, id: DeclId) -> DeclRef<'db> {
        self.db.get(id)
    }

    // ── Generic fields ──────────────────────────────────────────

    /// Kind tag. `Void` for the null handle.
    pub fn kind(&self) -> DeclKind {
        self.record().kind
    }

    /// Attribute flags.
    pub fn attrs(&self) -> DeclAttrs {
        self.record().attrs
    }

    /// Name, or the empty string if unnamed.
    pub fn name(&self) -> &'db str {
        self.db.resolve(self.record().name)
    }

    /// Next sibling.
    pub fn next(&self) -> DeclRef<'db> {
        self.lookup(self.record().next)
    }

    /// Raw link: child-list head or referenced type depending on kind.
    pub fn link(&self) -> DeclRef<'db> {
        self.lookup(self.record().link)
    }

    /// Head of the attribute annotation list.
    pub fn attr_head(&self) -> DeclRef<'db> {
        self.lookup(self.record().attr)
    }

    // ── Classification ──────────────────────────────────────────

    fn is(&self, kind: DeclKind) -> bool {
        !self.is_null() && self.kind() == kind
    }

    /// Carries the top-level flag.
    pub fn is_top(&self) -> bool {
        self.attrs().contains(DeclAttrs::TOP)
    }

    /// Denotes a type rather than a value-bearing declaration.
    pub fn is_type(&self) -> bool {
        self.kind().is_type()
    }

    /// Is a typedef.
    pub fn is_typedef(&self) -> bool {
        self.is(DeclKind::Typedef)
    }

    /// Is an intrinsic.
    pub fn is_intrinsic(&self) -> bool {
        self.is(DeclKind::Intrinsic)
    }

    /// Is a set.
    pub fn is_set(&self) -> bool {
        self.is(DeclKind::Set)
    }

    /// Is an enum.
    pub fn is_enum(&self) -> bool {
        self.is(DeclKind::Enum)
    }

    /// Is a struct.
    pub fn is_struct(&self) -> bool {
        self.is(DeclKind::Struct)
    }

    /// Is a union.
    pub fn is_union(&self) -> bool {
        self.is(DeclKind::Union)
    }

    /// Is a field.
    pub fn is_field(&self) -> bool {
        self.is(DeclKind::Field)
    }

    /// Is an array.
    pub fn is_array(&self) -> bool {
        self.is(DeclKind::Array)
    }

    /// Is a constant.
    pub fn is_constant(&self) -> bool {
        self.is(DeclKind::Constant)
    }

    /// Is a variable.
    pub fn is_variable(&self) -> bool {
        self.is(DeclKind::Variable)
    }

    /// Is a uniform.
    pub fn is_uniform(&self) -> bool {
        self.is(DeclKind::Uniform)
    }

    /// Is a function.
    pub fn is_function(&self) -> bool {
        self.is(DeclKind::Function)
    }

    /// Is a parameter.
    pub fn is_param(&self) -> bool {
        self.is(DeclKind::Param)
    }

    /// Is an attribute annotation.
    pub fn is_attribute(&self) -> bool {
        self.is(DeclKind::Attribute)
    }

    /// Is an attribute value.
    pub fn is_value(&self) -> bool {
        self.is(DeclKind::Value)
    }

    /// Is a pointer.
    pub fn is_pointer(&self) -> bool {
        self.is(DeclKind::Pointer)
    }

    // ── Referenced types ────────────────────────────────────────

    fn link_if(&self, kind: DeclKind) -> DeclRef<'db> {
        if self.is(kind) {
            self.link()
        } else {
            self.db.null()
        }
    }

    /// Aliased type of a typedef.
    pub fn typedef_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Typedef)
    }

    /// Element type of an array.
    pub fn array_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Array)
    }

    /// Type of a constant.
    pub fn constant_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Constant)
    }

    /// Type of a variable.
    pub fn variable_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Variable)
    }

    /// Type of a uniform.
    pub fn uniform_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Uniform)
    }

    /// Type of a parameter.
    pub fn param_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Param)
    }

    /// Type of a field.
    pub fn field_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Field)
    }

    /// Pointee of a pointer.
    pub fn pointer_type(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Pointer)
    }

    /// Value attached to an attribute annotation.
    pub fn attribute_value(&self) -> DeclRef<'db> {
        self.link_if(DeclKind::Attribute)
    }

    // ── Payload ─────────────────────────────────────────────────

    /// Width of an intrinsic, in bits.
    pub fn intrinsic_width(&self) -> u64 {
        if self.is_intrinsic() {
            self.record().width()
        } else {
            0
        }
    }

    /// Width of a pointer, in bits.
    pub fn pointer_width(&self) -> u64 {
        if self.is_pointer() {
            self.record().width()
        } else {
            0
        }
    }

    /// Width of an enum or set, in bits.
    pub fn enum_width(&self) -> u64 {
        if self.is_enum() || self.is_set() {
            self.record().width()
        } else {
            0
        }
    }

    /// Declared bit-field width of a field; 0 for ordinary fields.
    pub fn field_width(&self) -> u64 {
        if self.is_field() {
            self.record().width()
        } else {
            0
        }
    }

    /// Element count of an array. 0 for incomplete arrays.
    pub fn array_count(&self) -> u64 {
        if self.is_array() {
            self.record().count()
        } else {
            0
        }
    }

    /// Alias of [`array_count`](Self::array_count).
    pub fn array_size(&self) -> u64 {
        self.array_count()
    }

    /// Value of a constant.
    pub fn constant_value(&self) -> i64 {
        if self.is_constant() {
            self.record().value()
        } else {
            0
        }
    }

    /// Integer argument of an attribute value.
    pub fn value_int(&self) -> i64 {
        if self.is_value() {
            self.record().value()
        } else {
            0
        }
    }

    /// Address of a variable.
    pub fn variable_address(&self) -> u64 {
        if self.is_variable() {
            self.record().address()
        } else {
            0
        }
    }

    /// Address of a uniform.
    pub fn uniform_address(&self) -> u64 {
        if self.is_uniform() {
            self.record().address()
        } else {
            0
        }
    }

    /// Address of a function.
    pub fn function_address(&self) -> u64 {
        if self.is_function() {
            self.record().address()
        } else {
            0
        }
    }

    // ── Layout ──────────────────────────────────────────────────

    /// Width in bits of the type this record denotes. See [`crate::layout`].
    pub fn type_width(&self) -> u64 {
        layout::width(*self)
    }

    /// Alignment in bits of the type this record denotes.
    pub fn type_align(&self) -> u64 {
        layout::align(*self)
    }
}

impl PartialEq for DeclRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.db.id() == other.db.id() && self.id == other.id
    }
}

impl Eq for DeclRef<'_> {}

impl fmt::Debug for DeclRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeclRef({}, {}, {} {:?})",
            self.db.id(),
            self.id,
            self.kind(),
            self.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DeclDb, DeclId, DeclId) {
        let mut db = DeclDb::new().unwrap();
        let int = db.find_intrinsic(DeclAttrs::SINT, 32).id();
        let arr = db.allocate(DeclKind::Array, DeclAttrs::empty()).unwrap();
        db.set_link(arr, int).unwrap();
        db.set_count(arr, 4).unwrap();
        let var = db.allocate(DeclKind::Variable, DeclAttrs::TOP).unwrap();
        db.set_name(var, "counts").unwrap();
        db.set_link(var, arr).unwrap();
        db.set_address(var, 0x1000).unwrap();
        (db, arr, var)
    }

    #[test]
    fn null_handle_is_absent_everywhere() {
        let db = DeclDb::new().unwrap();
        let null = db.null();
        assert!(null.is_null());
        assert_eq!(null.kind(), DeclKind::Void);
        assert_eq!(null.name(), "");
        assert!(null.next().is_null());
        assert!(null.link().is_null());
        assert!(!null.is_top());
        assert!(!null.is_type());
        assert!(!null.is_struct());
        assert!(null.typedef_type().is_null());
        assert_eq!(null.type_width(), 0);
        assert_eq!(null.array_count(), 0);
        assert_eq!(null.constant_value(), 0);
    }

    #[test]
    fn kind_guarded_accessors() {
        let (db, arr, var) = sample();
        let arr = db.get(arr);
        let var = db.get(var);

        assert_eq!(arr.array_count(), 4);
        assert_eq!(var.array_count(), 0);
        assert_eq!(var.variable_address(), 0x1000);
        assert_eq!(var.function_address(), 0);
        assert_eq!(var.variable_type(), arr);
        assert!(var.uniform_type().is_null());
        assert!(var.typedef_type().is_null());
        assert_eq!(arr.array_type().intrinsic_width(), 32);
        assert_eq!(arr.type_width(), 128);
    }

    #[test]
    fn handles_from_different_dbs_differ() {
        let a = DeclDb::new().unwrap();
        let b = DeclDb::new().unwrap();
        assert_eq!(a.get(DeclId(1)), a.get(DeclId(1)));
        assert_ne!(a.get(DeclId(1)), b.get(DeclId(1)));
    }

    #[test]
    fn unknown_ids_become_null() {
        let db = DeclDb::empty();
        assert!(db.get(DeclId(77)).is_null());
    }
}
