//! Explicit construction state for producers.
//!
//! A producer walking a source tree needs two pieces of running state to
//! thread the graph: the most recently declared record (whose `next` the
//! following sibling fills) and the stack of open containers (whose `link`
//! the first child fills). [`DeclBuilder`] holds both, so nothing is
//! process-global and several databases can be built side by side.
//!
//! Types that are referenced but never declared in a scope (pointers,
//! arrays, attribute values) are created *detached*: allocated without
//! touching any sibling list.

use smallvec::SmallVec;

use refl_core::{DbError, DeclAttrs, DeclId, DeclKind};

use crate::database::DeclDb;

/// Default pointer width in bits.
pub const POINTER_WIDTH: u64 = 64;

/// Threads declarations into a [`DeclDb`] in encounter order.
///
/// # Examples
///
/// ```
/// use refl_db::{DeclBuilder, DeclDb};
/// use refl_core::DeclAttrs;
///
/// let mut db = DeclDb::new().unwrap();
/// let mut b = DeclBuilder::new(&mut db);
/// let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
/// b.begin_struct("point").unwrap();
/// b.field("x", int).unwrap();
/// b.field("y", int).unwrap();
/// b.close().unwrap();
/// b.finish().unwrap();
///
/// let point = db.root();
/// assert_eq!(point.name(), "point");
/// assert_eq!(point.struct_fields(None), Ok(2));
/// assert_eq!(point.type_width(), 64);
/// ```
pub struct DeclBuilder<'db> {
    db: &'db mut DeclDb,
    last: DeclId,
    stack: SmallVec<[Scope; 16]>,
}

/// An open container and the insertion point to restore when it closes.
#[derive(Clone, Copy, Debug)]
struct Scope {
    container: DeclId,
    resume: DeclId,
}

impl<'db> DeclBuilder<'db> {
    /// Start building into `db` at the top level.
    ///
    /// New top-level declarations follow any already in `db`.
    pub fn new(db: &'db mut DeclDb) -> Self {
        let root = db.root().id();
        let last = tail(db, root);
        Self {
            db,
            last,
            stack: SmallVec::new(),
        }
    }

    /// Read access to the database under construction.
    pub fn db(&self) -> &DeclDb {
        &*self.db
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open container, or null at the top level.
    pub fn current(&self) -> DeclId {
        self.stack.last().map_or(DeclId::NULL, |s| s.container)
    }

    /// The most recently threaded record in the current scope.
    pub fn last(&self) -> DeclId {
        self.last
    }

    // ── Scoping ─────────────────────────────────────────────────

    /// Declare a record in the current scope.
    ///
    /// At depth 0 the record gets [`DeclAttrs::TOP`] and joins the
    /// top-level sibling list; the first such record becomes the root.
    /// Inside a container it joins that container's child list.
    pub fn declare(&mut self, kind: DeclKind, attrs: DeclAttrs, name: &str) -> Result<DeclId, DbError> {
        let attrs = if self.stack.is_empty() {
            attrs | DeclAttrs::TOP
        } else {
            attrs
        };
        let id = self.db.allocate(kind, attrs)?;
        if !name.is_empty() {
            self.db.set_name(id, name)?;
        }
        self.thread(id)?;
        Ok(id)
    }

    fn thread(&mut self, id: DeclId) -> Result<(), DbError> {
        let (holder, field, linked) = if !self.last.is_null() {
            (self.last, "next", self.db.set_next(self.last, id)?)
        } else if let Some(scope) = self.stack.last() {
            let parent = scope.container;
            (parent, "link", self.db.set_link(parent, id)?)
        } else {
            (DeclId::NULL, "root", self.db.set_root(id)?)
        };
        if !linked {
            return Err(DbError::AlreadyLinked { id: holder, field });
        }
        self.last = id;
        Ok(())
    }

    /// Enter `container`; following declarations become its children.
    ///
    /// Reopening a container appends after its existing children.
    pub fn open(&mut self, container: DeclId) -> Result<(), DbError> {
        let found = self.db.get(container).kind();
        if !self.db.contains(container) {
            return Err(DbError::UnknownDecl {
                id: container,
                len: self.db.len(),
            });
        }
        if !found.is_container() {
            return Err(DbError::KindMismatch {
                id: container,
                expected: "enum, set, struct, union or function",
                found,
            });
        }
        self.stack.push(Scope {
            container,
            resume: self.last,
        });
        let head = self.db.record(container).link;
        self.last = tail(self.db, head);
        Ok(())
    }

    /// Leave the innermost container and return it.
    ///
    /// The enclosing scope resumes where it was when the container was
    /// opened. For a container declared and opened in one step that is the
    /// container itself, so the next declaration follows it as a sibling.
    pub fn close(&mut self) -> Result<DeclId, DbError> {
        let scope = self.stack.pop().ok_or(DbError::NoOpenContainer)?;
        self.last = scope.resume;
        Ok(scope.container)
    }

    /// End construction, checking that every container was closed.
    pub fn finish(self) -> Result<(), DbError> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(DbError::UnclosedContainer {
                depth: self.stack.len(),
            })
        }
    }

    // ── Detached types ──────────────────────────────────────────

    /// A scalar type: the catalog entry if one matches, else a new record.
    pub fn intrinsic(&mut self, attrs: DeclAttrs, width: u64) -> Result<DeclId, DbError> {
        let found = self.db.find_intrinsic(attrs, width);
        if !found.is_null() {
            return Ok(found.id());
        }
        let id = self.db.allocate(DeclKind::Intrinsic, attrs)?;
        self.db.set_width(id, width)?;
        let prefix = if attrs.contains(DeclAttrs::FLOAT) {
            "f"
        } else if attrs.contains(DeclAttrs::CFLOAT) {
            "complex"
        } else if attrs.contains(DeclAttrs::UINT) {
            "u"
        } else if attrs.contains(DeclAttrs::SINT) {
            "i"
        } else {
            "void"
        };
        self.db.set_name(id, &format!("{prefix}{width}"))?;
        Ok(id)
    }

    /// A pointer to `target`, [`POINTER_WIDTH`] bits wide.
    pub fn pointer(&mut self, target: DeclId) -> Result<DeclId, DbError> {
        self.pointer_with_width(target, POINTER_WIDTH)
    }

    /// A pointer to `target` with an explicit width.
    pub fn pointer_with_width(&mut self, target: DeclId, width: u64) -> Result<DeclId, DbError> {
        let name = format!("{}*", self.db.get(target).name());
        let id = self.db.allocate(DeclKind::Pointer, DeclAttrs::empty())?;
        self.db.set_name(id, &name)?;
        self.db.set_width(id, width)?;
        if !target.is_null() {
            self.db.set_link(id, target)?;
        }
        Ok(id)
    }

    /// An array of `count` elements of `elem`; 0 for an incomplete array.
    pub fn array(&mut self, elem: DeclId, count: u64) -> Result<DeclId, DbError> {
        let elem_name = self.db.get(elem).name();
        let name = if count == 0 {
            format!("{elem_name}[]")
        } else {
            format!("{elem_name}[{count}]")
        };
        let id = self.db.allocate(DeclKind::Array, DeclAttrs::empty())?;
        self.db.set_name(id, &name)?;
        self.db.set_count(id, count)?;
        self.db.set_link(id, elem)?;
        Ok(id)
    }

    // ── Declarations ────────────────────────────────────────────

    fn declare_linked(
        &mut self,
        kind: DeclKind,
        attrs: DeclAttrs,
        name: &str,
        target: DeclId,
    ) -> Result<DeclId, DbError> {
        let id = self.declare(kind, attrs, name)?;
        if !target.is_null() {
            self.db.set_link(id, target)?;
        }
        Ok(id)
    }

    /// A type alias of `target`.
    pub fn typedef(&mut self, name: &str, target: DeclId) -> Result<DeclId, DbError> {
        self.declare_linked(DeclKind::Typedef, DeclAttrs::empty(), name, target)
    }

    /// A struct or union member of type `ty`.
    pub fn field(&mut self, name: &str, ty: DeclId) -> Result<DeclId, DbError> {
        self.declare_linked(DeclKind::Field, DeclAttrs::empty(), name, ty)
    }

    /// A bit-field member `bits` wide, stored in units of `ty`.
    pub fn bitfield(&mut self, name: &str, ty: DeclId, bits: u64) -> Result<DeclId, DbError> {
        let id = self.declare_linked(DeclKind::Field, DeclAttrs::BITFIELD, name, ty)?;
        self.db.set_width(id, bits)?;
        Ok(id)
    }

    /// A named constant; inside an enum or set this is an enumerator.
    pub fn constant(&mut self, name: &str, ty: DeclId, value: i64) -> Result<DeclId, DbError> {
        let id = self.declare_linked(DeclKind::Constant, DeclAttrs::empty(), name, ty)?;
        self.db.set_value(id, value)?;
        Ok(id)
    }

    /// A variable of type `ty` at `address`.
    pub fn variable(&mut self, name: &str, ty: DeclId, address: u64) -> Result<DeclId, DbError> {
        let id = self.declare_linked(DeclKind::Variable, DeclAttrs::empty(), name, ty)?;
        self.db.set_address(id, address)?;
        Ok(id)
    }

    /// A uniform of type `ty` at `address`.
    pub fn uniform(&mut self, name: &str, ty: DeclId, address: u64) -> Result<DeclId, DbError> {
        let id = self.declare_linked(DeclKind::Uniform, DeclAttrs::empty(), name, ty)?;
        self.db.set_address(id, address)?;
        Ok(id)
    }

    /// A function parameter of type `ty`.
    pub fn param(&mut self, name: &str, ty: DeclId) -> Result<DeclId, DbError> {
        self.declare_linked(DeclKind::Param, DeclAttrs::empty(), name, ty)
    }

    /// The unnamed return slot of the open function.
    pub fn return_param(&mut self, ty: DeclId) -> Result<DeclId, DbError> {
        self.declare_linked(DeclKind::Param, DeclAttrs::OUT, "", ty)
    }

    // ── Containers ──────────────────────────────────────────────

    fn begin(&mut self, kind: DeclKind, name: &str) -> Result<DeclId, DbError> {
        let id = self.declare(kind, DeclAttrs::empty(), name)?;
        self.open(id)?;
        Ok(id)
    }

    /// Declare and open a struct.
    pub fn begin_struct(&mut self, name: &str) -> Result<DeclId, DbError> {
        self.begin(DeclKind::Struct, name)
    }

    /// Declare and open a union.
    pub fn begin_union(&mut self, name: &str) -> Result<DeclId, DbError> {
        self.begin(DeclKind::Union, name)
    }

    /// Declare and open an enum whose storage is `width` bits.
    pub fn begin_enum(&mut self, name: &str, width: u64) -> Result<DeclId, DbError> {
        let id = self.begin(DeclKind::Enum, name)?;
        self.db.set_width(id, width)?;
        Ok(id)
    }

    /// Declare and open a flag set whose storage is `width` bits.
    pub fn begin_set(&mut self, name: &str, width: u64) -> Result<DeclId, DbError> {
        let id = self.begin(DeclKind::Set, name)?;
        self.db.set_width(id, width)?;
        Ok(id)
    }

    /// Declare and open a function returning `ret`.
    ///
    /// The return slot is created as the first child; parameters declared
    /// next follow it.
    pub fn function(&mut self, name: &str, ret: DeclId) -> Result<DeclId, DbError> {
        let id = self.begin(DeclKind::Function, name)?;
        self.return_param(ret)?;
        Ok(id)
    }

    // ── Attribute annotations ───────────────────────────────────

    /// Attach an attribute named `name` to `target`, after any existing ones.
    pub fn attribute(&mut self, target: DeclId, name: &str) -> Result<DeclId, DbError> {
        let tail = self
            .db
            .get(target)
            .attributes()
            .last()
            .map(|a| a.id())
            .unwrap_or(DeclId::NULL);
        let id = self.db.allocate(DeclKind::Attribute, DeclAttrs::empty())?;
        self.db.set_name(id, name)?;
        if tail.is_null() {
            self.db.set_attr_list(target, id)?;
        } else {
            self.db.set_next(tail, id)?;
        }
        Ok(id)
    }

    /// Attach `name(value)` to `target`.
    pub fn attribute_int(&mut self, target: DeclId, name: &str, value: i64) -> Result<DeclId, DbError> {
        let id = self.attribute(target, name)?;
        let v = self.db.allocate(DeclKind::Value, DeclAttrs::empty())?;
        self.db.set_value(v, value)?;
        self.db.set_link(id, v)?;
        Ok(id)
    }

    /// Attach `name("text")` to `target`.
    pub fn attribute_str(&mut self, target: DeclId, name: &str, text: &str) -> Result<DeclId, DbError> {
        let id = self.attribute(target, name)?;
        let v = self.db.allocate(DeclKind::Value, DeclAttrs::empty())?;
        self.db.set_name(v, text)?;
        self.db.set_link(id, v)?;
        Ok(id)
    }
}

/// Last record of the sibling list starting at `head`, or null if empty.
///
/// Bounded by the arena length so a corrupt cycle cannot loop forever.
fn tail(db: &DeclDb, head: DeclId) -> DeclId {
    let mut cur = head;
    for _ in 0..db.len() {
        let next = db.record(cur).next;
        if next.is_null() {
            break;
        }
        cur = next;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_records_thread_and_root() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let t = b.typedef("myint", int).unwrap();
        let v = b.variable("counter", t, 0x1000).unwrap();
        b.finish().unwrap();

        assert_eq!(db.root().id(), t);
        assert_eq!(db.get(t).next().id(), v);
        assert!(db.get(v).is_top());
        assert_eq!(db.get(v).variable_type().typedef_type().name(), "i32");
        assert_eq!(db.get(v).variable_address(), 0x1000);
        assert!(!db.get(int).is_top());
    }

    #[test]
    fn nested_scopes_link_children() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let outer = b.begin_struct("outer").unwrap();
        let x = b.field("x", int).unwrap();
        let inner = b.begin_union("inner").unwrap();
        let y = b.field("y", int).unwrap();
        assert_eq!(b.depth(), 2);
        assert_eq!(b.close().unwrap(), inner);
        let z = b.field("z", int).unwrap();
        b.close().unwrap();
        let after = b.typedef("after", outer).unwrap();
        b.finish().unwrap();

        let fields: Vec<_> = db.get(outer).children().map(|r| r.id()).collect();
        assert_eq!(fields, vec![x, inner, z]);
        assert_eq!(db.get(inner).link().id(), y);
        assert!(!db.get(inner).is_top());
        assert_eq!(db.get(outer).next().id(), after);
    }

    #[test]
    fn close_without_open_fails() {
        let mut db = DeclDb::empty();
        let mut b = DeclBuilder::new(&mut db);
        assert_eq!(b.close(), Err(DbError::NoOpenContainer));
    }

    #[test]
    fn finish_reports_open_containers() {
        let mut db = DeclDb::empty();
        let mut b = DeclBuilder::new(&mut db);
        b.begin_struct("s").unwrap();
        b.begin_union("u").unwrap();
        assert_eq!(b.finish(), Err(DbError::UnclosedContainer { depth: 2 }));
    }

    #[test]
    fn open_rejects_non_container() {
        let mut db = DeclDb::empty();
        let mut b = DeclBuilder::new(&mut db);
        let t = b.typedef("t", DeclId::NULL).unwrap();
        assert!(matches!(
            b.open(t),
            Err(DbError::KindMismatch { found: DeclKind::Typedef, .. })
        ));
        assert!(matches!(b.open(DeclId(77)), Err(DbError::UnknownDecl { .. })));
    }

    #[test]
    fn function_starts_with_return_slot() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let f = b.function("add", int).unwrap();
        b.param("a", int).unwrap();
        b.param("b", int).unwrap();
        b.close().unwrap();
        b.finish().unwrap();

        let params: Vec<_> = db.get(f).members(DeclKind::Function).unwrap().collect();
        assert_eq!(params.len(), 3);
        assert!(params[0].attrs().contains(DeclAttrs::OUT));
        assert_eq!(params[0].name(), "");
        assert_eq!(params[1].name(), "a");
        assert_eq!(params[2].param_type().id(), int);
    }

    #[test]
    fn detached_types_do_not_join_scope() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let chr = b.intrinsic(DeclAttrs::SINT, 8).unwrap();
        b.begin_struct("s").unwrap();
        let p = b.pointer(chr).unwrap();
        let a = b.array(chr, 16).unwrap();
        let f1 = b.field("name", a).unwrap();
        let f2 = b.field("next", p).unwrap();
        b.close().unwrap();
        b.finish().unwrap();

        assert_eq!(db.get(f1).next().id(), f2);
        assert_eq!(db.get(p).name(), "i8*");
        assert_eq!(db.get(p).pointer_type().id(), chr);
        assert_eq!(db.get(a).name(), "i8[16]");
        assert_eq!(db.get(a).array_count(), 16);
        assert!(!db.get(p).is_top());
    }

    #[test]
    fn intrinsic_falls_back_to_new_record() {
        let mut db = DeclDb::new().unwrap();
        let before = db.len();
        let mut b = DeclBuilder::new(&mut db);
        let catalog = b.intrinsic(DeclAttrs::UINT, 16).unwrap();
        let odd = b.intrinsic(DeclAttrs::UINT, 24).unwrap();
        assert_eq!(b.db().len(), before + 1);
        assert_eq!(db.get(catalog).name(), "u16");
        assert_eq!(db.get(odd).name(), "u24");
        assert_eq!(db.find_intrinsic(DeclAttrs::UINT, 24).id(), odd);
    }

    #[test]
    fn attributes_append_in_order() {
        let mut db = DeclDb::empty();
        let mut b = DeclBuilder::new(&mut db);
        let s = b.begin_struct("s").unwrap();
        b.close().unwrap();
        b.attribute(s, "packed").unwrap();
        b.attribute_int(s, "aligned", 16).unwrap();
        b.attribute_str(s, "alias", "t").unwrap();
        b.finish().unwrap();

        let attrs: Vec<_> = db.get(s).attributes().collect();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0].name(), "packed");
        assert!(attrs[0].attribute_value().is_null());
        assert_eq!(attrs[1].attribute_value().value_int(), 16);
        assert_eq!(attrs[2].attribute_value().name(), "t");
        assert_eq!(db.types(None), 1);
    }

    #[test]
    fn enum_constants_carry_values() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let e = b.begin_enum("color", 32).unwrap();
        for (i, name) in ["red", "green", "blue"].into_iter().enumerate() {
            b.constant(name, DeclId::NULL, i as i64).unwrap();
        }
        b.close().unwrap();
        b.finish().unwrap();

        let e = db.get(e);
        assert_eq!(e.enum_width(), 32);
        let values: Vec<_> = e.children().map(|c| (c.name(), c.constant_value())).collect();
        assert_eq!(values, vec![("red", 0), ("green", 1), ("blue", 2)]);
        assert_eq!(db.constants(None), 0);
    }

    #[test]
    fn reopened_container_appends_after_existing_children() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let s = b.begin_struct("s").unwrap();
        let x = b.field("x", int).unwrap();
        b.close().unwrap();
        let t = b.typedef("t", s).unwrap();

        b.open(s).unwrap();
        let y = b.field("y", int).unwrap();
        assert_eq!(b.close().unwrap(), s);
        let u = b.typedef("u", int).unwrap();
        b.finish().unwrap();

        let s = db.get(s);
        assert_eq!(s.struct_fields(None), Ok(2));
        let fields: Vec<_> = s.children().map(|r| r.id()).collect();
        assert_eq!(fields, vec![x, y]);
        assert_eq!(s.type_width(), 64);
        assert_eq!(db.get(t).next().id(), u);
        assert!(!db.get(y).is_top());
    }

    #[test]
    fn reopen_inside_another_scope_restores_it() {
        let mut db = DeclDb::new().unwrap();
        let mut b = DeclBuilder::new(&mut db);
        let int = b.intrinsic(DeclAttrs::SINT, 32).unwrap();
        let e = b.begin_enum("e", 32).unwrap();
        b.constant("A", int, 0).unwrap();
        b.close().unwrap();
        let s = b.begin_struct("s").unwrap();
        let f = b.field("f", int).unwrap();
        b.open(e).unwrap();
        b.constant("B", int, 1).unwrap();
        b.close().unwrap();
        let g = b.field("g", int).unwrap();
        b.close().unwrap();
        b.finish().unwrap();

        assert_eq!(db.get(e).enum_constants(None), Ok(2));
        let fields: Vec<_> = db.get(s).children().map(|r| r.id()).collect();
        assert_eq!(fields, vec![f, g]);
    }

    #[test]
    fn second_builder_continues_top_level_list() {
        let mut db = DeclDb::new().unwrap();
        let int = db.find_intrinsic(DeclAttrs::SINT, 32).id();
        let mut b = DeclBuilder::new(&mut db);
        let first = b.typedef("first", int).unwrap();
        b.finish().unwrap();

        let mut b = DeclBuilder::new(&mut db);
        assert_eq!(b.last(), first);
        let second = b.typedef("second", int).unwrap();
        b.finish().unwrap();

        assert_eq!(db.root().id(), first);
        assert_eq!(db.get(first).next().id(), second);
        assert_eq!(db.types(None), 2);
    }
}
