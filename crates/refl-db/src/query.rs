//! Top-level and child-list traversal.
//!
//! Every plural query follows the same count-then-fill protocol: the
//! caller passes an optional buffer, the query writes at most
//! `buf.len()` ids in creation order and returns the total number of
//! matches. Calling once with `None` and again with a buffer of the
//! returned size yields exactly that many entries.
//!
//! Iterator forms ([`DeclDb::top_level`], [`DeclRef::members`]) are
//! provided for in-process callers that do not need the buffer protocol.

use std::iter::FusedIterator;

use refl_core::{DeclId, DeclKind, QueryError};

use crate::database::DeclDb;
use crate::handle::DeclRef;

/// Class of top-level declaration selected by a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclClass {
    /// Any type kind.
    Types,
    /// Constants.
    Constants,
    /// Variables.
    Variables,
    /// Uniforms.
    Uniforms,
    /// Functions.
    Functions,
}

impl DeclClass {
    /// Whether `kind` belongs to this class.
    pub fn matches(self, kind: DeclKind) -> bool {
        match self {
            Self::Types => kind.is_type(),
            Self::Constants => kind == DeclKind::Constant,
            Self::Variables => kind == DeclKind::Variable,
            Self::Uniforms => kind == DeclKind::Uniform,
            Self::Functions => kind == DeclKind::Function,
        }
    }
}

/// Copy ids into `buf` while counting every item.
fn fill<'db>(items: impl Iterator<Item = DeclRef<'db>>, buf: Option<&mut [DeclId]>) -> usize {
    let mut slots = buf.map(|b| b.iter_mut());
    let mut count = 0;
    for item in items {
        if let Some(slot) = slots.as_mut().and_then(|it| it.next()) {
            *slot = item.id();
        }
        count += 1;
    }
    count
}

impl DeclDb {
    /// Top-level records of `class`, in creation order.
    pub fn top_level(&self, class: DeclClass) -> impl Iterator<Item = DeclRef<'_>> + '_ {
        self.arena()
            .ids()
            .map(move |id| self.get(id))
            .filter(move |r| r.is_top() && class.matches(r.kind()))
    }

    /// Count, and optionally collect, top-level records of `class`.
    pub fn top_level_fetch(&self, class: DeclClass, buf: Option<&mut [DeclId]>) -> usize {
        fill(self.top_level(class), buf)
    }

    /// Top-level types.
    pub fn types(&self, buf: Option<&mut [DeclId]>) -> usize {
        self.top_level_fetch(DeclClass::Types, buf)
    }

    /// Top-level constants.
    pub fn constants(&self, buf: Option<&mut [DeclId]>) -> usize {
        self.top_level_fetch(DeclClass::Constants, buf)
    }

    /// Top-level variables.
    pub fn variables(&self, buf: Option<&mut [DeclId]>) -> usize {
        self.top_level_fetch(DeclClass::Variables, buf)
    }

    /// Top-level uniforms.
    pub fn uniforms(&self, buf: Option<&mut [DeclId]>) -> usize {
        self.top_level_fetch(DeclClass::Uniforms, buf)
    }

    /// Top-level functions.
    pub fn functions(&self, buf: Option<&mut [DeclId]>) -> usize {
        self.top_level_fetch(DeclClass::Functions, buf)
    }
}

/// Walks a sibling list from its head across `next` links.
///
/// Stops at the null index, at the first record that cannot be a member,
/// or after visiting as many records as the arena holds, so a corrupt
/// cycle cannot loop forever.
#[derive(Clone)]
pub struct Members<'db> {
    cursor: DeclRef<'db>,
    remaining: usize,
    accept: fn(DeclKind) -> bool,
}

impl<'db> Iterator for Members<'db> {
    type Item = DeclRef<'db>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_null() || self.remaining == 0 || !(self.accept)(self.cursor.kind()) {
            return None;
        }
        self.remaining -= 1;
        let current = self.cursor;
        self.cursor = current.next();
        Some(current)
    }
}

impl FusedIterator for Members<'_> {}

impl<'db> DeclRef<'db> {
    fn walk(&self, head: DeclRef<'db>, accept: fn(DeclKind) -> bool) -> Members<'db> {
        Members {
            cursor: head,
            remaining: self.db().len(),
            accept,
        }
    }

    /// Members of this container if it is of kind `expected`.
    pub fn members(&self, expected: DeclKind) -> Result<Members<'db>, QueryError> {
        let found = self.kind();
        if self.is_null() || found != expected || !expected.is_container() {
            return Err(QueryError::NotAContainer { expected, found });
        }
        Ok(self.walk(self.link(), DeclKind::is_member))
    }

    /// Members of this record if it is any container; empty otherwise.
    pub fn children(&self) -> Members<'db> {
        if self.kind().is_container() && !self.is_null() {
            self.walk(self.link(), DeclKind::is_member)
        } else {
            self.walk(self.db().null(), DeclKind::is_member)
        }
    }

    /// Attribute annotations attached to this record.
    pub fn attributes(&self) -> Members<'db> {
        self.walk(self.attr_head(), |k| k == DeclKind::Attribute)
    }

    fn child_fetch(&self, expected: DeclKind, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        Ok(fill(self.members(expected)?, buf))
    }

    /// Constants of an enum.
    pub fn enum_constants(&self, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        self.child_fetch(DeclKind::Enum, buf)
    }

    /// Constants of a set.
    pub fn set_constants(&self, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        self.child_fetch(DeclKind::Set, buf)
    }

    /// Members of a struct.
    pub fn struct_fields(&self, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        self.child_fetch(DeclKind::Struct, buf)
    }

    /// Members of a union.
    pub fn union_fields(&self, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        self.child_fetch(DeclKind::Union, buf)
    }

    /// Parameters of a function, return slot first.
    pub fn function_params(&self, buf: Option<&mut [DeclId]>) -> Result<usize, QueryError> {
        self.child_fetch(DeclKind::Function, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refl_core::DeclAttrs;

    fn top(db: &mut DeclDb, kind: DeclKind, name: &str) -> DeclId {
        let id = db.allocate(kind, DeclAttrs::TOP).unwrap();
        db.set_name(id, name).unwrap();
        id
    }

    #[test]
    fn top_level_filters_by_class_and_flag() {
        let mut db = DeclDb::new().unwrap();
        let s = top(&mut db, DeclKind::Struct, "s");
        let c = top(&mut db, DeclKind::Constant, "c");
        let f = top(&mut db, DeclKind::Function, "f");
        let nested = db.allocate(DeclKind::Struct, DeclAttrs::empty()).unwrap();
        let t = top(&mut db, DeclKind::Typedef, "t");

        let types: Vec<_> = db.top_level(DeclClass::Types).map(|r| r.id()).collect();
        assert_eq!(types, vec![s, t]);
        assert!(!types.contains(&nested));
        assert_eq!(db.constants(None), 1);
        assert_eq!(db.functions(None), 1);
        assert_eq!(db.variables(None), 0);
        assert_eq!(db.uniforms(None), 0);

        let mut buf = [DeclId::NULL; 1];
        assert_eq!(db.constants(Some(&mut buf)), 1);
        assert_eq!(buf[0], c);
        assert_eq!(db.functions(Some(&mut buf)), 1);
        assert_eq!(buf[0], f);
    }

    #[test]
    fn fill_never_overruns() {
        let mut db = DeclDb::empty();
        let ids: Vec<_> = (0..5)
            .map(|i| top(&mut db, DeclKind::Struct, &format!("s{i}")))
            .collect();
        let mut small = [DeclId::NULL; 2];
        assert_eq!(db.types(Some(&mut small)), 5);
        assert_eq!(small, [ids[0], ids[1]]);

        let mut empty: [DeclId; 0] = [];
        assert_eq!(db.types(Some(&mut empty)), 5);
    }

    #[test]
    fn child_list_on_wrong_kind_fails_without_writes() {
        let mut db = DeclDb::empty();
        let s = top(&mut db, DeclKind::Struct, "s");
        let mut buf = [DeclId(99); 2];
        let r = db.get(s);
        assert_eq!(
            r.enum_constants(Some(&mut buf)),
            Err(QueryError::NotAContainer {
                expected: DeclKind::Enum,
                found: DeclKind::Struct,
            })
        );
        assert_eq!(buf, [DeclId(99); 2]);
        assert_eq!(r.struct_fields(None), Ok(0));
        assert!(db.null().struct_fields(None).is_err());
    }

    #[test]
    fn function_params_include_return_slot() {
        let mut db = DeclDb::new().unwrap();
        let int = db.find_intrinsic(DeclAttrs::SINT, 32).id();
        let f = top(&mut db, DeclKind::Function, "add");
        let ret = db.allocate(DeclKind::Param, DeclAttrs::OUT).unwrap();
        db.set_link(ret, int).unwrap();
        db.set_link(f, ret).unwrap();
        let a = db.allocate(DeclKind::Param, DeclAttrs::empty()).unwrap();
        db.set_name(a, "a").unwrap();
        db.set_link(a, int).unwrap();
        db.set_next(ret, a).unwrap();

        let f = db.get(f);
        assert_eq!(f.function_params(None), Ok(2));
        let params: Vec<_> = f.members(DeclKind::Function).unwrap().collect();
        assert!(params[0].attrs().contains(DeclAttrs::OUT));
        assert_eq!(params[1].name(), "a");
        assert_eq!(params[1].param_type().name(), "i32");
    }

    #[test]
    fn walk_stops_at_non_member() {
        let mut db = DeclDb::empty();
        let e = top(&mut db, DeclKind::Enum, "e");
        let c = db.allocate(DeclKind::Constant, DeclAttrs::empty()).unwrap();
        let stray = db.allocate(DeclKind::Attribute, DeclAttrs::empty()).unwrap();
        db.set_link(e, c).unwrap();
        db.set_next(c, stray).unwrap();
        assert_eq!(db.get(e).enum_constants(None), Ok(1));
    }

    #[test]
    fn children_of_non_container_is_empty() {
        let mut db = DeclDb::new().unwrap();
        let t = top(&mut db, DeclKind::Typedef, "t");
        let int = db.find_intrinsic(DeclAttrs::SINT, 32).id();
        db.set_link(t, int).unwrap();
        assert_eq!(db.get(t).children().count(), 0);
    }
}
