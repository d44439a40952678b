//! The declaration database: arena, string pool and root.
//!
//! [`DeclDb`] is the unique owner of every record and name reachable from
//! it. Construction methods take `&mut self` and plain [`DeclId`]s; reads
//! go through borrowed [`DeclRef`] handles, so no handle can outlive the
//! database it came from.

use refl_core::{DbError, DbId, DeclAttrs, DeclId, DeclKind, DeclRecord, NameOffset, Payload};

use crate::arena::DeclArena;
use crate::config::DbConfig;
use crate::handle::DeclRef;
use crate::intrinsics::INTRINSICS;
use crate::pool::StringPool;

/// An in-memory declaration graph.
#[derive(Debug)]
pub struct DeclDb {
    id: DbId,
    arena: DeclArena,
    pool: StringPool,
    root: DeclId,
    /// Ids of every intrinsic record, ascending.
    intrinsics: Vec<DeclId>,
}

impl DeclDb {
    /// Create a database with the default configuration, intrinsic catalog
    /// included.
    pub fn new() -> Result<Self, DbError> {
        Self::with_config(&DbConfig::default())
    }

    /// Create an empty database: no intrinsics, default capacities.
    pub fn empty() -> Self {
        Self::from_parts(DeclArena::default(), StringPool::default(), DeclId::NULL)
    }

    /// Create a database from an explicit configuration.
    pub fn with_config(config: &DbConfig) -> Result<Self, DbError> {
        config.validate()?;
        let mut db = Self::from_parts(
            DeclArena::new(config.initial_records),
            StringPool::new(config.initial_pool_bytes, config.dedup_names),
            DeclId::NULL,
        );
        if config.with_intrinsics {
            db.install_intrinsics()?;
        }
        tracing::debug!(
            db = %db.id,
            records = db.arena.len(),
            intrinsics = db.intrinsics.len(),
            "created declaration database"
        );
        Ok(db)
    }

    /// Rebuild a database from raw records, pool bytes and root index.
    ///
    /// Validates the sentinel, every link and name offset, and the root.
    /// Nothing usable is returned unless every check passes.
    pub fn from_raw_parts(
        records: Vec<DeclRecord>,
        pool: Vec<u8>,
        root: DeclId,
    ) -> Result<Self, DbError> {
        let arena = DeclArena::from_records(records)?;
        let pool = StringPool::from_bytes(pool)?;
        for id in arena.ids() {
            let name = arena.get(id).name;
            if name.0 as usize >= pool.len() {
                return Err(DbError::DanglingName {
                    id,
                    offset: name.0,
                    len: pool.len(),
                });
            }
        }
        if root.index() >= arena.len() {
            return Err(DbError::DanglingReference {
                id: DeclId::NULL,
                field: "root",
                target: root.0,
                len: arena.len(),
            });
        }
        Ok(Self::from_parts(arena, pool, root))
    }

    fn from_parts(arena: DeclArena, pool: StringPool, root: DeclId) -> Self {
        let intrinsics = arena
            .ids()
            .filter(|&id| arena.get(id).kind == DeclKind::Intrinsic)
            .collect();
        Self {
            id: DbId::next(),
            arena,
            pool,
            root,
            intrinsics,
        }
    }

    fn install_intrinsics(&mut self) -> Result<(), DbError> {
        for def in INTRINSICS {
            let id = self.allocate(DeclKind::Intrinsic, def.attrs)?;
            self.set_name(id, def.name)?;
            self.set_width(id, def.width)?;
        }
        Ok(())
    }

    // ── Identity and raw access ─────────────────────────────────

    /// This database's identity.
    pub fn id(&self) -> DbId {
        self.id
    }

    /// Number of records, sentinel included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the database holds no records besides the sentinel.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The arena.
    pub fn arena(&self) -> &DeclArena {
        &self.arena
    }

    /// The string pool.
    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// All records in index order, sentinel included.
    pub fn records(&self) -> &[DeclRecord] {
        self.arena.records()
    }

    /// Used string pool bytes.
    pub fn pool_bytes(&self) -> &[u8] {
        self.pool.as_bytes()
    }

    /// Read a record. Null and unknown ids yield the zero record.
    pub fn record(&self, id: DeclId) -> &DeclRecord {
        self.arena.get(id)
    }

    /// Resolve a name offset.
    pub fn resolve(&self, offset: NameOffset) -> &str {
        self.pool.resolve(offset)
    }

    /// Whether `id` names a live record in this database.
    pub fn contains(&self, id: DeclId) -> bool {
        self.arena.contains(id)
    }

    /// A handle for `id`. Unknown ids become the null handle.
    pub fn get(&self, id: DeclId) -> DeclRef<'_> {
        if self.contains(id) {
            DeclRef::new(self, id)
        } else {
            self.null()
        }
    }

    /// The null handle of this database.
    pub fn null(&self) -> DeclRef<'_> {
        DeclRef::new(self, DeclId::NULL)
    }

    /// The first top-level record, if any.
    pub fn root(&self) -> DeclRef<'_> {
        self.get(self.root)
    }

    /// Ids of intrinsic records, ascending.
    pub(crate) fn intrinsic_ids(&self) -> &[DeclId] {
        &self.intrinsics
    }

    // ── Construction ────────────────────────────────────────────

    /// Append a zeroed record of `kind` with `attrs`.
    pub fn allocate(&mut self, kind: DeclKind, attrs: DeclAttrs) -> Result<DeclId, DbError> {
        let id = self.arena.allocate(kind, attrs)?;
        if kind == DeclKind::Intrinsic {
            self.intrinsics.push(id);
        }
        Ok(id)
    }

    /// Intern `text` and make it the name of `id`.
    ///
    /// Returns the interned copy.
    pub fn set_name(&mut self, id: DeclId, text: &str) -> Result<&str, DbError> {
        self.live(id)?;
        let offset = self.pool.intern(text)?;
        self.record_mut(id)?.name = offset;
        Ok(self.pool.resolve(offset))
    }

    /// Add attribute flags to `id`.
    pub fn add_attrs(&mut self, id: DeclId, attrs: DeclAttrs) -> Result<(), DbError> {
        self.record_mut(id)?.attrs |= attrs;
        Ok(())
    }

    /// Make `next` the sibling of `id`.
    ///
    /// The field is set once: returns `Ok(false)` and leaves the record
    /// untouched if `id` already has a sibling.
    pub fn set_next(&mut self, id: DeclId, next: DeclId) -> Result<bool, DbError> {
        self.set_once(id, next, "next", |r| &mut r.next)
    }

    /// Set the `link` of `id` (child-list head or referenced type). Set once.
    pub fn set_link(&mut self, id: DeclId, target: DeclId) -> Result<bool, DbError> {
        self.set_once(id, target, "link", |r| &mut r.link)
    }

    /// Set the attribute-list head of `id`. Set once.
    pub fn set_attr_list(&mut self, id: DeclId, head: DeclId) -> Result<bool, DbError> {
        self.set_once(id, head, "attr", |r| &mut r.attr)
    }

    /// Record the first top-level record. Set once.
    pub fn set_root(&mut self, id: DeclId) -> Result<bool, DbError> {
        self.live(id)?;
        if !self.root.is_null() {
            return Ok(false);
        }
        self.root = id;
        Ok(true)
    }

    /// Set the bit width of an intrinsic, pointer, enum, set or field.
    pub fn set_width(&mut self, id: DeclId, width: u64) -> Result<(), DbError> {
        self.set_payload(id, "intrinsic, pointer, enum, set or field", |p| match p {
            Payload::Width(w) => {
                *w = width;
                true
            }
            _ => false,
        })
    }

    /// Set the element count of an array.
    pub fn set_count(&mut self, id: DeclId, count: u64) -> Result<(), DbError> {
        self.set_payload(id, "array", |p| match p {
            Payload::Count(n) => {
                *n = count;
                true
            }
            _ => false,
        })
    }

    /// Set the value of a constant or attribute value.
    pub fn set_value(&mut self, id: DeclId, value: i64) -> Result<(), DbError> {
        self.set_payload(id, "constant or value", |p| match p {
            Payload::Value(v) => {
                *v = value;
                true
            }
            _ => false,
        })
    }

    /// Set the address of a variable, uniform or function.
    pub fn set_address(&mut self, id: DeclId, address: u64) -> Result<(), DbError> {
        self.set_payload(id, "variable, uniform or function", |p| match p {
            Payload::Address(a) => {
                *a = address;
                true
            }
            _ => false,
        })
    }

    fn live(&self, id: DeclId) -> Result<(), DbError> {
        if self.arena.contains(id) {
            Ok(())
        } else {
            Err(DbError::UnknownDecl {
                id,
                len: self.arena.len(),
            })
        }
    }

    fn record_mut(&mut self, id: DeclId) -> Result<&mut DeclRecord, DbError> {
        let len = self.arena.len();
        self.arena
            .get_mut(id)
            .ok_or(DbError::UnknownDecl { id, len })
    }

    fn set_once(
        &mut self,
        id: DeclId,
        target: DeclId,
        field: &'static str,
        slot: impl FnOnce(&mut DeclRecord) -> &mut DeclId,
    ) -> Result<bool, DbError> {
        self.live(target)?;
        if target == id {
            return Err(DbError::Corrupt {
                detail: format!("declaration {id} cannot be its own {field}"),
            });
        }
        let slot = slot(self.record_mut(id)?);
        if !slot.is_null() {
            return Ok(false);
        }
        *slot = target;
        Ok(true)
    }

    fn set_payload(
        &mut self,
        id: DeclId,
        expected: &'static str,
        write: impl FnOnce(&mut Payload) -> bool,
    ) -> Result<(), DbError> {
        let record = self.record_mut(id)?;
        let found = record.kind;
        if write(&mut record.payload) {
            Ok(())
        } else {
            Err(DbError::KindMismatch {
                id,
                expected,
                found,
            })
        }
    }
}

impl Default for DeclDb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_db_has_only_sentinel() {
        let db = DeclDb::empty();
        assert_eq!(db.len(), 1);
        assert!(db.is_empty());
        assert!(db.root().is_null());
        assert_eq!(db.pool_bytes(), b"\0");
    }

    #[test]
    fn new_db_installs_catalog() {
        let db = DeclDb::new().unwrap();
        assert_eq!(db.len(), INTRINSICS.len() + 1);
        assert_eq!(db.intrinsic_ids().len(), INTRINSICS.len());
        assert!(db.root().is_null());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DbConfig {
            initial_records: 0,
            ..DbConfig::default()
        };
        assert!(matches!(
            DeclDb::with_config(&config),
            Err(DbError::Config(_))
        ));
    }

    #[test]
    fn set_name_returns_interned_copy() {
        let mut db = DeclDb::empty();
        let id = db.allocate(DeclKind::Struct, DeclAttrs::TOP).unwrap();
        assert_eq!(db.set_name(id, "point").unwrap(), "point");
        assert_eq!(db.resolve(db.record(id).name), "point");
    }

    #[test]
    fn set_name_on_null_fails() {
        let mut db = DeclDb::empty();
        assert!(matches!(
            db.set_name(DeclId::NULL, "x"),
            Err(DbError::UnknownDecl { .. })
        ));
        assert_eq!(db.pool_bytes(), b"\0");
    }

    #[test]
    fn links_are_set_once() {
        let mut db = DeclDb::empty();
        let a = db.allocate(DeclKind::Field, DeclAttrs::empty()).unwrap();
        let b = db.allocate(DeclKind::Field, DeclAttrs::empty()).unwrap();
        let c = db.allocate(DeclKind::Field, DeclAttrs::empty()).unwrap();
        assert!(db.set_next(a, b).unwrap());
        assert!(!db.set_next(a, c).unwrap());
        assert_eq!(db.record(a).next, b);

        assert!(db.set_link(a, c).unwrap());
        assert!(!db.set_link(a, b).unwrap());
        assert_eq!(db.record(a).link, c);
    }

    #[test]
    fn self_links_rejected() {
        let mut db = DeclDb::empty();
        let a = db.allocate(DeclKind::Field, DeclAttrs::empty()).unwrap();
        assert!(db.set_next(a, a).is_err());
        assert!(db.record(a).next.is_null());
    }

    #[test]
    fn link_to_unknown_target_fails() {
        let mut db = DeclDb::empty();
        let a = db.allocate(DeclKind::Typedef, DeclAttrs::empty()).unwrap();
        assert!(matches!(
            db.set_link(a, DeclId(9)),
            Err(DbError::UnknownDecl { .. })
        ));
    }

    #[test]
    fn payload_writes_are_kind_checked() {
        let mut db = DeclDb::empty();
        let s = db.allocate(DeclKind::Struct, DeclAttrs::empty()).unwrap();
        let a = db.allocate(DeclKind::Array, DeclAttrs::empty()).unwrap();
        assert_eq!(
            db.set_count(s, 4),
            Err(DbError::KindMismatch {
                id: s,
                expected: "array",
                found: DeclKind::Struct,
            })
        );
        assert!(db.record(s).payload == Payload::None);
        db.set_count(a, 4).unwrap();
        assert_eq!(db.record(a).count(), 4);
        assert!(db.set_width(a, 8).is_err());
    }

    #[test]
    fn root_is_set_once() {
        let mut db = DeclDb::empty();
        let a = db.allocate(DeclKind::Struct, DeclAttrs::TOP).unwrap();
        let b = db.allocate(DeclKind::Struct, DeclAttrs::TOP).unwrap();
        assert!(db.set_root(a).unwrap());
        assert!(!db.set_root(b).unwrap());
        assert_eq!(db.root().id(), a);
    }

    #[test]
    fn from_raw_parts_rebuilds_intrinsic_index() {
        let db = DeclDb::new().unwrap();
        let copy = DeclDb::from_raw_parts(
            db.records().to_vec(),
            db.pool_bytes().to_vec(),
            DeclId::NULL,
        )
        .unwrap();
        assert_eq!(copy.intrinsic_ids(), db.intrinsic_ids());
        assert_ne!(copy.id(), db.id());
    }

    #[test]
    fn from_raw_parts_rejects_dangling_name() {
        let mut record = DeclRecord::new(DeclKind::Struct, DeclAttrs::TOP);
        record.name = NameOffset(10);
        let result = DeclDb::from_raw_parts(vec![DeclRecord::ZERO, record], b"\0".to_vec(), DeclId(1));
        assert!(matches!(result, Err(DbError::DanglingName { .. })));
    }

    #[test]
    fn from_raw_parts_rejects_dangling_root() {
        let result = DeclDb::from_raw_parts(vec![DeclRecord::ZERO], b"\0".to_vec(), DeclId(3));
        assert!(matches!(result, Err(DbError::DanglingReference { field: "root", .. })));
    }
}
