//! Append-only declaration arena.
//!
//! Records live in one contiguous `Vec` addressed by [`DeclId`]. Index 0
//! holds the zero sentinel and is never handed out. Growth doubles the
//! capacity; indices already issued are unaffected because records are
//! never moved relative to each other, reordered or removed.

use refl_core::{DbError, DeclAttrs, DeclId, DeclKind, DeclRecord, Payload};

/// Shared read-only sentinel returned for the null or unknown ids.
static ZERO_RECORD: DeclRecord = DeclRecord::ZERO;

/// Append-only store of [`DeclRecord`]s.
#[derive(Clone, Debug)]
pub struct DeclArena {
    records: Vec<DeclRecord>,
}

impl DeclArena {
    /// Create an arena with room for `initial_records` records, sentinel
    /// included.
    pub fn new(initial_records: u32) -> Self {
        let mut records = Vec::with_capacity((initial_records as usize).max(1));
        records.push(DeclRecord::ZERO);
        Self { records }
    }

    /// Adopt records read back from storage.
    ///
    /// Record 0 must be the zero sentinel and every link must stay inside
    /// the arena.
    pub fn from_records(records: Vec<DeclRecord>) -> Result<Self, DbError> {
        match records.first() {
            None => {
                return Err(DbError::Corrupt {
                    detail: "arena has no sentinel record".into(),
                })
            }
            Some(r) if !r.is_zero() => {
                return Err(DbError::Corrupt {
                    detail: "record 0 is not the zero sentinel".into(),
                })
            }
            Some(_) => {}
        }
        if records.len() > u32::MAX as usize {
            return Err(DbError::CapacityExceeded {
                what: "declaration arena",
                limit: u32::MAX as usize,
            });
        }
        let len = records.len();
        for (index, record) in records.iter().enumerate() {
            let id = DeclId(index as u32);
            if std::mem::discriminant(&record.payload)
                != std::mem::discriminant(&Payload::empty_for(record.kind))
            {
                return Err(DbError::Corrupt {
                    detail: format!("record {id} carries a payload foreign to kind {}", record.kind),
                });
            }
            for (field, target) in [
                ("next", record.next),
                ("link", record.link),
                ("attr", record.attr),
            ] {
                if target.index() >= len {
                    return Err(DbError::DanglingReference {
                        id,
                        field,
                        target: target.0,
                        len,
                    });
                }
            }
        }
        Ok(Self { records })
    }

    /// Append a zeroed record of `kind` and return its id.
    pub fn allocate(&mut self, kind: DeclKind, attrs: DeclAttrs) -> Result<DeclId, DbError> {
        let index = self.records.len();
        if index >= u32::MAX as usize {
            return Err(DbError::CapacityExceeded {
                what: "declaration arena",
                limit: u32::MAX as usize,
            });
        }
        let capacity = self.records.capacity();
        if index == capacity {
            self.records
                .try_reserve_exact(capacity)
                .map_err(|_| DbError::AllocationFailed {
                    what: "declaration arena",
                    requested: capacity * 2,
                })?;
            tracing::trace!(from = capacity, to = capacity * 2, "arena grown");
        }
        self.records.push(DeclRecord::new(kind, attrs));
        Ok(DeclId(index as u32))
    }

    /// Read a record. Null and unknown ids yield the zero sentinel.
    pub fn get(&self, id: DeclId) -> &DeclRecord {
        if id.is_null() {
            return &ZERO_RECORD;
        }
        self.records.get(id.index()).unwrap_or(&ZERO_RECORD)
    }

    /// Mutable access to a live record. The sentinel is never writable.
    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut DeclRecord> {
        if id.is_null() {
            return None;
        }
        self.records.get_mut(id.index())
    }

    /// Whether `id` names a live (non-sentinel) record.
    pub fn contains(&self, id: DeclId) -> bool {
        !id.is_null() && id.index() < self.records.len()
    }

    /// Number of records, sentinel included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether only the sentinel is present.
    pub fn is_empty(&self) -> bool {
        self.records.len() <= 1
    }

    /// Allocated capacity in records.
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// All records in index order, sentinel included.
    pub fn records(&self) -> &[DeclRecord] {
        &self.records
    }

    /// Ids of every live record, in creation order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = DeclId> + ExactSizeIterator {
        (1..self.records.len() as u32).map(DeclId)
    }
}

impl Default for DeclArena {
    fn default() -> Self {
        Self::new(1)
    }
}
