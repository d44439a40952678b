//! Aggregate counts over a database.

use std::fmt;

use indexmap::IndexMap;
use refl_core::DeclKind;

use crate::database::DeclDb;

/// Record and byte counts for one database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbStats {
    /// Live records, sentinel excluded.
    pub records: usize,
    /// String pool size in bytes.
    pub pool_bytes: usize,
    /// Records carrying the top-level flag.
    pub top_level: usize,
    /// Live records per kind, in tag order. Kinds with no records are omitted.
    pub per_kind: IndexMap<DeclKind, usize>,
}

impl DeclDb {
    /// Count records by kind.
    pub fn stats(&self) -> DbStats {
        let mut counts = [0usize; DeclKind::ALL.len()];
        let mut top_level = 0;
        for id in self.arena().ids() {
            let r = self.get(id);
            counts[r.kind().as_u8() as usize] += 1;
            if r.is_top() {
                top_level += 1;
            }
        }
        let per_kind = DeclKind::ALL
            .iter()
            .zip(counts)
            .filter(|&(_, n)| n > 0)
            .map(|(&kind, n)| (kind, n))
            .collect();
        DbStats {
            records: self.len().saturating_sub(1),
            pool_bytes: self.pool().len(),
            top_level,
            per_kind,
        }
    }
}

impl fmt::Display for DbStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {:>8}", "records", self.records)?;
        writeln!(f, "{:<12} {:>8}", "pool bytes", self.pool_bytes)?;
        writeln!(f, "{:<12} {:>8}", "top level", self.top_level)?;
        for (kind, n) in &self.per_kind {
            writeln!(f, "{:<12} {:>8}", kind.name(), n)?;
        }
        Ok(())
    }
}
