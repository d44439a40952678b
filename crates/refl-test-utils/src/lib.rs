//! Test utilities for refl development.
//!
//! Provides prebuilt declaration graphs ([`adjacent_structs`],
//! [`kitchen_sink`]), a canonical textual [`outline`] of everything the
//! query API can observe, and a [`FailingWriter`] for exercising I/O
//! error paths.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fmt::Write as _;
use std::io;

use refl_core::DeclId;
use refl_db::{DeclDb, DeclRef};

pub use fixtures::{adjacent_structs, kitchen_sink, AdjacentStructs, FIRST_FIELDS, SECOND_FIELDS};

/// Render every top-level declaration and, recursively, every container
/// member and attribute, one line per record.
///
/// Two databases with equal outlines answer every query identically, so
/// round-trip tests compare outlines instead of raw records.
pub fn outline(db: &DeclDb) -> String {
    let mut out = String::new();
    let mut buf = vec![DeclId::NULL; db.types(None)];
    db.types(Some(&mut buf));
    let mut ids = buf;
    let fetches: [fn(&DeclDb, Option<&mut [DeclId]>) -> usize; 4] = [
        DeclDb::constants,
        DeclDb::variables,
        DeclDb::uniforms,
        DeclDb::functions,
    ];
    for fetch in fetches {
        let mut more = vec![DeclId::NULL; fetch(db, None)];
        fetch(db, Some(&mut more));
        ids.extend(more);
    }
    for id in ids {
        outline_one(&mut out, db.get(id), 0);
    }
    out
}

fn outline_one(out: &mut String, r: DeclRef<'_>, depth: usize) {
    let _ = writeln!(
        out,
        "{:indent$}{} {:?} [{}] link={:?} width={} payload={:#x}",
        "",
        r.kind(),
        r.name(),
        r.attrs(),
        r.link().name(),
        r.type_width(),
        r.record().payload.raw(),
        indent = depth * 2,
    );
    for a in r.attributes() {
        let v = a.attribute_value();
        let _ = writeln!(
            out,
            "{:indent$}@{}({:?} {})",
            "",
            a.name(),
            v.name(),
            v.value_int(),
            indent = depth * 2 + 2,
        );
    }
    for child in r.children() {
        outline_one(out, child, depth + 1);
    }
}

/// A writer that accepts `limit` bytes and then fails every write.
pub struct FailingWriter {
    pub limit: usize,
    pub written: Vec<u8>,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            written: Vec::new(),
        }
    }
}

impl io::Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit.saturating_sub(self.written.len());
        if room == 0 {
            return Err(io::Error::other("writer limit reached"));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
