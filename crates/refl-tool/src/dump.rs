//! Fixed-width record tables and statistics.
//!
//! Each [`DumpFormat`] selects a set of columns whose total width fits its
//! nominal terminal width. Cells that overflow their column are cut.

use std::io::{self, Write};

use refl_core::{DeclId, Payload};
use refl_db::{DeclDb, DeclRef};

/// Column layout of a record dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpFormat {
    /// Index, kind, name, next and link.
    Main,
    /// Adds attribute flags, the annotation list head and the payload.
    All,
    /// Adds resolved type width and member count.
    Ext,
}

impl DumpFormat {
    /// Nominal line width in columns.
    pub fn width(self) -> usize {
        match self {
            Self::Main => 80,
            Self::All => 160,
            Self::Ext => 192,
        }
    }

    fn columns(self) -> &'static [Column] {
        match self {
            Self::Main => &COLUMNS[..5],
            Self::All => &COLUMNS[..8],
            Self::Ext => &COLUMNS[..],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Column {
    title: &'static str,
    width: usize,
    align: Align,
    cell: fn(DeclRef<'_>) -> String,
}

static COLUMNS: [Column; 10] = [
    Column { title: "id", width: 6, align: Align::Right, cell: |r| r.id().to_string() },
    Column { title: "kind", width: 10, align: Align::Left, cell: |r| r.kind().to_string() },
    Column { title: "name", width: 40, align: Align::Left, cell: |r| r.name().to_owned() },
    Column { title: "next", width: 8, align: Align::Right, cell: |r| link(r.record().next) },
    Column { title: "link", width: 8, align: Align::Right, cell: |r| link(r.record().link) },
    Column { title: "attrs", width: 48, align: Align::Left, cell: |r| r.attrs().describe() },
    Column { title: "attr", width: 8, align: Align::Right, cell: |r| link(r.record().attr) },
    Column { title: "payload", width: 24, align: Align::Left, cell: |r| payload(r.record().payload) },
    Column { title: "width", width: 10, align: Align::Right, cell: |r| r.type_width().to_string() },
    Column { title: "members", width: 8, align: Align::Right, cell: |r| r.children().count().to_string() },
];

fn link(id: DeclId) -> String {
    if id.is_null() {
        "-".to_owned()
    } else {
        id.to_string()
    }
}

fn payload(p: Payload) -> String {
    match p {
        Payload::None => "-".to_owned(),
        Payload::Width(w) => format!("width={w}"),
        Payload::Count(n) => format!("count={n}"),
        Payload::Value(v) => format!("value={v}"),
        Payload::Address(a) => format!("addr={a:#x}"),
    }
}

fn write_row(out: &mut dyn Write, columns: &[Column], cells: &[String]) -> io::Result<()> {
    let mut line = String::new();
    for (i, (col, cell)) in columns.iter().zip(cells).enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let cut: String = cell.chars().take(col.width).collect();
        match col.align {
            Align::Left => line.push_str(&format!("{cut:<w$}", w = col.width)),
            Align::Right => line.push_str(&format!("{cut:>w$}", w = col.width)),
        }
    }
    writeln!(out, "{}", line.trim_end())
}

/// Write every record of `db`, sentinel excluded, as a table in `format`.
pub fn dump(db: &DeclDb, format: DumpFormat, out: &mut dyn Write) -> io::Result<()> {
    let columns = format.columns();
    let titles: Vec<String> = columns.iter().map(|c| c.title.to_owned()).collect();
    write_row(out, columns, &titles)?;
    let rule = columns.iter().map(|c| c.width).sum::<usize>() + columns.len() - 1;
    writeln!(out, "{}", "-".repeat(rule))?;
    for id in db.arena().ids() {
        let r = db.get(id);
        let cells: Vec<String> = columns.iter().map(|c| (c.cell)(r)).collect();
        write_row(out, columns, &cells)?;
    }
    Ok(())
}

/// Write record, byte and per-kind counts of `db`.
pub fn write_stats(db: &DeclDb, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "{}", db.stats())
}
