//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::dump::DumpFormat;

/// `refltool` command line arguments.
#[derive(Parser, Debug)]
#[command(name = "refltool", version)]
#[command(about = "Dump refl reflection metadata")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["dump", "dump_all", "dump_ext", "stats"])
))]
pub struct Cli {
    /// Dump main reflection database fields in 80-column format
    #[arg(long)]
    pub dump: bool,

    /// Dump all reflection database fields in 160-column format
    #[arg(long = "dump-all")]
    pub dump_all: bool,

    /// Dump all fields plus resolved layout in 192-column format
    #[arg(long = "dump-ext")]
    pub dump_ext: bool,

    /// Print reflection database statistics
    #[arg(long)]
    pub stats: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Database file to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// What to print once the database is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// A record table in the given format.
    Dump(DumpFormat),
    /// Aggregate counts.
    Stats,
}

impl Cli {
    /// The selected mode. Exactly one flag is set after parsing.
    pub fn mode(&self) -> Mode {
        if self.stats {
            Mode::Stats
        } else if self.dump_ext {
            Mode::Dump(DumpFormat::Ext)
        } else if self.dump_all {
            Mode::Dump(DumpFormat::All)
        } else {
            Mode::Dump(DumpFormat::Main)
        }
    }
}
