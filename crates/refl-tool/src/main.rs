//! `refltool`: print the contents of a refl database file.
//!
//! ```text
//! refltool [-v] <--dump|--dump-all|--dump-ext|--stats> <FILE>
//! ```
//!
//! Exits 0 on success and 1 on bad arguments or an unreadable file.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use refl_file::FileError;
use refl_tool::{dump, write_stats, Cli, Mode};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors fail.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    setup_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), FileError> {
    let db = refl_file::load(&cli.file)?;
    tracing::debug!(file = %cli.file.display(), records = db.len(), "database loaded");

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    match cli.mode() {
        Mode::Dump(format) => dump(&db, format, &mut out)?,
        Mode::Stats => write_stats(&db, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
