//! Signal Table I/O
//!
//! Signals are stored as a two-column comma-separated table:
//!
//! ```text
//! Time,Signal
//! 0,0
//! 0.001,0.03141075907812829
//! ...
//! ```
//!
//! The header is required (compared case-insensitively). Blank lines are
//! skipped. Any other row must hold exactly two numeric columns.

use crate::error::{NyqError, NyqResult};
use crate::types::Signal;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Column names of the signal table
pub const HEADER: [&str; 2] = ["Time", "Signal"];

/// Read a signal table from any buffered reader
pub fn read_signal<R: BufRead>(reader: R) -> NyqResult<Signal> {
    let mut lines = reader.lines().enumerate();
    let mut time = Vec::new();
    let mut amplitude = Vec::new();

    // Header is the first non-blank line
    let mut header_seen = false;
    for (idx, line) in &mut lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        check_header(trimmed, idx + 1)?;
        header_seen = true;
        break;
    }
    if !header_seen {
        return Err(NyqError::malformed("signal table is empty"));
    }

    for (idx, line) in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (t, a) = parse_row(trimmed, idx + 1)?;
        time.push(t);
        amplitude.push(a);
    }

    debug!(rows = time.len(), "read signal table");
    Signal::new(time, amplitude)
}

/// Write a signal table to any writer
pub fn write_signal<W: Write>(mut writer: W, signal: &Signal) -> NyqResult<()> {
    writeln!(writer, "{},{}", HEADER[0], HEADER[1])?;
    for (t, a) in signal.iter() {
        writeln!(writer, "{},{}", t, a)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a signal table from a file
pub fn read_signal_file(path: impl AsRef<Path>) -> NyqResult<Signal> {
    let file = File::open(path.as_ref())?;
    read_signal(BufReader::new(file))
}

/// Write a signal table to a file, replacing it if present
pub fn write_signal_file(path: impl AsRef<Path>, signal: &Signal) -> NyqResult<()> {
    let file = File::create(path.as_ref())?;
    write_signal(BufWriter::new(file), signal)
}

fn check_header(line: &str, line_no: usize) -> NyqResult<()> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    let matches = columns.len() == HEADER.len()
        && columns
            .iter()
            .zip(HEADER)
            .all(|(got, want)| got.eq_ignore_ascii_case(want));

    if matches {
        Ok(())
    } else {
        Err(NyqError::malformed_at(
            line_no,
            format!("expected header `Time,Signal`, found `{}`", line),
        ))
    }
}

fn parse_row(line: &str, line_no: usize) -> NyqResult<(f64, f64)> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() != 2 {
        return Err(NyqError::malformed_at(
            line_no,
            format!("expected 2 columns, found {}", columns.len()),
        ));
    }

    let parse = |text: &str, name: &str| {
        text.parse::<f64>().map_err(|_| {
            NyqError::malformed_at(line_no, format!("{} value `{}` is not a number", name, text))
        })
    };

    Ok((parse(columns[0], "time")?, parse(columns[1], "signal")?))
}
