//! Operator-facing output.
//!
//! # Important
//!
//! - **stdout**: rate lines, decoded records, usage text
//! - **stderr**: logs (see [`crate::logging`])
//! - Lines end in a single `\n`, never `\r\n`

use std::io::Write;

/// Write one line to `writer` and flush.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Write many lines under one lock, flushing once at the end.
pub fn write_lines<W, I, S>(writer: &mut W, lines: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Write a line to stdout.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_line(&mut handle, line)
}

/// Write lines to stdout.
pub fn write_stdout_lines<I, S>(lines: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_lines(&mut handle, lines)
}

/// Write a status line to stdout; a failed write is logged, not returned.
///
/// Used from the load phases, where a closed stdout must not stop the run.
pub fn emit(line: &str) {
    if let Err(e) = write_stdout_line(line) {
        tracing::warn!("Failed to write {:?} to stdout: {}", line, e);
    }
}
