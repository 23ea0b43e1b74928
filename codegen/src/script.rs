//! Renders a pipeline as newline-terminated SQL text.

use std::io::{self, Write};

use tracing::debug;

use crate::pipeline::Pipeline;

/// Renders the whole script into a string.
#[must_use]
pub fn render_script(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    for statement in pipeline.statements() {
        out.push_str(&statement.sql);
        out.push('\n');
    }
    out
}

/// Streams the script into `writer`, one statement per line.
///
/// Returns the number of statements written.
///
/// # Errors
///
/// Returns any error reported by `writer`.
pub fn write_script<W: Write>(pipeline: &Pipeline, writer: &mut W) -> io::Result<usize> {
    let mut written = 0usize;
    for statement in pipeline.statements() {
        writeln!(writer, "{statement}")?;
        written += 1;
    }
    writer.flush()?;
    debug!(statements = written, "script written");
    Ok(written)
}
