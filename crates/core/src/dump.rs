//! Dump output helpers.
//!
//! The line format is `name=value`, escaped for compatibility with simple
//! `key=value` property files, with optional `# doc` comment lines. The
//! traversal order comes from the exporter (name sort order); this module
//! only formats single variables.

use std::fmt::Write;

use thiserror::Error;

use crate::variable::{AccessError, Variable};

/// Failure while producing dump output.
///
/// Missing variables never show up here (the traversal simply skips what is
/// not registered), but accessor failures do propagate: a broken exported
/// value is actionable information for the operator.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("failed to write dump output: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Write one variable as a property line, with an optional doc comment.
///
/// The name is written as-is: sub-variable addresses (`container#key`) are
/// wire-visible and escaping them would break the addressing syntax. Only
/// the value side is escaped.
pub fn write_variable(
    out: &mut dyn Write,
    var: &dyn Variable,
    include_doc: bool,
) -> Result<(), DumpError> {
    let value = var.value()?;
    if include_doc && !var.doc().is_empty() {
        writeln!(out, "# {}", var.doc())?;
    }
    writeln!(out, "{}={}", var.name(), escape_value(&value.to_string()))?;
    Ok(())
}

/// Escape a property value: backslashes, control whitespace, comment and
/// separator characters, and a leading space (embedded spaces are fine in
/// values).
#[must_use]
pub fn escape_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
