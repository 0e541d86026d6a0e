//! Delimited-text reader for detector-run files.
//!
//! Rows end at `\n`, `\r\n` or a lone `\r`; fields are split on the configured
//! delimiter. A field that starts with `"` is quoted: it may contain delimiters
//! and line breaks, and `""` inside it is a literal quote. A blank line is a row
//! with no fields, so record validation rejects it; only the final line break
//! of the file does not open a new row.

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::errors::{FlakeError, Result};

/// One row as read from disk, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line on which the row starts.
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    #[must_use]
    pub fn new<I, S>(line: usize, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.fields)
    }
}

/// Read and split a detector-run file.
pub fn read_delimited(path: &Path, delimiter: char) -> Result<Vec<RawRow>> {
    let raw = fs::read_to_string(path).map_err(|source| FlakeError::io(path, source))?;
    parse_delimited(&raw, delimiter)
}

/// Split delimited text into rows.
pub fn parse_delimited(raw: &str, delimiter: char) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();
    let mut row = RowBuilder::default();
    let mut line = 1;
    let mut row_start = 1;
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(mut c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            c = '\n';
        }
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    row.field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    row.field.push('\n');
                }
                _ => row.field.push(c),
            }
            continue;
        }

        match c {
            '"' if row.field.is_empty() => {
                in_quotes = true;
                row.touched = true;
            }
            '\n' => {
                row.end_into(&mut rows, row_start);
                line += 1;
                row_start = line;
            }
            c if c == delimiter => {
                row.fields.push(std::mem::take(&mut row.field));
                row.touched = true;
            }
            _ => {
                row.field.push(c);
                row.touched = true;
            }
        }
    }

    if in_quotes {
        return Err(FlakeError::UnterminatedQuote { line: row_start });
    }
    if row.touched {
        row.end_into(&mut rows, row_start);
    }
    Ok(rows)
}

#[derive(Default)]
struct RowBuilder {
    fields: Vec<String>,
    field: String,
    touched: bool,
}

impl RowBuilder {
    /// An untouched row is a blank line and yields zero fields.
    fn end_into(&mut self, rows: &mut Vec<RawRow>, line: usize) {
        if self.touched {
            self.fields.push(std::mem::take(&mut self.field));
        }
        rows.push(RawRow {
            line,
            fields: std::mem::take(&mut self.fields),
        });
        self.touched = false;
    }
}
