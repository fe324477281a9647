//! Column-aligned table rendering
//!
//! Every column is as wide as its header label. Values are right-aligned
//! and each field is followed by a single space.

use std::io::{self, Write};

/// Writes a header and rows to any `Write` sink
pub struct Reporter<W: Write> {
    out: W,
    precision: Option<usize>,
}

impl Reporter<io::Stdout> {
    pub fn stdout(precision: Option<usize>) -> Self {
        Self::new(io::stdout(), precision)
    }
}

impl<W: Write> Reporter<W> {
    /// `precision` of `None` renders the shortest exact representation
    pub fn new(out: W, precision: Option<usize>) -> Self {
        Self { out, precision }
    }

    /// Print the labels followed by a dash rule
    pub fn render_header(&mut self, header: &[String]) -> io::Result<()> {
        let mut width = 0;
        for column in header {
            write!(self.out, "{} ", column)?;
            width += column.len() + 1;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{}", "-".repeat(width.saturating_sub(1)))?;
        self.out.flush()
    }

    /// Print one value per column, right-aligned to the label width
    pub fn render_row(&mut self, header: &[String], values: &[f64]) -> io::Result<()> {
        for (column, value) in header.iter().zip(values) {
            let text = format_value(*value, self.precision);
            write!(self.out, "{:>width$} ", text, width = column.len())?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render a sample value
///
/// Without a precision this is `f64`'s `Display`: the shortest string that
/// parses back to the same value, so `42.0` becomes `42`.
pub fn format_value(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) => format!("{:.*}", digits, value),
        None => value.to_string(),
    }
}
