//! Column tables written by the Fortran solvers
//!
//! Rows are split on whitespace first. When a row does not have one token
//! per column (touching numbers, blank cells) the fixed column specs are
//! used instead.

use blade_loads::propeller::SpanTable;

use crate::error::{SessionError, SessionResult};

/// Character range `[start, end)` of one column
pub type ColumnSpec = (usize, usize);

/// Text of one fixed-width cell, empty when the line is too short
pub fn cell(line: &str, (start, end): ColumnSpec) -> &str {
    let end = end.min(line.len());
    if start >= end || !line.is_char_boundary(start) || !line.is_char_boundary(end) {
        return "";
    }
    line[start..end].trim()
}

/// Parse a Fortran number, accepting `D` exponents
pub fn number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
}

/// Numeric row with exactly `columns` values, or `None`
pub fn parse_row(line: &str, specs: &[ColumnSpec], columns: usize) -> Option<Vec<f64>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() == columns {
        if let Some(row) = tokens.iter().map(|t| number(t)).collect::<Option<Vec<_>>>() {
            return Some(row);
        }
    }
    if specs.len() != columns {
        return None;
    }
    specs.iter().map(|&spec| number(cell(line, spec))).collect()
}

/// Read the table whose header is the first line accepted by `is_header`.
///
/// Lines between the header and the first row that do not parse (dashes,
/// units) are skipped; the table ends at the first such line after a row.
pub fn parse_table(
    text: &str,
    specs: &[ColumnSpec],
    is_header: impl Fn(&[&str]) -> bool,
) -> SessionResult<SpanTable> {
    let mut lines = text.lines();
    let header = lines
        .by_ref()
        .find(|line| is_header(&line.split_whitespace().collect::<Vec<_>>()))
        .ok_or_else(|| SessionError::Parse("no table header found".to_string()))?;

    let tokens: Vec<&str> = header.split_whitespace().collect();
    let names: Vec<String> = if tokens.len() == specs.len() || specs.is_empty() {
        tokens.iter().map(|t| t.to_string()).collect()
    } else {
        specs.iter().map(|&spec| cell(header, spec).to_string()).collect()
    };

    let mut table = SpanTable::new(names);
    for line in lines {
        match parse_row(line, specs, table.columns.len()) {
            Some(row) => table
                .push_row(row)
                .map_err(|e| SessionError::Parse(e.to_string()))?,
            None if table.is_empty() => continue,
            None => break,
        }
    }
    Ok(table)
}
