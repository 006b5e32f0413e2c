//! One-way CSV projection of the row sequence.
//!
//! Hierarchy is rendered as indentation in a synthetic structure column;
//! columns that do not apply to a row's kind are emitted blank so the column
//! set stays rectangular. Every field is quoted with embedded quotes doubled,
//! rows end in CRLF, and the output starts with a UTF-8 byte-order marker so
//! spreadsheet tools detect the encoding.

use crate::row::{Field, Row};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io;

/// UTF-8 byte-order marker prepended to the projection.
pub const BOM: &[u8] = b"\xef\xbb\xbf";

fn structure_text(row: &Row) -> String {
    let indent = "  ".repeat(row.depth() - 1);
    format!("{indent}{}", row.display_name())
}

/// Project the row sequence into delimited text.
///
/// Column order is the structure column followed by every grid field in
/// on-screen order. The projection is not gated on validation; blank required
/// fields are emitted as empty cells.
///
/// # Errors
///
/// Returns an error if the CSV writer fails, which for an in-memory buffer
/// indicates a serialisation bug rather than an I/O condition.
pub fn project(rows: &[Row]) -> io::Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(BOM.to_vec());

    let mut header = vec!["Structure".to_string()];
    header.extend(Field::ALL.iter().map(|field| field.label().to_string()));
    writer.write_record(&header).map_err(io_error)?;

    for row in rows {
        let mut record = vec![structure_text(row)];
        for field in Field::ALL {
            if row.editable(field) {
                record.push(row.get(field).to_string());
            } else {
                record.push(String::new());
            }
        }
        writer.write_record(&record).map_err(io_error)?;
    }

    let bytes = writer.into_inner().map_err(io_error)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn io_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::other(err.to_string())
}

#[cfg(test)]
#[path = "../tests/table.rs"]
mod tests;
