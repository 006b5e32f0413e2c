//! Required-field validation over the row sequence.
//!
//! Validation is a pure scan in display order: it reports every missing
//! required field together with the position of the first offender, so the
//! surface can both highlight invalid rows continuously and block export
//! with the cursor parked on the first problem. It never mutates anything.

use crate::row::{Field, Row, RowKind};

#[must_use]
/// A value counts as blank when it is empty after trimming.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One missing required field on one row.
pub struct Violation {
    /// Position of the row in the sequence.
    pub row_index: usize,
    /// Id of the offending row.
    pub row_id: String,
    /// Kind of the offending row.
    pub kind: RowKind,
    /// The required field that is blank.
    pub field: Field,
}

#[derive(Clone, Debug, Default)]
/// The outcome of a full-sequence validation pass.
pub struct Report {
    /// All violations in sequence order, then field order.
    pub violations: Vec<Violation>,
}

impl Report {
    #[must_use]
    /// The first violation in display order, if any.
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    #[must_use]
    /// True when the sequence is exportable.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[must_use]
/// The required fields of `row` that are currently blank.
pub fn missing_fields(row: &Row) -> Vec<Field> {
    Field::required_for(row.kind)
        .iter()
        .copied()
        .filter(|field| is_blank(row.get(*field)))
        .collect()
}

#[must_use]
/// True iff every required field of `row` is non-blank.
pub fn row_is_valid(row: &Row) -> bool {
    missing_fields(row).is_empty()
}

#[must_use]
/// Scan the whole sequence in order and collect every violation.
pub fn validate_all(rows: &[Row]) -> Report {
    let mut violations = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        for field in missing_fields(row) {
            violations.push(Violation {
                row_index,
                row_id: row.id.clone(),
                kind: row.kind,
                field,
            });
        }
    }
    Report { violations }
}

#[cfg(test)]
#[path = "tests/validate.rs"]
mod tests;
