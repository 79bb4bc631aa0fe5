//! Unified error type for sheetcalc operations.
//!
//! `InvalidName`, `FormulaFormat`, `CircularReference`, and
//! `SpreadsheetReadWrite` are all surfaced to callers as variants of a
//! single enum. A failed formula *evaluation* is deliberately absent here -
//! it is a value, not an exception, and lives inside
//! [`crate::workbook::CellValue::Error`], propagating lazily through
//! dependent formulas rather than being thrown.
use thiserror::Error;

/// Main error type for sheetcalc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A cell name violated the base regex or the workbook's validator
    /// predicate.
    #[error("invalid cell name: {0}")]
    InvalidName(String),

    /// Formula text was syntactically malformed, referenced an illegal or
    /// disallowed variable, or had mismatched parentheses.
    #[error("malformed formula: {0}")]
    FormulaFormat(String),

    /// A proposed write would create a cycle involving the written cell.
    /// The workbook is guaranteed to be rolled back to its pre-write state
    /// before this error is returned.
    #[error("circular reference detected at cell '{0}'")]
    CircularReference(String),

    /// Any I/O failure, parse failure, or version mismatch encountered
    /// while saving or loading a workbook.
    #[error("spreadsheet read/write error: {0}")]
    SpreadsheetReadWrite(String),
}

/// Result type for sheetcalc operations.
pub type Result<T> = std::result::Result<T, Error>;
