//! Logical save/load of a workbook's state.
//!
//! The persisted document is a JSON object `{ "Version": ..., "Cells": {
//! name: { "StringForm": ... } } }`. JSON is an implementation choice for
//! the framing - the schema's meaning (version string plus a map from
//! normalized cell name to its original source text) is what's specified.
//! Loading replays every entry through [`Workbook::set_contents_of_cell`],
//! so contents, graph edges, and cached values are all rebuilt rather than
//! deserialized directly.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::name::{Normalizer, Validator};
use crate::workbook::Workbook;

#[derive(Serialize, Deserialize)]
struct Document {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Cells")]
    cells: HashMap<String, CellEntry>,
}

#[derive(Serialize, Deserialize)]
struct CellEntry {
    #[serde(rename = "StringForm")]
    string_form: String,
}

/// Serialize every nonempty cell's source text, under the workbook's
/// current version, to `path`.
pub fn save(workbook: &Workbook, path: &Path) -> Result<()> {
    let cells = workbook
        .cell_records()
        .map(|(name, source_text)| (name.to_string(), CellEntry { string_form: source_text.to_string() }))
        .collect();
    let document = Document { version: workbook.version().to_string(), cells };

    let file = File::create(path).map_err(|e| Error::SpreadsheetReadWrite(e.to_string()))?;
    serde_json::to_writer_pretty(file, &document).map_err(|e| Error::SpreadsheetReadWrite(e.to_string()))
}

/// Load a workbook from `path`, requiring the stored version to equal
/// `version` exactly. The returned workbook uses `validator` and
/// `normalizer` as its naming policy, applied during replay exactly as it
/// would be on direct calls to `set_contents_of_cell`.
///
/// Only I/O, JSON-parse, and version-mismatch failures are folded into
/// `SpreadsheetReadWrite`; a replay error (an invalid name, a malformed
/// formula, or a cycle baked into the persisted document) surfaces as its
/// own distinct error rather than being rebranded, so that a bug in the
/// document - or in a caller's validator - isn't mistaken for an I/O
/// problem.
pub fn load<V, N, S>(path: &Path, validator: V, normalizer: N, version: S) -> Result<Workbook>
where
    V: Validator + 'static,
    N: Normalizer + 'static,
    S: Into<String>,
{
    let version = version.into();

    let file = File::open(path).map_err(|e| Error::SpreadsheetReadWrite(e.to_string()))?;
    let document: Document =
        serde_json::from_reader(file).map_err(|e| Error::SpreadsheetReadWrite(e.to_string()))?;

    if document.version != version {
        return Err(Error::SpreadsheetReadWrite(format!(
            "version mismatch: file has '{}', expected '{version}'",
            document.version
        )));
    }

    let mut workbook = Workbook::with_policy(validator, normalizer, version);
    for (name, entry) in document.cells {
        workbook.set_contents_of_cell(&name, &entry.string_form)?;
    }
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::name::{always_valid, identity_normalizer};

    #[test]
    fn round_trips_numbers_text_and_formulas() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("roundtrip.json");
        let mut wb = Workbook::with_policy(always_valid, identity_normalizer, "default");
        wb.set_contents_of_cell("A1", "5").unwrap();
        wb.set_contents_of_cell("B1", "=A1*2").unwrap();
        wb.set_contents_of_cell("C1", "note").unwrap();
        save(&wb, &path).unwrap();

        let reloaded = load(&path, always_valid, identity_normalizer, "default").unwrap();
        assert_eq!(reloaded.get_cell_value("A1").unwrap().as_number(), Some(5.0));
        assert_eq!(reloaded.get_cell_value("B1").unwrap().as_number(), Some(10.0));
        assert_eq!(reloaded.get_cell_value("C1").unwrap(), crate::workbook::CellValue::Text("note".to_string()));
    }

    #[test]
    fn mismatched_version_is_rejected() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("version-mismatch.json");
        let wb = Workbook::with_policy(always_valid, identity_normalizer, "v1");
        save(&wb, &path).unwrap();

        let result = load(&path, always_valid, identity_normalizer, "v2");
        assert!(matches!(result, Err(Error::SpreadsheetReadWrite(_))));
    }

    #[test]
    fn missing_file_is_a_spreadsheet_read_write_error() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("does-not-exist.json");
        let result = load(&path, always_valid, identity_normalizer, "default");
        assert!(matches!(result, Err(Error::SpreadsheetReadWrite(_))));
    }

    #[test]
    fn malformed_json_is_a_spreadsheet_read_write_error() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("malformed.json");
        std::fs::write(&path, b"not json").unwrap();
        let result = load(&path, always_valid, identity_normalizer, "default");
        assert!(matches!(result, Err(Error::SpreadsheetReadWrite(_))));
    }

    #[test]
    fn empty_cells_are_not_persisted() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("empty-cells.json");
        let mut wb = Workbook::with_policy(always_valid, identity_normalizer, "default");
        wb.set_contents_of_cell("A1", "5").unwrap();
        wb.set_contents_of_cell("A1", "").unwrap();
        save(&wb, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("A1"));
    }
}
