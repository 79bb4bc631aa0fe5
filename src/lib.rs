//! sheetcalc - a reactive spreadsheet calculation engine.
//!
//! This crate implements the computational core of a spreadsheet: a named
//! collection of cells, each holding a number, a text literal, or an infix
//! arithmetic formula, where formula cells automatically recompute whenever
//! any cell they transitively depend upon changes.
//!
//! # Architecture
//!
//! - [`formula`] - tokenizer, parser, and shunting-yard evaluator for infix
//!   arithmetic expressions over variable references.
//! - [`graph`] - a directed dependency graph with O(1) forward/reverse
//!   lookup, used to compute safe recomputation orders and detect cycles.
//! - [`workbook`] - ties cells to the graph: enforces acyclicity on every
//!   write with rollback-on-cycle semantics, and recomputes affected cells
//!   in topological order.
//! - [`persistence`] - logical save/load of a workbook to a JSON document.
//!
//! # Example
//!
//! ```rust
//! use sheetcalc::Workbook;
//!
//! let mut wb = Workbook::new();
//! wb.set_contents_of_cell("A1", "5").unwrap();
//! wb.set_contents_of_cell("B1", "=A1-2").unwrap();
//! wb.set_contents_of_cell("C1", "=A1+B1").unwrap();
//!
//! assert_eq!(wb.get_cell_value("C1").unwrap().as_number(), Some(8.0));
//! ```

pub mod error;
pub mod formula;
pub mod graph;
pub mod name;
pub mod persistence;
pub mod workbook;

pub use error::{Error, Result};
pub use formula::Formula;
pub use graph::DependencyGraph;
pub use workbook::{CellContents, CellValue, Workbook};
