//! The workbook ties named cells to a [`DependencyGraph`], enforcing
//! acyclicity on every write and recomputing affected cells in topological
//! order.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::graph::DependencyGraph;
use crate::name::{self, always_valid, identity_normalizer, Normalizer, Validator};

/// A cell's stored intent: what the user typed, classified.
#[derive(Debug, Clone)]
pub enum CellContents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

/// A cell's cached, derived result.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(String),
}

impl CellValue {
    /// The numeric payload, or `None` if this value is text or an error.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CellRecord {
    contents: CellContents,
    value: CellValue,
    source_text: String,
}

/// A named collection of reactive cells.
///
/// Holds a validator and a normalizer that together define the cell-naming
/// policy (see [`crate::name`]), applied identically to raw cell names and
/// to every variable reference inside a formula.
pub struct Workbook {
    cells: HashMap<String, CellRecord>,
    graph: DependencyGraph,
    validator: Box<dyn Fn(&str) -> bool>,
    normalizer: Box<dyn Fn(&str) -> String>,
    version: String,
    dirty: bool,
}

impl Workbook {
    /// A workbook with the default policy: any well-formed name is valid,
    /// names are stored as typed, and the version is `"default"`.
    pub fn new() -> Self {
        Self::with_policy(always_valid, identity_normalizer, "default")
    }

    /// A workbook with a caller-supplied validator, normalizer, and
    /// version string.
    pub fn with_policy<V, N, S>(validator: V, normalizer: N, version: S) -> Self
    where
        V: Validator + 'static,
        N: Normalizer + 'static,
        S: Into<String>,
    {
        Workbook {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            validator: Box::new(validator),
            normalizer: Box::new(normalizer),
            version: version.into(),
            dirty: false,
        }
    }

    /// Whether any successful content change has occurred since the last
    /// `save` (or since construction).
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The canonical write operation. Classifies `text`, stages the new
    /// contents and dependency edges, checks for a cycle, and - if
    /// acyclic - recomputes every affected cell. Returns the recomputation
    /// order (the written cell first).
    ///
    /// On `CircularReference`, the workbook is restored to exactly its
    /// pre-call state: neither `contents`, `value`, nor the edge set
    /// change.
    pub fn set_contents_of_cell(&mut self, name: &str, text: &str) -> Result<Vec<String>> {
        let n = self.validate_and_normalize(name)?;
        let contents = self.classify(text)?;

        let prior_record = self.cells.get(&n).cloned();
        let prior_dependees: Vec<String> = self.graph.dependees(&n).map(str::to_string).collect();

        let new_dependees: Vec<String> = match &contents {
            CellContents::Formula(f) => f.variables().to_vec(),
            _ => Vec::new(),
        };
        self.graph.replace_dependees(&n, new_dependees);
        self.cells.insert(
            n.clone(),
            CellRecord { contents, value: CellValue::Text(String::new()), source_text: text.to_string() },
        );

        let order = match topological_order(&self.graph, &n) {
            Ok(order) => order,
            Err(cycle_at) => {
                self.graph.replace_dependees(&n, prior_dependees);
                match prior_record {
                    Some(record) => {
                        self.cells.insert(n.clone(), record);
                    },
                    None => {
                        self.cells.remove(&n);
                    },
                }
                return Err(Error::CircularReference(cycle_at));
            },
        };

        for cell_name in &order {
            self.recompute_cell(cell_name);
        }
        self.dirty = true;
        Ok(order)
    }

    /// Current contents of `name`; an absent or never-written cell reads
    /// as `Text("")`.
    pub fn get_cell_contents(&self, name: &str) -> Result<CellContents> {
        let n = self.validate_and_normalize(name)?;
        Ok(self.cells.get(&n).map(|r| r.contents.clone()).unwrap_or_else(|| CellContents::Text(String::new())))
    }

    /// Current cached value of `name`; an absent cell reads as `Text("")`.
    pub fn get_cell_value(&self, name: &str) -> Result<CellValue> {
        let n = self.validate_and_normalize(name)?;
        Ok(self.cells.get(&n).map(|r| r.value.clone()).unwrap_or_else(|| CellValue::Text(String::new())))
    }

    /// The exact text the caller supplied to `set_contents_of_cell`, used
    /// by [`crate::persistence`] to reconstruct a faithful save file.
    pub fn get_cell_source_text(&self, name: &str) -> Result<String> {
        let n = self.validate_and_normalize(name)?;
        Ok(self.cells.get(&n).map(|r| r.source_text.clone()).unwrap_or_default())
    }

    /// All cells whose contents is not the empty text, in no particular
    /// order.
    pub fn get_names_of_all_nonempty_cells(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|(_, r)| !matches!(&r.contents, CellContents::Text(s) if s.is_empty()))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn validate_and_normalize(&self, name: &str) -> Result<String> {
        if !name::is_well_formed(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        let n = (self.normalizer)(name);
        if !name::is_well_formed(&n) || !(self.validator)(&n) {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(n)
    }

    fn classify(&self, text: &str) -> Result<CellContents> {
        if let Ok(number) = fast_float2::parse::<f64, _>(text) {
            return Ok(CellContents::Number(number));
        }
        if let Some(rest) = text.strip_prefix('=') {
            let formula = Formula::new(rest, &self.normalizer, &self.validator)?;
            return Ok(CellContents::Formula(formula));
        }
        Ok(CellContents::Text(text.to_string()))
    }

    fn recompute_cell(&mut self, name: &str) {
        let contents = match self.cells.get(name) {
            Some(record) => record.contents.clone(),
            None => return,
        };
        let value = match contents {
            CellContents::Number(n) => CellValue::Number(n),
            CellContents::Text(s) => CellValue::Text(s),
            CellContents::Formula(f) => {
                let cells = &self.cells;
                let lookup = |var: &str| match cells.get(var).map(|r| &r.value) {
                    Some(CellValue::Number(n)) => Some(*n),
                    _ => None,
                };
                match f.evaluate(&lookup) {
                    Ok(n) => CellValue::Number(n),
                    Err(e) => CellValue::Error(e.0),
                }
            },
        };
        if let Some(record) = self.cells.get_mut(name) {
            record.value = value;
        }
    }

    /// Save this workbook to `path` in the logical schema described in
    /// [`crate::persistence`], clearing the dirty flag on success.
    pub fn save(&mut self, path: &std::path::Path) -> Result<()> {
        crate::persistence::save(self, path)?;
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn cell_records(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .filter(|(_, r)| !matches!(&r.contents, CellContents::Text(s) if s.is_empty()))
            .map(|(name, record)| (name.as_str(), record.source_text.as_str()))
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first traversal over `dependents`, starting at `start`, producing
/// a valid recomputation order (the reverse of finish order). An explicit
/// stack avoids recursion depth limits on long dependency chains.
///
/// Returns `Err(name)` naming the cell at which a `visiting` node was
/// re-encountered - a cycle involving `start`.
fn topological_order(graph: &DependencyGraph, start: &str) -> std::result::Result<Vec<String>, String> {
    enum Mark {
        Visiting,
        Visited,
    }

    struct Frame {
        node: String,
        children: Vec<String>,
        next: usize,
    }

    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut finish_order: Vec<String> = Vec::new();
    let mut stack: Vec<Frame> = vec![Frame {
        node: start.to_string(),
        children: graph.dependents(start).map(String::from).collect(),
        next: 0,
    }];
    marks.insert(start.to_string(), Mark::Visiting);

    while let Some(frame) = stack.last_mut() {
        if frame.next < frame.children.len() {
            let child = frame.children[frame.next].clone();
            frame.next += 1;
            match marks.get(&child) {
                Some(Mark::Visiting) => return Err(child),
                Some(Mark::Visited) => continue,
                None => {
                    marks.insert(child.clone(), Mark::Visiting);
                    let grandchildren: Vec<String> = graph.dependents(&child).map(String::from).collect();
                    stack.push(Frame { node: child, children: grandchildren, next: 0 });
                },
            }
        } else {
            let done = stack.pop().expect("loop condition guarantees a frame");
            marks.insert(done.node.clone(), Mark::Visited);
            finish_order.push(done.node);
        }
    }

    finish_order.reverse();
    Ok(finish_order)
}
