use std::collections::{BTreeSet, HashMap};
use std::fmt;

use sheetcalc_core::{Address, CellValue, Size};

use crate::bounds::BoundsTracker;
use crate::cell::{Cell, CellContent};
use crate::dependency::DependencyGraph;
use crate::error::{Result, SheetError};

/// A single sheet with sparse storage for cells
///
/// The sheet owns every cell, the reference graph between them and the
/// printable bounds. All mutation goes through [`Sheet::set_cell`] and
/// [`Sheet::clear_cell`], which either apply fully or leave the sheet
/// untouched.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Address, Cell>,
    graph: DependencyGraph,
    bounds: BoundsTracker,
}

fn check_position(pos: Address) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::InvalidPosition(pos))
    }
}

impl Sheet {
    /// Create a new empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of a cell from user input
    ///
    /// Input starting with `=` (and longer than that) is parsed as a formula.
    /// A formula that would read its own result, directly or through other
    /// cells, is rejected with [`SheetError::CircularDependency`].
    pub fn set_cell(&mut self, pos: Address, text: &str) -> Result<()> {
        check_position(pos)?;

        let content = CellContent::parse(text)?;
        let deps = content.referenced_cells();

        // The new edges are checked before anything is installed, so a
        // rejected formula needs no rollback.
        if let Some(cycle) = self.graph.find_cycle(pos, &deps) {
            tracing::warn!(cell = %pos, ?cycle, "rejected formula with circular reference");
            return Err(SheetError::CircularDependency {
                position: pos,
                cycle,
            });
        }

        let created = match self.cells.get_mut(&pos) {
            Some(cell) => {
                cell.set_content(content);
                false
            }
            None => {
                self.cells.insert(pos, Cell::new(content));
                true
            }
        };

        let invalidated = self.invalidate_dependents(pos);
        self.link(pos, deps);
        if created {
            self.bounds.insert(pos);
        }

        tracing::debug!(cell = %pos, created, invalidated, "cell set");
        Ok(())
    }

    /// Get a view of the cell at `pos`, if one exists
    pub fn get_cell(&self, pos: Address) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;

        Ok(self.cells.get(&pos).map(|cell| CellView {
            sheet: self,
            address: pos,
            cell,
        }))
    }

    /// Remove the cell at `pos`
    ///
    /// Cells that reference `pos` keep their formulas and read it as zero.
    pub fn clear_cell(&mut self, pos: Address) -> Result<()> {
        check_position(pos)?;

        if !self.cells.contains_key(&pos) {
            return Ok(());
        }

        let invalidated = self.invalidate_dependents(pos);
        self.cells.remove(&pos);
        self.graph.remove_cell(pos);
        self.bounds.remove(pos);

        tracing::debug!(cell = %pos, invalidated, "cell cleared");
        Ok(())
    }

    /// Smallest rectangle covering every existing cell
    pub fn printable_size(&self) -> Size {
        self.bounds.size()
    }

    /// Get the value of a cell (numeric zero for cells that do not exist)
    ///
    /// Formula inputs are resolved bottom-up with an explicit stack, so each
    /// evaluation only reads values that are already known. Chain length is
    /// not limited by the call stack.
    pub fn get_cell_value(&self, pos: Address) -> CellValue {
        // Results of this read, errors included; finite numbers are also
        // memoized in the cells themselves.
        let mut resolved: HashMap<Address, CellValue> = HashMap::new();
        let mut stack = vec![(pos, false)];

        while let Some((address, inputs_ready)) = stack.pop() {
            if resolved.contains_key(&address) {
                continue;
            }
            let Some(cell) = self.cells.get(&address) else {
                continue;
            };
            if !cell.needs_evaluation() {
                continue;
            }

            if inputs_ready {
                let value = cell.value(|input| self.known_value(input, &resolved));
                resolved.insert(address, value);
            } else {
                stack.push((address, true));
                if let Some(inputs) = self.graph.get_direct_dependencies(address) {
                    stack.extend(
                        inputs
                            .iter()
                            .filter(|&input| !resolved.contains_key(input))
                            .map(|&input| (input, false)),
                    );
                }
            }
        }

        self.known_value(pos, &resolved)
    }

    /// Value of a cell that needs no further evaluation
    fn known_value(&self, pos: Address, resolved: &HashMap<Address, CellValue>) -> CellValue {
        if let Some(value) = resolved.get(&pos) {
            return value.clone();
        }
        match self.cells.get(&pos) {
            // Every input was resolved first, so this never evaluates
            Some(cell) => cell.value(|_| CellValue::Number(0.0)),
            None => CellValue::Number(0.0),
        }
    }

    /// Get the number of stored cells, implicitly created ones included
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Write every value in the printable area, one tab-separated line per row
    pub fn print_values<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.print_with(out, |view| view.value().to_string())
    }

    /// Write every cell text in the printable area, one tab-separated line per row
    pub fn print_texts<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.print_with(out, |view| view.text())
    }

    /// Render [`Sheet::print_values`] into a new string
    pub fn values_to_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.print_values(&mut out);
        out
    }

    /// Render [`Sheet::print_texts`] into a new string
    pub fn texts_to_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.print_texts(&mut out);
        out
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> fmt::Result
    where
        W: fmt::Write,
        F: Fn(&CellView<'_>) -> String,
    {
        let size = self.printable_size();

        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_char('\t')?;
                }
                let address = Address::new(row, col);
                if let Some(cell) = self.cells.get(&address) {
                    let view = CellView {
                        sheet: self,
                        address,
                        cell,
                    };
                    out.write_str(&render(&view))?;
                }
            }
            out.write_char('\n')?;
        }

        Ok(())
    }

    /// Register `pos` as reading `deps`, creating empty cells for any
    /// referenced address that has none yet
    fn link(&mut self, pos: Address, deps: BTreeSet<Address>) {
        for &dep in &deps {
            if !self.cells.contains_key(&dep) {
                self.cells.insert(dep, Cell::default());
                self.bounds.insert(dep);
                tracing::debug!(cell = %dep, referenced_by = %pos, "materialized empty cell");
            }
        }
        self.graph.set_dependencies(pos, deps);
    }

    /// Drop the memoized value of `pos` and of everything computed from it
    ///
    /// Walks backward edges with an explicit stack. A branch stops at a cell
    /// with no memoized value: nothing downstream of it can hold one either.
    /// Returns the number of dependent caches cleared.
    fn invalidate_dependents(&mut self, pos: Address) -> usize {
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.invalidate_cache();
        }

        let mut stack: Vec<Address> = self
            .graph
            .get_direct_dependents(pos)
            .map(|dependents| dependents.iter().copied().collect())
            .unwrap_or_default();
        let mut invalidated = 0;

        while let Some(address) = stack.pop() {
            let Some(cell) = self.cells.get_mut(&address) else {
                continue;
            };
            if !cell.has_cache() {
                continue;
            }
            cell.invalidate_cache();
            invalidated += 1;

            if let Some(dependents) = self.graph.get_direct_dependents(address) {
                stack.extend(dependents.iter().copied());
            }
        }

        invalidated
    }
}

/// Read-only handle to a stored cell
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    address: Address,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn content(&self) -> &'a CellContent {
        self.cell.content()
    }

    pub fn text(&self) -> String {
        self.cell.text()
    }

    /// Current value, computing (and memoizing) formulas as needed
    pub fn value(&self) -> CellValue {
        self.sheet.get_cell_value(self.address)
    }

    /// Cells this one reads, in row-major order
    pub fn referenced_cells(&self) -> Vec<Address> {
        self.cell.referenced_cells().into_iter().collect()
    }

    /// Cells that read this one, in row-major order
    pub fn dependent_cells(&self) -> Vec<Address> {
        self.sheet
            .graph
            .get_direct_dependents(self.address)
            .map(|dependents| dependents.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_referenced(&self) -> bool {
        self.sheet
            .graph
            .get_direct_dependents(self.address)
            .is_some_and(|dependents| !dependents.is_empty())
    }
}
