use std::collections::{BTreeSet, HashMap, HashSet};

use sheetcalc_core::Address;

/// Tracks references between cells
///
/// Both directions are kept in step by [`DependencyGraph::set_dependencies`],
/// so for every forward edge `X -> Y` there is exactly one backward edge
/// `Y -> X`. Edges are keyed by address and survive the removal of the cell
/// at either end.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DependencyGraph {
    /// Maps a cell to the cells it reads (forward edges)
    /// e.g., if A1 = B1 + C1, then dependencies[A1] = {B1, C1}
    dependencies: HashMap<Address, BTreeSet<Address>>,

    /// Maps a cell to the cells that read it (backward edges)
    /// e.g., if A1 = B1 + C1, then dependents[B1] contains A1
    dependents: HashMap<Address, BTreeSet<Address>>,
}

/// One level of the explicit depth-first stack used by [`DependencyGraph::find_cycle`]
struct Frame {
    address: Address,
    children: Vec<Address>,
    next: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the forward edges of `cell`, updating backward edges to match
    ///
    /// Backward edges are dropped only for addresses missing from `deps`.
    pub fn set_dependencies(&mut self, cell: Address, deps: BTreeSet<Address>) {
        if let Some(old_deps) = self.dependencies.get(&cell) {
            for dep in old_deps.difference(&deps) {
                if let Some(dependents) = self.dependents.get_mut(dep) {
                    dependents.remove(&cell);
                    if dependents.is_empty() {
                        self.dependents.remove(dep);
                    }
                }
            }
        }

        for dep in &deps {
            self.dependents.entry(*dep).or_default().insert(cell);
        }

        if deps.is_empty() {
            self.dependencies.remove(&cell);
        } else {
            self.dependencies.insert(cell, deps);
        }
    }

    /// Remove the forward edges of `cell`; cells reading it keep their edges
    pub fn remove_cell(&mut self, cell: Address) {
        self.set_dependencies(cell, BTreeSet::new());
    }

    /// Cells that directly read the given cell
    pub fn get_direct_dependents(&self, cell: Address) -> Option<&BTreeSet<Address>> {
        self.dependents.get(&cell)
    }

    /// Cells the given cell directly reads
    pub fn get_direct_dependencies(&self, cell: Address) -> Option<&BTreeSet<Address>> {
        self.dependencies.get(&cell)
    }

    /// Look for a cycle that giving `cell` the forward edges `deps` would close
    ///
    /// Walks forward edges depth-first with an explicit stack. An address is
    /// a cycle only when it shows up again on the current path; reaching the
    /// same cell through two different paths (a diamond) is fine. Returns the
    /// offending path, starting and ending at the repeated address.
    pub fn find_cycle(&self, cell: Address, deps: &BTreeSet<Address>) -> Option<Vec<Address>> {
        let mut on_path: HashSet<Address> = HashSet::new();
        // Fully explored addresses; no cycle can run through them.
        let mut finished: HashSet<Address> = HashSet::new();
        let mut stack = vec![Frame {
            address: cell,
            children: deps.iter().copied().collect(),
            next: 0,
        }];
        on_path.insert(cell);

        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.next) else {
                on_path.remove(&frame.address);
                finished.insert(frame.address);
                stack.pop();
                continue;
            };
            frame.next += 1;

            if on_path.contains(&child) {
                let start = stack
                    .iter()
                    .position(|f| f.address == child)
                    .unwrap_or_default();
                let mut path: Vec<Address> = stack[start..].iter().map(|f| f.address).collect();
                path.push(child);
                return Some(path);
            }
            if finished.contains(&child) {
                continue;
            }

            let children = self
                .get_direct_dependencies(child)
                .map(|deps| deps.iter().copied().collect())
                .unwrap_or_default();
            on_path.insert(child);
            stack.push(Frame {
                address: child,
                children,
                next: 0,
            });
        }

        None
    }
}
