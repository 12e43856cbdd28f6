use std::collections::BTreeMap;

use sheetcalc_core::{Address, Size};

/// Multiset of occupied extents along one axis
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct AxisCounts(BTreeMap<i32, usize>);

impl AxisCounts {
    fn add(&mut self, extent: i32) {
        *self.0.entry(extent).or_insert(0) += 1;
    }

    fn remove(&mut self, extent: i32) {
        if let Some(count) = self.0.get_mut(&extent) {
            *count -= 1;
            if *count == 0 {
                self.0.remove(&extent);
            }
        }
    }

    fn max(&self) -> i32 {
        self.0.last_key_value().map(|(&extent, _)| extent).unwrap_or(0)
    }
}

/// Tracks the printable rectangle of a sheet
///
/// Every materialized cell contributes `row + 1` and `col + 1` once. The
/// rectangle only shrinks when the last occupant of the outermost row or
/// column goes away.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoundsTracker {
    rows: AxisCounts,
    cols: AxisCounts,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly materialized cell
    pub fn insert(&mut self, address: Address) {
        self.rows.add(address.row + 1);
        self.cols.add(address.col + 1);
    }

    /// Forget a removed cell
    pub fn remove(&mut self, address: Address) {
        self.rows.remove(address.row + 1);
        self.cols.remove(address.col + 1);
    }

    pub fn size(&self) -> Size {
        Size::new(self.rows.max(), self.cols.max())
    }
}
