//! Cycle-safe memoised evaluation over a network.
//!
//! The engine separates two concerns. A [`Grid`] holds one [`Fixable`] cell
//! per network slot and implements the memoisation protocol: soft-fix a
//! default before recursing (so a back-edge reads the default instead of
//! recursing forever), force-overwrite once the real value is known, and
//! hard-pin constants that survive resets. The pass types
//! ([`ForwardPass`], [`BackwardPass`]) supply the per-neuron evaluation rule
//! and thread all shared state through explicit references.

mod backward;
mod forward;

pub use backward::{BackwardPass, BackwardResult, ForwardMap};
pub use forward::{ForwardPass, ForwardResult};

use crate::error::{Error, Result};
use crate::fixable::{Fixable, Fixation};

/// One memoisation cell per network slot, plus an O(1) reset skip.
///
/// The default value of `R` must be the additive identity of the aggregation
/// the owning pass performs: it is what a feedback edge contributes when a
/// cycle is broken.
#[derive(Debug)]
pub struct Grid<R> {
    cells: Vec<Fixable<R>>,
    /// Whether anything was soft-written since the last reset.
    dirty: bool,
}

impl<R: Copy + Default> Grid<R> {
    /// Creates a grid of `len` unfixed cells.
    pub fn new(len: usize) -> Self {
        let mut cells = Vec::with_capacity(len);
        cells.resize_with(len, Fixable::new);
        Self { cells, dirty: false }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` iff the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resets every cell to the unfixed default. Hard-pinned cells are left
    /// untouched. Skipped entirely when nothing was written since the last
    /// reset.
    pub fn reset(&mut self) {
        if !self.dirty {
            return;
        }
        for cell in &mut self.cells {
            cell.reset();
        }
        self.dirty = false;
    }

    /// Returns the memoised value, or `None` if the cell is unfixed.
    pub fn cached(&self, index: usize) -> Result<Option<R>> {
        let cell = self.cell(index)?;
        Ok(cell.fixed().then(|| *cell.get()))
    }

    /// Const read of a fixed cell. A read through this path must not trigger
    /// evaluation, so an unfixed cell is an invariant violation.
    pub fn value(&self, index: usize) -> Result<R> {
        let cell = self.cell(index)?;
        if !cell.fixed() {
            return Err(Error::Invariant("const read of an unfixed cell"));
        }
        Ok(*cell.get())
    }

    /// Soft-fixes the default value ahead of evaluation, so that a cycle
    /// reaching this cell recursively reads the default instead of
    /// re-entering.
    pub fn begin(&mut self, index: usize) -> Result<()> {
        self.dirty = true;
        self.cell_mut(index)?.fix_value(R::default(), false, Fixation::Soft)
    }

    /// Overwrites the placeholder left by [`Grid::begin`] with the real
    /// value.
    pub fn complete(&mut self, index: usize, value: R) -> Result<()> {
        self.dirty = true;
        self.cell_mut(index)?.set(value, true)
    }

    /// Sets and soft-fixes a cell directly; used by drivers to seed input
    /// and output cells before a sweep.
    pub fn put(&mut self, index: usize, value: R) -> Result<()> {
        self.dirty = true;
        self.cell_mut(index)?.fix_value(value, false, Fixation::Soft)
    }

    /// Hard-fixes a cell to a constant that survives every reset.
    pub fn pin(&mut self, index: usize, value: R) -> Result<()> {
        self.cell_mut(index)?.fix_value(value, false, Fixation::Hard)
    }

    fn cell(&self, index: usize) -> Result<&Fixable<R>> {
        self.cells.get(index).ok_or(Error::Index { index })
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut Fixable<R>> {
        self.cells.get_mut(index).ok_or(Error::Index { index })
    }
}
