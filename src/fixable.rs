//! Single-slot memoisation cell with a three-state fixation lattice.
//!
//! A [`Fixable`] holds one value together with a [`Fixation`] state. A
//! soft-fixed cell can be force-overwritten and is cleared by a reset; a
//! hard-fixed cell is permanent. Evaluators use soft fixation to memoise
//! intermediate results and to break cycles, and hard fixation to pin
//! constants that must survive resets.

use crate::error::{Error, Result};

/// Fixation state of a [`Fixable`] cell, ordered `Unfixed < Soft < Hard`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fixation {
    /// The cell holds no committed value.
    #[default]
    Unfixed,
    /// The cell is memoised; it may be force-overwritten and a reset clears it.
    Soft,
    /// The cell is pinned; writes fail and resets leave it untouched.
    Hard,
}

/// A value cell with monotonically raisable fixation.
#[derive(Debug, Clone, Default)]
pub struct Fixable<T> {
    value: T,
    fixation: Fixation,
}

impl<T: Default> Fixable<T> {
    /// Creates an unfixed cell holding the default value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` iff the cell is soft- or hard-fixed.
    pub fn fixed(&self) -> bool {
        self.fixation != Fixation::Unfixed
    }

    /// Returns the current fixation state.
    pub fn fixation(&self) -> Fixation {
        self.fixation
    }

    /// Reads the current value regardless of fixation.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Assigns a value.
    ///
    /// Fails if the cell is hard-fixed, or soft-fixed without
    /// `override_soft`.
    pub fn set(&mut self, value: T, override_soft: bool) -> Result<()> {
        match self.fixation {
            Fixation::Hard => Err(Error::Invariant("hard-fixed cell cannot be overwritten")),
            Fixation::Soft if !override_soft => {
                Err(Error::Invariant("soft-fixed cell requires an explicit override"))
            }
            _ => {
                self.value = value;
                Ok(())
            }
        }
    }

    /// Raises the fixation state to `max(current, mode)`.
    pub fn fix(&mut self, mode: Fixation) {
        self.fixation = self.fixation.max(mode);
    }

    /// Assigns a value, then raises the fixation state.
    pub fn fix_value(&mut self, value: T, override_soft: bool, mode: Fixation) -> Result<()> {
        self.set(value, override_soft)?;
        self.fix(mode);
        Ok(())
    }

    /// Restores the cell to `(T::default(), Unfixed)` unless it is hard-fixed,
    /// in which case nothing happens.
    pub fn reset(&mut self) {
        self.reset_to(T::default());
    }

    /// Like [`Fixable::reset`] but restores the given value instead of the
    /// default.
    pub fn reset_to(&mut self, value: T) {
        if self.fixation != Fixation::Hard {
            self.value = value;
            self.fixation = Fixation::Unfixed;
        }
    }
}
