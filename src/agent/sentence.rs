#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A logical statement of the form "exactly `count` of these cells are mines".

use crate::agent::cell::Cell;
use crate::agent::error::InferenceError;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

static NO_CELLS: BTreeSet<Cell> = BTreeSet::new();

/// Exactly `count` members of `cells` are mines.
///
/// Cells are kept in a `BTreeSet`, so equality and hashing are structural
/// over a canonical sorted representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    /// Creates a sentence without checking `count <= |cells|`.
    pub fn new<I: IntoIterator<Item = Cell>>(cells: I, count: usize) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    /// Creates a sentence, rejecting counts outside `[0, |cells|]`.
    ///
    /// # Errors
    ///
    /// `InferenceError::InvariantViolation` if the count is negative or larger
    /// than the number of cells.
    pub fn checked(cells: BTreeSet<Cell>, count: i64, context: &'static str) -> Result<Self, InferenceError> {
        match usize::try_from(count) {
            Ok(n) if n <= cells.len() => Ok(Self { cells, count: n }),
            _ => Err(InferenceError::InvariantViolation {
                count,
                cells: cells.len(),
                context,
            }),
        }
    }

    /// The cells this sentence talks about.
    #[must_use]
    pub const fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// Number of mines among [`cells`](Self::cells).
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// `0 <= count <= |cells|`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.count <= self.cells.len()
    }

    /// Every cell, if the count says they are all mines; otherwise nothing.
    #[must_use]
    pub fn known_mines(&self) -> &BTreeSet<Cell> {
        if self.count == self.cells.len() {
            &self.cells
        } else {
            &NO_CELLS
        }
    }

    /// Every cell, if the count is zero; otherwise nothing.
    #[must_use]
    pub fn known_safes(&self) -> &BTreeSet<Cell> {
        if self.count == 0 {
            &self.cells
        } else {
            &NO_CELLS
        }
    }

    /// Removes a cell known to be a mine, taking its mine out of the count.
    ///
    /// Returns whether the sentence changed.
    ///
    /// # Errors
    ///
    /// `InferenceError::InvariantViolation` if the sentence claimed no mines
    /// but contained `cell`. The cell is still removed and the count left at 0.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if !self.cells.remove(&cell) {
            return Ok(false);
        }

        match self.count.checked_sub(1) {
            Some(count) => {
                self.count = count;
                Ok(true)
            }
            None => Err(InferenceError::InvariantViolation {
                count: -1,
                cells: self.cells.len(),
                context: "mark_mine",
            }),
        }
    }

    /// Removes a cell known to be safe. The count is unchanged.
    ///
    /// Returns whether the sentence changed.
    ///
    /// # Errors
    ///
    /// `InferenceError::InvariantViolation` if every cell was claimed to be a
    /// mine, so dropping a safe one leaves more mines than cells.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if !self.cells.remove(&cell) {
            return Ok(false);
        }

        if self.is_consistent() {
            Ok(true)
        } else {
            Err(InferenceError::InvariantViolation {
                count: i64::try_from(self.count).unwrap_or(i64::MAX),
                cells: self.cells.len(),
                context: "mark_safe",
            })
        }
    }

    /// Forces the count back into `[0, |cells|]`.
    pub fn clamp_count(&mut self) {
        self.count = self.count.min(self.cells.len());
    }

    /// If `other`'s cells are a subset of ours, the cells only we contain
    /// and the (possibly negative) number of mines among them.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Option<(BTreeSet<Cell>, i64)> {
        if !other.cells.is_subset(&self.cells) {
            return None;
        }

        let cells = self.cells.difference(&other.cells).copied().collect();
        let count = i64::try_from(self.count).unwrap_or(i64::MAX)
            - i64::try_from(other.count).unwrap_or(i64::MAX);
        Some((cells, count))
    }
}

impl Display for Sentence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
