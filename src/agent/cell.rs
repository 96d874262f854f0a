#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Board coordinates and the geometry needed to enumerate neighbourhoods.

use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// The (up to 8) on-board neighbours of a cell.
pub type Neighbourhood = SmallVec<[Cell; 8]>;

/// An immutable `(row, col)` position on the board.
///
/// Ordered row-major so that iteration over sets of cells is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Cell {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl Cell {
    /// Creates a new cell.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Height and width of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Dimensions {
    /// Creates a new set of board dimensions.
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Total number of cells on the board.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.height * self.width
    }

    /// Whether the board has no cells at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `cell` lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Row-major index of `cell`, used by flat board storage.
    #[must_use]
    pub const fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    /// Every cell on the board, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
    }

    /// The cells within one row and one column of `cell`, excluding `cell`
    /// itself and anything off the board.
    #[must_use]
    pub fn neighbours(&self, cell: Cell) -> Neighbourhood {
        let mut out = Neighbourhood::new();
        if !self.contains(cell) {
            return out;
        }

        let rows = cell.row.saturating_sub(1)..=(cell.row + 1).min(self.height - 1);
        let cols = cell.col.saturating_sub(1)..=(cell.col + 1).min(self.width - 1);

        for row in rows {
            for col in cols.clone() {
                let other = Cell::new(row, col);
                if other != cell {
                    out.push(other);
                }
            }
        }
        out
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}
