#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The board the agent plays against: where the mines are and what each
//! revealed cell reports.

use crate::agent::cell::{Cell, Dimensions};
use bit_vec::BitVec;
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};
use std::path::Path;
use thiserror::Error;

/// Everything the game loop needs to know about a board.
pub trait Board {
    fn dimensions(&self) -> Dimensions;
    fn is_mine(&self, cell: Cell) -> bool;
    /// Number of mines among the on-board neighbours of `cell`.
    fn nearby_mines(&self, cell: Cell) -> usize;
    /// Every mine on the board.
    fn mines(&self) -> FxHashSet<Cell>;
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("cannot place {mines} mines on a {dimensions} board")]
    TooManyMines { mines: usize, dimensions: Dimensions },

    #[error("layout has no cells")]
    Empty,

    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unexpected character {found:?}")]
    UnexpectedChar { line: usize, found: char },

    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
}

/// A rectangular board with a fixed set of mines, stored as a bit per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minefield {
    dimensions: Dimensions,
    mines: BitVec,
    count: usize,
}

impl Minefield {
    /// An empty board.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            mines: BitVec::from_elem(dimensions.len(), false),
            count: 0,
        }
    }

    /// A board with exactly `mines` mines placed uniformly at random.
    ///
    /// # Errors
    ///
    /// `BoardError::TooManyMines` if there are fewer cells than mines.
    pub fn random(dimensions: Dimensions, mines: usize, rng: &mut fastrand::Rng) -> Result<Self, BoardError> {
        if mines > dimensions.len() {
            return Err(BoardError::TooManyMines { mines, dimensions });
        }

        let mut field = Self::new(dimensions);
        while field.count < mines {
            let cell = Cell::new(rng.usize(..dimensions.height), rng.usize(..dimensions.width));
            field.place(cell);
        }
        Ok(field)
    }

    /// Builds a board from explicit mine positions; off-board cells are ignored.
    #[must_use]
    pub fn with_mines<I: IntoIterator<Item = Cell>>(dimensions: Dimensions, mines: I) -> Self {
        let mut field = Self::new(dimensions);
        for cell in mines {
            field.place(cell);
        }
        field
    }

    /// Parses a text layout: one row per line, `*` or `X` for a mine and `.`
    /// for a clear cell. Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Rows of different widths, unknown characters, or no rows at all.
    pub fn from_layout(input: &str) -> Result<Self, BoardError> {
        let mut rows: Vec<Vec<bool>> = Vec::new();

        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '*' | 'X' | 'x' => Ok(true),
                    '.' => Ok(false),
                    found => Err(BoardError::UnexpectedChar { line: i + 1, found }),
                })
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(BoardError::RaggedRow {
                        line: i + 1,
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }

        let width = rows.first().map_or(0, Vec::len);
        let dimensions = Dimensions::new(rows.len(), width);
        if dimensions.is_empty() {
            return Err(BoardError::Empty);
        }

        let mines = rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &mine)| mine)
                .map(move |(c, _)| Cell::new(r, c))
        });
        Ok(Self::with_mines(dimensions, mines))
    }

    /// Reads and parses a layout file.
    ///
    /// # Errors
    ///
    /// I/O failures or any [`from_layout`](Self::from_layout) error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BoardError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_layout(&input)
    }

    /// Number of mines on the board.
    #[must_use]
    pub const fn mine_count(&self) -> usize {
        self.count
    }

    /// Whether the flagged cells are exactly the mines.
    #[must_use]
    pub fn won(&self, flags: &FxHashSet<Cell>) -> bool {
        flags.len() == self.count && flags.iter().all(|&cell| self.is_mine(cell))
    }

    fn place(&mut self, cell: Cell) {
        if self.dimensions.contains(cell) && !self.is_mine(cell) {
            self.mines.set(self.dimensions.index(cell), true);
            self.count += 1;
        }
    }
}

impl Board for Minefield {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn is_mine(&self, cell: Cell) -> bool {
        self.dimensions.contains(cell) && self.mines.get(self.dimensions.index(cell)).unwrap_or(false)
    }

    fn nearby_mines(&self, cell: Cell) -> usize {
        self.dimensions
            .neighbours(cell)
            .into_iter()
            .filter(|&n| self.is_mine(n))
            .count()
    }

    fn mines(&self) -> FxHashSet<Cell> {
        self.dimensions.cells().filter(|&cell| self.is_mine(cell)).collect()
    }
}

impl Display for Minefield {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rule = "--".repeat(self.dimensions.width) + "-";
        for row in 0..self.dimensions.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.dimensions.width {
                let mark = if self.is_mine(Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}
