//! Error types raised by the knowledge base and the agent facade.
//!
//! Two kinds of failure are distinguished:
//!
//! - **Boundary input faults** (`CellOutOfBounds`, `ClueOutOfRange`,
//!   `ObservedMine`, `UnprovenMove`) are caller errors. They are rejected before anything
//!   touches the knowledge base.
//! - **Internal-consistency faults** (`InvariantViolation`, `Contradiction`)
//!   mean the filtering or subtraction logic produced a sentence whose count
//!   left `[0, |cells|]`, or that a cell ended up both a mine and safe. Under
//!   correct inference these never occur.
//!
//! Running out of moves is not an error; move selection returns `None`.

use crate::agent::cell::{Cell, Dimensions};
use thiserror::Error;

/// Failures reported by [`KnowledgeBase`](crate::agent::knowledge::KnowledgeBase)
/// and [`Agent`](crate::agent::ai::Agent).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The cell does not lie on the board.
    #[error("cell {cell} lies outside the {dimensions} board")]
    CellOutOfBounds {
        /// Offending cell.
        cell: Cell,
        /// Board the cell was checked against.
        dimensions: Dimensions,
    },

    /// A clue reported more mines than the cell has neighbours.
    #[error("clue {count} at {cell} exceeds its {neighbours} neighbours")]
    ClueOutOfRange {
        /// Revealed cell.
        cell: Cell,
        /// Reported adjacent mine count.
        count: usize,
        /// Number of on-board neighbours of `cell`.
        neighbours: usize,
    },

    /// A sentence count fell outside `[0, |cells|]`.
    #[error("sentence invariant violated: {count} mines among {cells} cells ({context})")]
    InvariantViolation {
        /// Mine count the sentence would have needed.
        count: i64,
        /// Number of cells left in the sentence.
        cells: usize,
        /// Operation that produced the bad count.
        context: &'static str,
    },

    /// The cell was asserted to be both a mine and safe.
    #[error("cell {cell} cannot be both a mine and safe")]
    Contradiction {
        /// Cell carrying the conflicting facts.
        cell: Cell,
    },

    /// A clue was reported for a cell already known to be a mine.
    #[error("cell {cell} is a known mine and cannot report a clue")]
    ObservedMine {
        /// Cell the caller tried to observe.
        cell: Cell,
    },

    /// A move was registered for a cell that is not proven safe.
    #[error("cell {cell} is not known to be safe")]
    UnprovenMove {
        /// Cell the caller tried to register.
        cell: Cell,
    },
}

impl InferenceError {
    /// Whether the error was caused by bad input rather than by the engine.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::CellOutOfBounds { .. }
                | Self::ClueOutOfRange { .. }
                | Self::ObservedMine { .. }
                | Self::UnprovenMove { .. }
        )
    }

    /// Whether the error is an internal-consistency fault.
    #[must_use]
    pub const fn is_consistency_fault(&self) -> bool {
        !self.is_caller_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let cell = Cell::new(0, 0);
        let dimensions = Dimensions::new(2, 2);

        assert!(InferenceError::CellOutOfBounds { cell, dimensions }.is_caller_error());
        assert!(
            InferenceError::ClueOutOfRange {
                cell,
                count: 9,
                neighbours: 3
            }
            .is_caller_error()
        );
        assert!(InferenceError::UnprovenMove { cell }.is_caller_error());
        assert!(InferenceError::ObservedMine { cell }.is_caller_error());
        assert!(InferenceError::Contradiction { cell }.is_consistency_fault());
        assert!(
            InferenceError::InvariantViolation {
                count: -1,
                cells: 2,
                context: "mark_mine"
            }
            .is_consistency_fault()
        );
    }

    #[test]
    fn test_display() {
        let err = InferenceError::ClueOutOfRange {
            cell: Cell::new(0, 0),
            count: 4,
            neighbours: 3,
        };
        assert_eq!(err.to_string(), "clue 4 at (0, 0) exceeds its 3 neighbours");
    }
}
