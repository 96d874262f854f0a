//! The agent facade: the only entry points callers need.
//!
//! An [`Agent`] owns a [`KnowledgeBase`], an [`InferenceEngine`] and a
//! [`MoveSelector`]. Every observation runs to a fixed point before the call
//! returns; if anything fails along the way the knowledge base is restored to
//! the state it had before the call.

use crate::agent::cell::{Cell, Dimensions};
use crate::agent::config::AgentConfig;
use crate::agent::error::InferenceError;
use crate::agent::inference::{EngineStats, FixedPoint, InferenceEngine};
use crate::agent::knowledge::KnowledgeBase;
use crate::agent::selection::MoveSelector;
use rustc_hash::FxHashSet;

/// A Minesweeper player that only opens cells it has proven safe, falling
/// back to random cells when it knows nothing certain.
#[derive(Debug, Clone)]
pub struct Agent {
    dimensions: Dimensions,
    knowledge: KnowledgeBase,
    engine: InferenceEngine,
    selector: MoveSelector,
}

impl Agent {
    #[must_use]
    pub fn new(dimensions: Dimensions, config: AgentConfig) -> Self {
        Self {
            dimensions,
            knowledge: KnowledgeBase::new(config.policy),
            engine: InferenceEngine::new(),
            selector: MoveSelector::new(config.seed),
        }
    }

    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub const fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    #[must_use]
    pub const fn known_mines(&self) -> &FxHashSet<Cell> {
        self.knowledge.known_mines()
    }

    #[must_use]
    pub const fn known_safes(&self) -> &FxHashSet<Cell> {
        self.knowledge.known_safes()
    }

    #[must_use]
    pub const fn moves_made(&self) -> &FxHashSet<Cell> {
        self.knowledge.moves_made()
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            clamped_faults: self.knowledge.clamped_faults(),
            ..self.engine.stats()
        }
    }

    /// Takes in the clue revealed at `cell`: records the move, marks the cell
    /// safe, adds a sentence over its neighbours and runs inference to a
    /// fixed point.
    ///
    /// # Errors
    ///
    /// - `CellOutOfBounds` / `ClueOutOfRange` if the observation is not
    ///   possible on this board, or `ObservedMine` if `cell` is a known mine.
    ///   Nothing is changed.
    /// - Any consistency fault raised during inference. The knowledge base is
    ///   rolled back to its state before the call.
    pub fn add_observation(&mut self, cell: Cell, count: usize) -> Result<FixedPoint, InferenceError> {
        self.check_bounds(cell)?;
        let neighbours = self.dimensions.neighbours(cell);
        if count > neighbours.len() {
            return Err(InferenceError::ClueOutOfRange {
                cell,
                count,
                neighbours: neighbours.len(),
            });
        }

        if self.knowledge.known_mines().contains(&cell) {
            return Err(InferenceError::ObservedMine { cell });
        }

        tracing::debug!(%cell, count, "observation");
        self.transaction(|knowledge, engine| {
            engine.record_observation();
            knowledge.register_move(cell);
            knowledge.mark_safe(cell)?;
            knowledge.add_sentence(neighbours, count)?;
            engine.run(knowledge)
        })
    }

    /// Asserts from outside that `cell` is a mine, then re-runs inference.
    ///
    /// # Errors
    ///
    /// `CellOutOfBounds`, or a consistency fault (rolled back).
    pub fn mark_mine(&mut self, cell: Cell) -> Result<FixedPoint, InferenceError> {
        self.check_bounds(cell)?;
        self.transaction(|knowledge, engine| {
            knowledge.mark_mine(cell)?;
            engine.run(knowledge)
        })
    }

    /// Asserts from outside that `cell` is safe, then re-runs inference.
    ///
    /// # Errors
    ///
    /// `CellOutOfBounds`, or a consistency fault (rolled back).
    pub fn mark_safe(&mut self, cell: Cell) -> Result<FixedPoint, InferenceError> {
        self.check_bounds(cell)?;
        self.transaction(|knowledge, engine| {
            knowledge.mark_safe(cell)?;
            engine.run(knowledge)
        })
    }

    /// Records a proven-safe cell as played before its clue is known.
    ///
    /// # Errors
    ///
    /// `CellOutOfBounds`, or `UnprovenMove` if the cell is not known safe.
    pub fn register_move(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        self.check_bounds(cell)?;
        if !self.knowledge.known_safes().contains(&cell) {
            return Err(InferenceError::UnprovenMove { cell });
        }
        Ok(self.knowledge.register_move(cell))
    }

    /// A cell known to be safe that has not been played yet. Read-only.
    #[must_use]
    pub fn make_safe_move(&self) -> Option<Cell> {
        MoveSelector::safe_move(&self.knowledge)
    }

    /// A random cell that has not been played and is not a known mine.
    pub fn make_random_move(&mut self) -> Option<Cell> {
        self.selector.random_move(&self.knowledge, self.dimensions)
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), InferenceError> {
        if self.dimensions.contains(cell) {
            Ok(())
        } else {
            Err(InferenceError::CellOutOfBounds {
                cell,
                dimensions: self.dimensions,
            })
        }
    }

    fn transaction<F>(&mut self, f: F) -> Result<FixedPoint, InferenceError>
    where
        F: FnOnce(&mut KnowledgeBase, &mut InferenceEngine) -> Result<FixedPoint, InferenceError>,
    {
        let snapshot = (self.knowledge.clone(), self.engine.clone());
        let result = f(&mut self.knowledge, &mut self.engine);
        if let Err(err) = &result {
            tracing::debug!(%err, "rolling back knowledge base");
            (self.knowledge, self.engine) = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::ConsistencyPolicy;
    use crate::agent::sentence::Sentence;

    fn agent(height: usize, width: usize) -> Agent {
        Agent::new(
            Dimensions::new(height, width),
            AgentConfig::new(ConsistencyPolicy::Strict, Some(3)),
        )
    }

    #[test]
    fn test_zero_clue_clears_all_neighbours() {
        // 3x3 board, single mine at (2, 2).
        let mut ai = agent(3, 3);
        ai.add_observation(Cell::new(0, 0), 0).unwrap();

        for cell in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert!(ai.known_safes().contains(&Cell::from(cell)));
        }
        assert_eq!(ai.moves_made().len(), 1);
        assert!(ai.knowledge().sentences().is_empty());
    }

    #[test]
    fn test_zero_clue_in_centre_clears_eight_neighbours() {
        let mut ai = agent(3, 3);
        ai.add_observation(Cell::new(1, 1), 0).unwrap();
        assert_eq!(ai.known_safes().len(), 9);
        assert!(ai.known_mines().is_empty());
    }

    #[test]
    fn test_subset_inference_between_observations() {
        // Row of clues along the top of a 2x3 board with a mine at (1, 0).
        let mut ai = agent(2, 3);
        ai.add_observation(Cell::new(0, 0), 1).unwrap();
        ai.add_observation(Cell::new(0, 1), 1).unwrap();

        // {(0,1),(1,0),(1,1)} = 1 minus (0,1) safe, then
        // {(0,0),(0,2),(1,0),(1,1),(1,2)} = 1 with (0,0) safe gives
        // {(0,2),(1,0),(1,1),(1,2)} = 1, superset of {(1,0),(1,1)} = 1.
        assert!(ai.known_safes().contains(&Cell::new(0, 2)));
        assert!(ai.known_safes().contains(&Cell::new(1, 2)));
        assert!(ai.knowledge().check_invariants().is_ok());
    }

    #[test]
    fn test_cascade_within_single_observation() {
        // Board (3x3), mines at (0, 2) and (1, 2):
        //   . . X
        //   . . X
        //   . . .
        let mut ai = agent(3, 3);
        ai.add_observation(Cell::new(0, 0), 0).unwrap();
        ai.add_observation(Cell::new(2, 0), 0).unwrap();
        let before = ai.stats().passes;

        // (1, 1) leaves {(0,2),(1,2),(2,2)} = 2 pending. (0, 1) then sees
        // {(0,2),(1,2)} = 2, both mines, which shrinks the pending sentence
        // to {(2,2)} = 0 within the same call.
        ai.add_observation(Cell::new(1, 1), 2).unwrap();
        ai.add_observation(Cell::new(0, 1), 2).unwrap();

        assert!(ai.known_mines().contains(&Cell::new(0, 2)));
        assert!(ai.known_mines().contains(&Cell::new(1, 2)));
        assert!(ai.known_safes().contains(&Cell::new(2, 2)));
        assert!(ai.stats().passes > before);
        assert!(ai.knowledge().sentences().is_empty());
    }

    #[test]
    fn test_safe_move_after_registration() {
        let mut ai = agent(3, 3);
        ai.mark_safe(Cell::new(1, 1)).unwrap();

        assert_eq!(ai.make_safe_move(), Some(Cell::new(1, 1)));
        assert_eq!(ai.make_safe_move(), Some(Cell::new(1, 1)));

        assert_eq!(ai.register_move(Cell::new(1, 1)), Ok(true));
        assert_eq!(ai.make_safe_move(), None);
    }

    #[test]
    fn test_register_unproven_move() {
        let mut ai = agent(3, 3);
        assert_eq!(
            ai.register_move(Cell::new(0, 0)),
            Err(InferenceError::UnprovenMove { cell: Cell::new(0, 0) })
        );
    }

    #[test]
    fn test_rejects_out_of_bounds_and_impossible_clues() {
        let mut ai = agent(3, 3);
        let err = ai.add_observation(Cell::new(3, 0), 0).unwrap_err();
        assert!(matches!(err, InferenceError::CellOutOfBounds { .. }));

        let err = ai.add_observation(Cell::new(0, 0), 4).unwrap_err();
        assert_eq!(
            err,
            InferenceError::ClueOutOfRange {
                cell: Cell::new(0, 0),
                count: 4,
                neighbours: 3
            }
        );
        assert!(err.is_caller_error());
        assert!(ai.moves_made().is_empty());
        assert!(ai.known_safes().is_empty());
    }

    #[test]
    fn test_failed_observation_rolls_back() {
        let mut ai = agent(1, 3);
        ai.mark_mine(Cell::new(0, 1)).unwrap();
        let before = ai.knowledge().clone();

        // (0, 0) only neighbours (0, 1), a known mine, so a clue of 0 is
        // impossible.
        let err = ai.add_observation(Cell::new(0, 0), 0).unwrap_err();
        assert!(err.is_consistency_fault());
        assert_eq!(ai.knowledge(), &before);
    }

    #[test]
    fn test_observing_known_mine_is_rejected_under_clamp() {
        let mut ai = Agent::new(
            Dimensions::new(1, 3),
            AgentConfig::new(ConsistencyPolicy::Clamp, Some(3)),
        );
        ai.mark_mine(Cell::new(0, 1)).unwrap();
        let before = ai.knowledge().clone();

        let err = ai.add_observation(Cell::new(0, 1), 0).unwrap_err();
        assert_eq!(err, InferenceError::ObservedMine { cell: Cell::new(0, 1) });
        assert!(err.is_caller_error());

        assert_eq!(ai.knowledge(), &before);
        assert!(ai.moves_made().is_subset(ai.known_safes()));
        assert!(ai.known_safes().is_empty());
        assert_eq!(ai.stats().clamped_faults, 0);
    }

    #[test]
    fn test_rejected_observations_leave_stats_untouched() {
        let mut ai = agent(1, 3);
        ai.mark_mine(Cell::new(0, 1)).unwrap();
        let before = ai.stats();

        assert!(ai.add_observation(Cell::new(0, 0), 0).is_err());
        assert!(ai.add_observation(Cell::new(0, 1), 1).is_err());
        assert!(ai.add_observation(Cell::new(0, 9), 0).is_err());
        assert_eq!(ai.stats(), before);

        ai.add_observation(Cell::new(0, 0), 1).unwrap();
        assert_eq!(ai.stats().observations, before.observations + 1);
    }

    #[test]
    fn test_external_mine_mark_resolves_neighbours() {
        let mut ai = agent(1, 3);
        ai.add_observation(Cell::new(0, 1), 1).unwrap();
        assert_eq!(
            ai.knowledge().sentences(),
            &[Sentence::new([Cell::new(0, 0), Cell::new(0, 2)], 1)]
        );

        ai.mark_mine(Cell::new(0, 0)).unwrap();
        assert!(ai.known_safes().contains(&Cell::new(0, 2)));
        assert_eq!(ai.make_safe_move(), Some(Cell::new(0, 2)));
    }

    #[test]
    fn test_random_move_when_nothing_known() {
        let mut ai = agent(2, 2);
        let cell = ai.make_random_move().unwrap();
        assert!(ai.dimensions().contains(cell));
        assert_eq!(ai.make_safe_move(), None);
    }
}
