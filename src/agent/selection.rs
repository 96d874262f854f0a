//! Choosing the next cell to open from resolved knowledge.

use crate::agent::cell::{Cell, Dimensions};
use crate::agent::knowledge::KnowledgeBase;

/// Reads a [`KnowledgeBase`] to propose moves. Never mutates it.
#[derive(Debug, Clone)]
pub struct MoveSelector {
    rng: fastrand::Rng,
}

impl MoveSelector {
    /// Creates a selector; a seed makes the random moves reproducible.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self { rng }
    }

    /// The smallest cell (row-major) known to be safe and not yet played.
    #[must_use]
    pub fn safe_move(kb: &KnowledgeBase) -> Option<Cell> {
        kb.known_safes()
            .iter()
            .filter(|cell| !kb.moves_made().contains(*cell))
            .min()
            .copied()
    }

    /// A uniformly random cell that has not been played and is not a known
    /// mine.
    pub fn random_move(&mut self, kb: &KnowledgeBase, dimensions: Dimensions) -> Option<Cell> {
        let candidates: Vec<Cell> = dimensions
            .cells()
            .filter(|cell| !kb.moves_made().contains(cell) && !kb.known_mines().contains(cell))
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.usize(..candidates.len())])
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new(None)
    }
}
