//! Drives a [`KnowledgeBase`] to a logical fixed point.
//!
//! Two rules are applied until a full pass changes nothing:
//!
//! 1.  **Direct resolution.** A sentence with `count == 0` makes every one of
//!     its cells safe; a non-empty sentence with `count == |cells|` makes
//!     every one of its cells a mine. Marks propagate through the whole
//!     knowledge base, which can shrink other sentences until they resolve
//!     too. The loop picks that cascade up on the next pass.
//! 2.  **Subset inference.** For sentences `A` and `B` with
//!     `B.cells ⊆ A.cells`, the cells in `A - B` hold exactly
//!     `A.count - B.count` mines. Non-empty, previously unknown results are
//!     added as new sentences.
//!
//! Each effective pass either resolves a cell (which strictly shrinks the
//! total number of sentence memberships) or adds a sentence strictly
//! smaller than an existing one. There are finitely many such sentences on a
//! finite board, so the loop always terminates.

use crate::agent::cell::Cell;
use crate::agent::error::InferenceError;
use crate::agent::knowledge::KnowledgeBase;
use crate::agent::sentence::Sentence;
use itertools::Itertools;
use std::collections::BTreeSet;

/// Counters accumulated over the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Observations fed to the engine.
    pub observations: usize,
    /// Inference passes run, over all fixed-point computations.
    pub passes: usize,
    /// Sentences produced by subset inference.
    pub derived_sentences: usize,
    /// Cells proven safe by direct resolution.
    pub inferred_safes: usize,
    /// Cells proven to be mines by direct resolution.
    pub inferred_mines: usize,
    /// Consistency faults clamped instead of reported.
    pub clamped_faults: usize,
}

/// What a single fixed-point computation achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint {
    pub passes: usize,
    pub marks: usize,
    pub derived: usize,
}

impl FixedPoint {
    /// Whether anything in the knowledge base changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.marks > 0 || self.derived > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InferenceEngine {
    stats: EngineStats,
}

impl InferenceEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn stats(&self) -> EngineStats {
        self.stats
    }

    pub(crate) fn record_observation(&mut self) {
        self.stats.observations += 1;
    }

    /// Applies both rules until a full pass produces neither a new mark nor a
    /// new sentence.
    ///
    /// # Errors
    ///
    /// Any consistency fault raised while marking cells or building derived
    /// sentences. The knowledge base may be partially updated on error.
    pub fn run(&mut self, kb: &mut KnowledgeBase) -> Result<FixedPoint, InferenceError> {
        let mut outcome = FixedPoint::default();

        loop {
            outcome.passes += 1;
            self.stats.passes += 1;

            let marks = self.resolve(kb)?;
            kb.prune();

            let derived = self.derive(kb)?;
            kb.prune();

            outcome.marks += marks;
            outcome.derived += derived;

            if marks == 0 && derived == 0 {
                break;
            }
        }

        self.stats.clamped_faults = kb.clamped_faults();
        tracing::debug!(
            passes = outcome.passes,
            marks = outcome.marks,
            derived = outcome.derived,
            sentences = kb.sentences().len(),
            "fixed point reached"
        );
        Ok(outcome)
    }

    /// Rule 1 over every current sentence. Returns the number of cells newly
    /// marked.
    fn resolve(&mut self, kb: &mut KnowledgeBase) -> Result<usize, InferenceError> {
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();

        for sentence in kb.sentences() {
            if sentence.is_empty() {
                continue;
            }
            mines.extend(sentence.known_mines().iter().copied());
            safes.extend(sentence.known_safes().iter().copied());
        }

        let mut marked = 0;
        for cell in mines {
            if kb.mark_mine(cell)? {
                tracing::trace!(%cell, "inferred mine");
                self.stats.inferred_mines += 1;
                marked += 1;
            }
        }
        for cell in safes {
            if kb.mark_safe(cell)? {
                tracing::trace!(%cell, "inferred safe");
                self.stats.inferred_safes += 1;
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Rule 2 across all pairs of current sentences. Returns the number of
    /// sentences added.
    fn derive(&mut self, kb: &mut KnowledgeBase) -> Result<usize, InferenceError> {
        let candidates: Vec<(BTreeSet<Cell>, i64)> = kb
            .sentences()
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| a != b)
            .flat_map(|(a, b): (&Sentence, &Sentence)| [a.subtract(b), b.subtract(a)])
            .flatten()
            .filter(|(cells, _)| !cells.is_empty())
            .collect();

        let mut derived = 0;
        for (cells, count) in candidates {
            let Some(sentence) = kb.reduce(cells, count, "subset inference")? else {
                continue;
            };
            if kb.insert(sentence) {
                self.stats.derived_sentences += 1;
                derived += 1;
            }
        }
        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::ConsistencyPolicy;

    fn cells(cs: &[(usize, usize)]) -> Vec<Cell> {
        cs.iter().copied().map(Cell::from).collect()
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(ConsistencyPolicy::Strict)
    }

    #[test]
    fn test_direct_resolution_safes() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 1), (1, 0), (1, 1)]), 0).unwrap();

        let mut engine = InferenceEngine::new();
        let fp = engine.run(&mut kb).unwrap();

        assert_eq!(fp.marks, 3);
        assert!(kb.sentences().is_empty());
        assert_eq!(kb.known_safes().len(), 3);
        assert_eq!(engine.stats().inferred_safes, 3);
    }

    #[test]
    fn test_direct_resolution_mines() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 1), (1, 0)]), 2).unwrap();

        let mut engine = InferenceEngine::new();
        engine.run(&mut kb).unwrap();

        assert!(kb.sentences().is_empty());
        assert!(kb.known_mines().contains(&Cell::new(0, 1)));
        assert!(kb.known_mines().contains(&Cell::new(1, 0)));
        assert_eq!(engine.stats().inferred_mines, 2);
    }

    #[test]
    fn test_subset_inference() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 0), (0, 1)]), 1).unwrap();

        let mut engine = InferenceEngine::new();
        let fp = engine.run(&mut kb).unwrap();

        assert!(fp.derived >= 1);
        assert!(kb.known_safes().contains(&Cell::new(0, 2)));
        assert!(!kb.known_mines().contains(&Cell::new(0, 2)));
        assert_eq!(kb.sentences(), &[Sentence::new(cells(&[(0, 0), (0, 1)]), 1)]);
    }

    #[test]
    fn test_subset_inference_symmetric() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 0), (0, 1), (0, 2), (0, 3)]), 3).unwrap();

        let mut engine = InferenceEngine::new();
        engine.run(&mut kb).unwrap();

        assert!(kb.known_mines().contains(&Cell::new(0, 2)));
        assert!(kb.known_mines().contains(&Cell::new(0, 3)));
    }

    #[test]
    fn test_cascade_in_one_run() {
        // {a, b} = 2 resolves to mines, which turns {a, b, c} = 2 into
        // {c} = 0, which in turn empties {c, d} = 1 down to {d} = 1.
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        kb.add_sentence(cells(&[(0, 2), (0, 3)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 0), (0, 1)]), 2).unwrap();

        let mut engine = InferenceEngine::new();
        engine.run(&mut kb).unwrap();

        for mine in cells(&[(0, 0), (0, 1), (0, 3)]) {
            assert!(kb.known_mines().contains(&mine), "{mine} should be a mine");
        }
        assert!(kb.known_safes().contains(&Cell::new(0, 2)));
        assert!(kb.sentences().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0), (0, 1), (1, 0), (1, 1)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 1), (1, 1), (0, 2), (1, 2)]), 2).unwrap();
        kb.add_sentence(cells(&[(1, 0), (1, 1)]), 1).unwrap();

        let mut engine = InferenceEngine::new();
        engine.run(&mut kb).unwrap();
        let snapshot = kb.clone();

        let fp = engine.run(&mut kb).unwrap();
        assert!(!fp.changed());
        assert_eq!(fp.passes, 1);
        assert_eq!(kb, snapshot);
    }

    #[test]
    fn test_invariants_hold_at_fixed_point() {
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 1), (0, 2), (0, 3)]), 2).unwrap();
        kb.add_sentence(cells(&[(0, 2), (0, 3), (0, 4)]), 2).unwrap();
        kb.add_sentence(cells(&[(0, 3), (0, 4)]), 1).unwrap();

        InferenceEngine::new().run(&mut kb).unwrap();

        assert!(kb.check_invariants().is_ok());
        assert_eq!(kb.clamped_faults(), 0);
    }

    #[test]
    fn test_inconsistent_knowledge_is_reported() {
        // {a} = 1 and {a, b} = 0 cannot both hold.
        let mut kb = kb();
        kb.add_sentence(cells(&[(0, 0)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 0), (0, 1)]), 0).unwrap();

        let err = InferenceEngine::new().run(&mut kb).unwrap_err();
        assert!(err.is_consistency_fault());
    }

    #[test]
    fn test_inconsistent_knowledge_is_clamped() {
        let mut kb = KnowledgeBase::new(ConsistencyPolicy::Clamp);
        kb.add_sentence(cells(&[(0, 0)]), 1).unwrap();
        kb.add_sentence(cells(&[(0, 0), (0, 1)]), 0).unwrap();

        let mut engine = InferenceEngine::new();
        engine.run(&mut kb).unwrap();

        assert!(engine.stats().clamped_faults > 0);
        assert!(kb.check_invariants().is_ok());
    }

    #[test]
    fn test_empty_knowledge_base() {
        let mut kb = kb();
        let fp = InferenceEngine::new().run(&mut kb).unwrap();
        assert_eq!(fp, FixedPoint { passes: 1, marks: 0, derived: 0 });
    }
}
