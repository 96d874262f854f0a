#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The knowledge base: every active sentence plus the global sets of cells
//! known to be mines, known to be safe, and already played.
//!
//! All mutation goes through [`KnowledgeBase::mark_mine`],
//! [`KnowledgeBase::mark_safe`], [`KnowledgeBase::add_sentence`] and
//! [`KnowledgeBase::prune`]. Marking a cell propagates to every sentence, so
//! once a cell is in `known_mines` or `known_safes` it appears in no sentence.

use crate::agent::cell::Cell;
use crate::agent::config::ConsistencyPolicy;
use crate::agent::error::InferenceError;
use crate::agent::sentence::Sentence;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnowledgeBase {
    sentences: Vec<Sentence>,
    known_mines: FxHashSet<Cell>,
    known_safes: FxHashSet<Cell>,
    moves_made: FxHashSet<Cell>,
    policy: ConsistencyPolicy,
    clamped_faults: usize,
}

impl KnowledgeBase {
    #[must_use]
    pub fn new(policy: ConsistencyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    #[must_use]
    pub const fn known_mines(&self) -> &FxHashSet<Cell> {
        &self.known_mines
    }

    #[must_use]
    pub const fn known_safes(&self) -> &FxHashSet<Cell> {
        &self.known_safes
    }

    #[must_use]
    pub const fn moves_made(&self) -> &FxHashSet<Cell> {
        &self.moves_made
    }

    #[must_use]
    pub const fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// Faults absorbed under [`ConsistencyPolicy::Clamp`]. Always zero under
    /// correct inference.
    #[must_use]
    pub const fn clamped_faults(&self) -> usize {
        self.clamped_faults
    }

    /// Whether the cell is already resolved as a mine or as safe.
    #[must_use]
    pub fn is_resolved(&self, cell: &Cell) -> bool {
        self.known_mines.contains(cell) || self.known_safes.contains(cell)
    }

    /// Total number of (sentence, cell) memberships. Every effective inference
    /// pass shrinks this or leaves the base unchanged.
    #[must_use]
    pub fn membership(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    /// Records `cell` as a mine and removes it from every sentence.
    ///
    /// Returns whether the cell was newly learned.
    ///
    /// # Errors
    ///
    /// Under [`ConsistencyPolicy::Strict`], `Contradiction` if the cell is
    /// known safe, or `InvariantViolation` if a sentence claimed no mines
    /// among cells including this one.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if self.known_safes.contains(&cell) {
            return self.absorb_contradiction(cell);
        }
        if !self.known_mines.insert(cell) {
            return Ok(false);
        }

        for sentence in &mut self.sentences {
            if let Err(err) = sentence.mark_mine(cell) {
                settle(self.policy, &mut self.clamped_faults, sentence, err)?;
            }
        }
        Ok(true)
    }

    /// Records `cell` as safe and removes it from every sentence.
    ///
    /// Returns whether the cell was newly learned.
    ///
    /// # Errors
    ///
    /// Under [`ConsistencyPolicy::Strict`], `Contradiction` if the cell is a
    /// known mine, or `InvariantViolation` if a sentence claimed every one of
    /// its cells, this one included, was a mine.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if self.known_mines.contains(&cell) {
            return self.absorb_contradiction(cell);
        }
        if !self.known_safes.insert(cell) {
            return Ok(false);
        }

        for sentence in &mut self.sentences {
            if let Err(err) = sentence.mark_safe(cell) {
                settle(self.policy, &mut self.clamped_faults, sentence, err)?;
            }
        }
        Ok(true)
    }

    /// Records that `cell` has been played. Callers are expected to have
    /// proven the cell safe first.
    pub(crate) fn register_move(&mut self, cell: Cell) -> bool {
        self.moves_made.insert(cell)
    }

    /// Drops resolved cells from `cells`, subtracts the known mines among
    /// them from `count`, and builds the resulting sentence.
    ///
    /// Returns `None` when nothing unresolved is left.
    ///
    /// # Errors
    ///
    /// Under [`ConsistencyPolicy::Strict`], `InvariantViolation` if the
    /// adjusted count leaves `[0, |cells|]`.
    pub(crate) fn reduce<I: IntoIterator<Item = Cell>>(
        &mut self,
        cells: I,
        count: i64,
        context: &'static str,
    ) -> Result<Option<Sentence>, InferenceError> {
        let mut mines_removed: i64 = 0;
        let mut unresolved = BTreeSet::new();

        for cell in cells {
            if self.known_mines.contains(&cell) {
                mines_removed += 1;
            } else if !self.known_safes.contains(&cell) {
                unresolved.insert(cell);
            }
        }

        let count = count - mines_removed;
        let sentence = match Sentence::checked(unresolved.clone(), count, context) {
            Ok(sentence) => sentence,
            Err(err) => {
                let mut sentence = Sentence::new(unresolved, usize::try_from(count.max(0)).unwrap_or(0));
                settle(self.policy, &mut self.clamped_faults, &mut sentence, err)?;
                sentence
            }
        };

        Ok((!sentence.is_empty()).then_some(sentence))
    }

    /// Adds a sentence built from a raw neighbour set and the clue reported
    /// for it.
    ///
    /// The clue counts mines that may already have been identified and
    /// filtered out of the cell set, so those are subtracted first.
    ///
    /// Returns whether a new sentence was inserted.
    ///
    /// # Errors
    ///
    /// See [`reduce`](Self::reduce).
    pub fn add_sentence<I: IntoIterator<Item = Cell>>(
        &mut self,
        raw_cells: I,
        raw_count: usize,
    ) -> Result<bool, InferenceError> {
        let count = i64::try_from(raw_count).unwrap_or(i64::MAX);
        match self.reduce(raw_cells, count, "add_sentence")? {
            Some(sentence) => Ok(self.insert(sentence)),
            None => Ok(false),
        }
    }

    /// Inserts `sentence` unless a structurally equal one is already present.
    pub(crate) fn insert(&mut self, sentence: Sentence) -> bool {
        if self.sentences.contains(&sentence) {
            return false;
        }
        tracing::trace!(%sentence, "sentence added");
        self.sentences.push(sentence);
        true
    }

    /// Removes empty sentences and structural duplicates.
    ///
    /// Returns the number of sentences removed.
    pub fn prune(&mut self) -> usize {
        let before = self.sentences.len();
        self.sentences = std::mem::take(&mut self.sentences)
            .into_iter()
            .filter(|s| !s.is_empty())
            .unique()
            .collect();
        before - self.sentences.len()
    }

    /// Checks every invariant the knowledge base maintains.
    ///
    /// # Errors
    ///
    /// The first violated invariant found.
    pub fn check_invariants(&self) -> Result<(), InferenceError> {
        if let Some(&cell) = self.known_mines.intersection(&self.known_safes).next() {
            return Err(InferenceError::Contradiction { cell });
        }

        for sentence in &self.sentences {
            if !sentence.is_consistent() {
                return Err(InferenceError::InvariantViolation {
                    count: i64::try_from(sentence.count()).unwrap_or(i64::MAX),
                    cells: sentence.len(),
                    context: "check_invariants",
                });
            }
            if let Some(&cell) = sentence.cells().iter().find(|c| self.is_resolved(c)) {
                return Err(InferenceError::Contradiction { cell });
            }
        }
        Ok(())
    }

    fn absorb_contradiction(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        let err = InferenceError::Contradiction { cell };
        match self.policy {
            ConsistencyPolicy::Strict => Err(err),
            ConsistencyPolicy::Clamp => {
                tracing::warn!(%err, "conflicting mark ignored");
                self.clamped_faults += 1;
                Ok(false)
            }
        }
    }
}

/// Applies the consistency policy to a sentence that just left
/// `[0, |cells|]`.
fn settle(
    policy: ConsistencyPolicy,
    clamped_faults: &mut usize,
    sentence: &mut Sentence,
    err: InferenceError,
) -> Result<(), InferenceError> {
    match policy {
        ConsistencyPolicy::Strict => Err(err),
        ConsistencyPolicy::Clamp => {
            tracing::warn!(%err, "sentence count clamped");
            sentence.clamp_count();
            *clamped_faults += 1;
            Ok(())
        }
    }
}
