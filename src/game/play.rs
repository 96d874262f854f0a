//! Runs an [`Agent`] against a [`Board`] until the game ends.

use crate::agent::ai::Agent;
use crate::agent::cell::Cell;
use crate::agent::error::InferenceError;
use crate::agent::inference::EngineStats;
use crate::game::board::Board;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Every mine is flagged, or every clear cell has been opened.
    Won,
    /// The agent opened a mine.
    Lost(Cell),
    /// No cell is left to open.
    NoMoves,
}

impl Display for GameOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "WON"),
            Self::Lost(cell) => write!(f, "LOST at {cell}"),
            Self::NoMoves => write!(f, "NO MOVES"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameReport {
    pub outcome: GameOutcome,
    /// Cells opened, including a fatal one.
    pub moves: usize,
    pub safe_moves: usize,
    pub random_moves: usize,
    pub stats: EngineStats,
}

/// Plays one game: proven-safe moves first, random moves when nothing is
/// certain.
///
/// # Errors
///
/// Any error the agent raises while absorbing an observation. With a
/// consistent board this only happens for consistency faults.
pub fn play<B: Board>(board: &B, agent: &mut Agent) -> Result<GameReport, InferenceError> {
    let mines = board.mines();
    let clear_cells = board.dimensions().len() - mines.len();
    let mut safe_moves = 0;
    let mut random_moves = 0;

    let outcome = loop {
        let cell = if let Some(cell) = agent.make_safe_move() {
            safe_moves += 1;
            cell
        } else if let Some(cell) = agent.make_random_move() {
            random_moves += 1;
            cell
        } else {
            break GameOutcome::NoMoves;
        };

        if board.is_mine(cell) {
            tracing::debug!(%cell, "opened a mine");
            break GameOutcome::Lost(cell);
        }

        agent.add_observation(cell, board.nearby_mines(cell))?;

        if agent.known_mines() == &mines || agent.moves_made().len() == clear_cells {
            break GameOutcome::Won;
        }
    };

    let report = GameReport {
        outcome,
        moves: safe_moves + random_moves,
        safe_moves,
        random_moves,
        stats: agent.stats(),
    };
    tracing::debug!(
        outcome = %report.outcome,
        moves = report.moves,
        random_moves = report.random_moves,
        "game over"
    );
    Ok(report)
}
