//! This crate provides a Minesweeper-playing agent that deduces, with certainty, which unopened cells are mines and
//! which are safe.

/// The `agent` module implements the knowledge base, the fixed-point inference engine and move selection.
pub mod agent;

/// The `game` module implements a concrete board and the loop that plays the agent against it.
pub mod game;
