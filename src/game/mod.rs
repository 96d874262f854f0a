//! A concrete board and the loop that plays the agent against it.

/// Mine layouts, clue counts and layout parsing.
pub mod board;

/// The game loop and its report.
pub mod play;
