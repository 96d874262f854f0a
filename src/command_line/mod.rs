//! Argument parsing and reporting for the `minesweeper-agent` binary.

pub(crate) mod cli;
